//! Resource abstraction layer
//!
//! The dashboard backend manages connectors through two endpoint families:
//! native rule-engine actions and bridges to external systems. This module
//! decides which family a resource belongs to and routes calls there.
//!
//! # Architecture
//!
//! - [`key`] - Parses `{type}:{name}` identifiers
//! - [`catalog`] - Connector types served by the actions API
//! - [`handler`] - Shapes request bodies before submission
//! - [`dispatch`] - Routes CRUD calls to the matching family
//!
//! # Example
//!
//! ```ignore
//! use rulebridge::resource::{Dispatcher, StaticCatalog};
//! use std::sync::Arc;
//!
//! async fn disable(client: DashboardClient) -> anyhow::Result<()> {
//!     let dispatcher = Dispatcher::new(Arc::new(client), Arc::new(StaticCatalog::embedded()));
//!     dispatcher.toggle_action_enable("mysql:orders", false).await
//! }
//! ```

pub mod catalog;
pub mod dispatch;
pub mod handler;
pub mod key;
mod payload;

pub use catalog::{embedded_action_types, ConnectorCatalog, StaticCatalog};
pub use dispatch::Dispatcher;
pub use handler::{ActionDataHandler, BridgeDataHandler, DataHandler};
pub use key::ResourceKey;
pub use payload::{ResourceFamily, ResourcePayload};
