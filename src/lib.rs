//! rulebridge - client-side glue for rule-engine dashboards
//!
//! - [`resource`] routes CRUD calls to the actions or bridges API
//! - [`schema`] rewrites connector form schemas before rendering
//! - [`api`] is the REST transport both families are served by

pub mod api;
pub mod config;
pub mod i18n;
pub mod resource;
pub mod schema;

/// Version injected at compile time via RULEBRIDGE_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("RULEBRIDGE_VERSION") {
    Some(v) => v,
    None => "dev",
};
