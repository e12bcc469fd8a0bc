//! Resource Dispatch
//!
//! Routes CRUD calls for a resource to the actions API or the bridges API.
//! The family is derived from the resource's connector type on every call.

use super::catalog::ConnectorCatalog;
use super::handler::{ActionDataHandler, BridgeDataHandler, DataHandler};
use super::payload::{ResourceFamily, ResourcePayload};
use crate::api::RuleEngineApi;
use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

/// One CRUD interface over actions and bridges
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn RuleEngineApi>,
    catalog: Arc<dyn ConnectorCatalog>,
    action_handler: Arc<dyn DataHandler>,
    bridge_handler: Arc<dyn DataHandler>,
}

impl Dispatcher {
    /// Create a dispatcher with the default data handlers
    pub fn new(api: Arc<dyn RuleEngineApi>, catalog: Arc<dyn ConnectorCatalog>) -> Self {
        Self {
            api,
            catalog,
            action_handler: Arc::new(ActionDataHandler),
            bridge_handler: Arc::new(BridgeDataHandler),
        }
    }

    /// Replace the pre-submit handlers
    pub fn with_handlers(
        mut self,
        action_handler: Arc<dyn DataHandler>,
        bridge_handler: Arc<dyn DataHandler>,
    ) -> Self {
        self.action_handler = action_handler;
        self.bridge_handler = bridge_handler;
        self
    }

    /// Whether a connector type is served by the actions API
    pub fn is_true_action(&self, connector_type: &str) -> bool {
        self.catalog.is_supported(connector_type)
    }

    pub fn family_of_id(&self, id: &str) -> ResourceFamily {
        ResourceFamily::of_id(id, self.catalog.as_ref())
    }

    pub fn family_of_payload(&self, payload: &ResourcePayload) -> ResourceFamily {
        ResourceFamily::of_type(&payload.connector_type, self.catalog.as_ref())
    }

    /// Fetch one resource
    pub async fn get_detail(&self, id: &str) -> Result<ResourcePayload> {
        let family = self.family_of_id(id);
        tracing::info!("get_detail: family={}, id={}", family, id);

        match family {
            ResourceFamily::Action => self.api.get_action(id).await,
            ResourceFamily::Bridge => self.api.get_bridge(id).await,
        }
    }

    /// Create a resource; the response carries the server-assigned id
    pub async fn add_action(&self, payload: &ResourcePayload) -> Result<ResourcePayload> {
        let family = self.family_of_payload(payload);
        tracing::info!("add_action: family={}, type={}", family, payload.connector_type);

        match family {
            ResourceFamily::Action => self.api.create_action(payload).await,
            ResourceFamily::Bridge => self.api.create_bridge(payload).await,
        }
    }

    /// Update a resource.
    ///
    /// The id travels in the URL only; the body is shaped by the family's
    /// data handler. Failures are logged and returned unchanged.
    pub async fn update_action(&self, payload: ResourcePayload) -> Result<ResourcePayload> {
        let result = self.submit_update(payload).await;
        if let Err(e) = &result {
            tracing::error!("update_action failed: {:#}", e);
        }
        result
    }

    async fn submit_update(&self, payload: ResourcePayload) -> Result<ResourcePayload> {
        let family = self.family_of_payload(&payload);
        let (id, body) = payload.into_body();
        let Some(id) = id else {
            return Err(anyhow::anyhow!("Cannot update a resource without an id"));
        };
        tracing::info!("update_action: family={}, id={}", family, id);

        match family {
            ResourceFamily::Action => {
                let body = self.action_handler.prepare(body).await?;
                self.api.update_action(&id, &body).await
            },
            ResourceFamily::Bridge => {
                let body = self.bridge_handler.prepare(body).await?;
                self.api.update_bridge(&id, &body).await
            },
        }
    }

    /// Delete a resource
    pub async fn delete_action(&self, id: &str) -> Result<()> {
        let family = self.family_of_id(id);
        tracing::info!("delete_action: family={}, id={}", family, id);

        match family {
            ResourceFamily::Action => self.api.delete_action(id).await,
            ResourceFamily::Bridge => self.api.delete_bridge(id).await,
        }
    }

    /// Fetch runtime metrics; never modifies the resource
    pub async fn get_metrics(&self, id: &str) -> Result<Value> {
        let family = self.family_of_id(id);
        tracing::debug!("get_metrics: family={}, id={}", family, id);

        match family {
            ResourceFamily::Action => self.api.action_metrics(id).await,
            ResourceFamily::Bridge => self.api.bridge_metrics(id).await,
        }
    }

    /// Enable/disable an action, or start/stop a bridge
    pub async fn toggle_action_enable(&self, id: &str, enable: bool) -> Result<()> {
        let family = self.family_of_id(id);
        tracing::info!("toggle_action_enable: family={}, id={}, enable={}", family, id, enable);

        match family {
            ResourceFamily::Action => self.api.set_action_enabled(id, enable).await,
            ResourceFamily::Bridge => self.api.start_stop_bridge(id, enable).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::StaticCatalog;
    use async_trait::async_trait;
    use serde_json::{json, Map};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Records every API call as `family.method(id)`
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<String>>,
        bodies: Mutex<Vec<Map<String, Value>>>,
        fail: bool,
    }

    impl RecordingApi {
        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(anyhow::anyhow!("API request failed: 500 Internal Server Error"))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn echo(id: &str, body: &Map<String, Value>) -> ResourcePayload {
            let mut payload = ResourcePayload::new("echo").with_id(id);
            payload.fields = body.clone();
            payload
        }
    }

    #[async_trait]
    impl RuleEngineApi for RecordingApi {
        async fn get_action(&self, id: &str) -> Result<ResourcePayload> {
            self.record(format!("action.get({})", id))?;
            Ok(ResourcePayload::new("mysql").with_id(id))
        }
        async fn create_action(&self, payload: &ResourcePayload) -> Result<ResourcePayload> {
            self.record(format!("action.create({})", payload.connector_type))?;
            Ok(payload.clone().with_id("mysql:new"))
        }
        async fn update_action(&self, id: &str, body: &Map<String, Value>) -> Result<ResourcePayload> {
            self.record(format!("action.update({})", id))?;
            self.bodies.lock().unwrap().push(body.clone());
            Ok(Self::echo(id, body))
        }
        async fn delete_action(&self, id: &str) -> Result<()> {
            self.record(format!("action.delete({})", id))
        }
        async fn set_action_enabled(&self, id: &str, enable: bool) -> Result<()> {
            self.record(format!("action.enable({}, {})", id, enable))
        }
        async fn action_metrics(&self, id: &str) -> Result<Value> {
            self.record(format!("action.metrics({})", id))?;
            Ok(json!({ "matched": 1 }))
        }
        async fn get_bridge(&self, id: &str) -> Result<ResourcePayload> {
            self.record(format!("bridge.get({})", id))?;
            Ok(ResourcePayload::new("webhook").with_id(id))
        }
        async fn create_bridge(&self, payload: &ResourcePayload) -> Result<ResourcePayload> {
            self.record(format!("bridge.create({})", payload.connector_type))?;
            Ok(payload.clone().with_id("webhook:new"))
        }
        async fn update_bridge(&self, id: &str, body: &Map<String, Value>) -> Result<ResourcePayload> {
            self.record(format!("bridge.update({})", id))?;
            self.bodies.lock().unwrap().push(body.clone());
            Ok(Self::echo(id, body))
        }
        async fn delete_bridge(&self, id: &str) -> Result<()> {
            self.record(format!("bridge.delete({})", id))
        }
        async fn start_stop_bridge(&self, id: &str, enable: bool) -> Result<()> {
            self.record(format!("bridge.enable({}, {})", id, enable))
        }
        async fn bridge_metrics(&self, id: &str) -> Result<Value> {
            self.record(format!("bridge.metrics({})", id))?;
            Ok(json!({ "matched": 2 }))
        }
    }

    fn dispatcher(api: Arc<RecordingApi>) -> Dispatcher {
        Dispatcher::new(api, Arc::new(StaticCatalog::from_types(["mysql"])))
    }

    #[tokio::test]
    async fn test_id_operations_route_by_family() {
        let api = Arc::new(RecordingApi::default());
        let dispatcher = dispatcher(api.clone());

        dispatcher.get_detail("mysql:orders").await.unwrap();
        dispatcher.get_detail("webhook:hook").await.unwrap();
        dispatcher.delete_action("mysql:orders").await.unwrap();
        dispatcher.delete_action("webhook:hook").await.unwrap();
        dispatcher.toggle_action_enable("mysql:orders", false).await.unwrap();
        dispatcher.toggle_action_enable("webhook:hook", true).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![
                "action.get(mysql:orders)",
                "bridge.get(webhook:hook)",
                "action.delete(mysql:orders)",
                "bridge.delete(webhook:hook)",
                "action.enable(mysql:orders, false)",
                "bridge.enable(webhook:hook, true)",
            ]
        );
    }

    #[tokio::test]
    async fn test_metrics_never_deletes() {
        let api = Arc::new(RecordingApi::default());
        let dispatcher = dispatcher(api.clone());

        assert_eq!(dispatcher.get_metrics("mysql:orders").await.unwrap(), json!({ "matched": 1 }));
        assert_eq!(dispatcher.get_metrics("webhook:hook").await.unwrap(), json!({ "matched": 2 }));
        assert_eq!(api.calls(), vec!["action.metrics(mysql:orders)", "bridge.metrics(webhook:hook)"]);
    }

    #[tokio::test]
    async fn test_add_routes_by_payload_type() {
        let api = Arc::new(RecordingApi::default());
        let dispatcher = dispatcher(api.clone());

        let created = dispatcher.add_action(&ResourcePayload::new("mysql")).await.unwrap();
        assert_eq!(created.id.as_deref(), Some("mysql:new"));
        dispatcher.add_action(&ResourcePayload::new("webhook")).await.unwrap();

        assert_eq!(api.calls(), vec!["action.create(mysql)", "bridge.create(webhook)"]);
    }

    #[tokio::test]
    async fn test_update_sends_id_in_path_only() {
        let api = Arc::new(RecordingApi::default());
        let dispatcher = dispatcher(api.clone());

        let action = ResourcePayload::new("mysql")
            .with_id("mysql:orders")
            .with_field("status", json!("connected"))
            .with_field("sql", json!("insert into t values (${id})"));
        dispatcher.update_action(action).await.unwrap();

        let bridge = ResourcePayload::new("webhook")
            .with_id("webhook:hook")
            .with_field("url", json!("http://localhost"));
        dispatcher.update_action(bridge).await.unwrap();

        assert_eq!(api.calls(), vec!["action.update(mysql:orders)", "bridge.update(webhook:hook)"]);
        let bodies = api.bodies.lock().unwrap();
        assert!(bodies.iter().all(|b| !b.contains_key("id")));
        assert_eq!(Value::Object(bodies[0].clone()), json!({ "sql": "insert into t values (${id})" }));
        assert_eq!(
            Value::Object(bodies[1].clone()),
            json!({ "type": "webhook", "url": "http://localhost" })
        );
    }

    #[tokio::test]
    async fn test_update_without_id_fails_before_submitting() {
        let api = Arc::new(RecordingApi::default());
        let dispatcher = dispatcher(api.clone());

        let err = dispatcher
            .update_action(ResourcePayload::new("mysql"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("without an id"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_errors_propagate_unchanged() {
        let api = Arc::new(RecordingApi {
            fail: true,
            ..Default::default()
        });
        let dispatcher = dispatcher(api.clone());

        let err = dispatcher
            .update_action(ResourcePayload::new("webhook").with_id("webhook:hook"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API request failed: 500 Internal Server Error");

        let err = dispatcher.get_detail("mysql:orders").await.unwrap_err();
        assert_eq!(err.to_string(), "API request failed: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_handler_failure_aborts_update() {
        struct Refuse;

        #[async_trait]
        impl DataHandler for Refuse {
            async fn prepare(&self, _body: Map<String, Value>) -> Result<Map<String, Value>> {
                Err(anyhow::anyhow!("secret could not be resolved"))
            }
        }

        let api = Arc::new(RecordingApi::default());
        let dispatcher = dispatcher(api.clone()).with_handlers(Arc::new(Refuse), Arc::new(Refuse));

        let err = dispatcher
            .update_action(ResourcePayload::new("mysql").with_id("mysql:orders"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "secret could not be resolved");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_is_consulted_on_every_call() {
        let supported = Arc::new(AtomicBool::new(true));
        let flag = supported.clone();
        let catalog = move |t: &str| t == "mysql" && flag.load(Ordering::SeqCst);

        let api = Arc::new(RecordingApi::default());
        let dispatcher = Dispatcher::new(api.clone(), Arc::new(catalog));

        dispatcher.delete_action("mysql:orders").await.unwrap();
        supported.store(false, Ordering::SeqCst);
        dispatcher.delete_action("mysql:orders").await.unwrap();

        assert_eq!(api.calls(), vec!["action.delete(mysql:orders)", "bridge.delete(mysql:orders)"]);
    }
}
