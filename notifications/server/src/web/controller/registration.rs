use axum::extract::State;
use notifications_axum::response::EncapsulatedJson;

use crate::{
    web::{
        controller::{
            error::Result,
            notify::ensure_scope,
            params::{KindParams, RegistrationParams},
        },
        extractor::{CallingClient, ValidatedJson},
        middleware::{CRITICAL_NOTIFICATIONS_WRITE_SCOPE, NOTIFICATIONS_WRITE_SCOPE},
    },
    ServiceState,
};

/// Register the calling client and the kinds of notification it sends
#[utoipa::path(
    put,
    operation_id = "register",
    path = "/registration",
    request_body = RegistrationParams,
    responses(
        (status = 200, body = RegistrationParams),
        (status = 403, description = "Missing `notifications.write` scope, or \
            `critical_notifications.write` for a critical kind"),
        (status = 422, description = "Invalid registration params")
    ),
    security(("bearer_auth" = [])),
    tag = "Registration"
)]
#[tracing::instrument(skip_all, fields(client_id = %client.client_id))]
pub async fn register(
    State(state): State<ServiceState>,
    CallingClient(client): CallingClient,
    ValidatedJson(params): ValidatedJson<RegistrationParams>,
) -> Result<EncapsulatedJson<RegistrationParams>> {
    ensure_scope(&client, NOTIFICATIONS_WRITE_SCOPE)?;
    if params.kinds.iter().flatten().any(|kind| kind.critical) {
        ensure_scope(&client, CRITICAL_NOTIFICATIONS_WRITE_SCOPE)?;
    }

    let (registered_client, kinds) = params.into_registration(&client.client_id)?;
    state.registry.register(&registered_client, kinds.as_deref()).await?;
    tracing::info!("Registered {} kinds", kinds.as_ref().map_or(0, Vec::len));

    Ok(EncapsulatedJson::ok(RegistrationParams {
        source_description: registered_client.description,
        kinds: kinds.map(|kinds| {
            kinds
                .into_iter()
                .map(|kind| KindParams {
                    id: kind.id,
                    description: kind.description,
                    critical: kind.critical,
                })
                .collect()
        }),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::StatusCode, Extension};
    use axum_test::TestServer;
    use notifications_core::model::{Client, Kind};
    use serde_json::{json, Value};
    use sqlx::PgPool;

    use crate::{
        service::{testing::FakeClientRegistry, StrategyRegistry},
        web::{
            controller::notify_router,
            middleware::{AuthClient, JwksClient},
        },
        ServiceState,
    };

    fn registration_server(registry: &Arc<FakeClientRegistry>, scopes: &[&str]) -> TestServer {
        let state = ServiceState {
            database: PgPool::connect_lazy("postgres://localhost/notifications").unwrap(),
            strategies: StrategyRegistry::<PgPool>::default(),
            registry: registry.clone(),
            jwks_client: JwksClient::new("https://uaa.example.com", true).unwrap(),
        };
        let client = AuthClient {
            client_id: "raptors".to_string(),
            scopes: scopes.iter().map(ToString::to_string).collect(),
            uaa_host: "https://uaa.example.com".to_string(),
        };

        TestServer::new(notify_router(&state).layer(Extension(client))).unwrap()
    }

    fn kind(id: &str, description: &str, critical: bool) -> Kind {
        Kind { id: id.to_string(), description: description.to_string(), critical }
    }

    fn raptor_kinds() -> Value {
        json!({
            "source_description": "Raptor Containment Unit",
            "kinds": [
                {"id": "perimeter_breach", "description": "Perimeter Breach", "critical": true},
                {"id": "feeding_time", "description": "Feeding Time"},
            ],
        })
    }

    #[tokio::test]
    async fn test_stores_client_and_kinds() {
        let registry = Arc::new(FakeClientRegistry::default());
        let server = registration_server(
            &registry,
            &["notifications.write", "critical_notifications.write"],
        );

        let response = server.put("/registration").json(&raptor_kinds()).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            registry.client("raptors"),
            Some(Client {
                id: "raptors".to_string(),
                description: "Raptor Containment Unit".to_string()
            })
        );
        assert_eq!(
            registry.kinds("raptors"),
            vec![
                kind("feeding_time", "Feeding Time", false),
                kind("perimeter_breach", "Perimeter Breach", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_removes_kinds_missing_from_the_request() {
        let registry = Arc::new(
            FakeClientRegistry::default()
                .with_kind("raptors", kind("perimeter_breach", "Perimeter Breach", false))
                .with_kind("raptors", kind("old_kind", "Gone", false))
                .with_kind("other-client", kind("old_kind", "Kept", false)),
        );
        let server = registration_server(&registry, &["notifications.write"]);

        let response = server
            .put("/registration")
            .json(&json!({
                "source_description": "Raptor Containment Unit",
                "kinds": [{"id": "perimeter_breach", "description": "Perimeter Breach"}],
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            registry.kinds("raptors"),
            vec![kind("perimeter_breach", "Perimeter Breach", false)]
        );
        assert_eq!(registry.kinds("other-client"), vec![kind("old_kind", "Kept", false)]);
    }

    #[tokio::test]
    async fn test_keeps_kinds_when_absent_and_trims_all_when_empty() {
        let registry = Arc::new(
            FakeClientRegistry::default()
                .with_kind("raptors", kind("perimeter_breach", "Perimeter Breach", false)),
        );
        let server = registration_server(&registry, &["notifications.write"]);

        let response = server
            .put("/registration")
            .json(&json!({"source_description": "Raptor Containment Unit"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(registry.kinds("raptors").len(), 1);

        let response = server
            .put("/registration")
            .json(&json!({"source_description": "Raptor Containment Unit", "kinds": []}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(registry.kinds("raptors").is_empty());
    }

    #[tokio::test]
    async fn test_critical_kinds_require_critical_scope() {
        let registry = Arc::new(FakeClientRegistry::default());

        let response = registration_server(&registry, &["notifications.write"])
            .put("/registration")
            .json(&raptor_kinds())
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert!(registry.client("raptors").is_none());
        assert!(registry.kinds("raptors").is_empty());
    }

    #[tokio::test]
    async fn test_rejects_invalid_registrations() {
        let registry = Arc::new(FakeClientRegistry::default());
        let server = registration_server(&registry, &["notifications.write"]);

        let response = server.put("/registration").text("{not json").await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = server.put("/registration").json(&json!({})).await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"]["type"], "VALIDATION");

        let response = registration_server(&registry, &["emails.write"])
            .put("/registration")
            .json(&json!({"source_description": "Raptor Containment Unit"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert!(registry.client("raptors").is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let registry = Arc::new(FakeClientRegistry::default());
        registry.fail();
        let server = registration_server(&registry, &["notifications.write"]);

        let response = server
            .put("/registration")
            .json(&json!({"source_description": "Raptor Containment Unit"}))
            .await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
