//! HTTP tests for the wizard session API

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use domain_claims::adapters::InMemoryClaimStore;
use domain_claims::{AnswerPatch, ClaimRoute};
use interface_api::{config::ApiConfig, router_with_state, AppState};
use test_utils::{AnswerFixtures, DateFixtures, IdentifierFixtures};

fn test_app(config: ApiConfig) -> (Router, InMemoryClaimStore) {
    let store = InMemoryClaimStore::new();
    let state = AppState::new(config, Arc::new(store.clone()));
    (router_with_state(state), store)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn start_session(app: &Router) -> String {
    let (status, view) = send(app, "POST", "/api/v1/wizards", None).await;
    assert_eq!(status, StatusCode::CREATED);
    view["session_id"].as_str().unwrap().to_string()
}

async fn patch_answers(app: &Router, id: &str, patch: AnswerPatch) -> (StatusCode, Value) {
    let body = serde_json::to_value(patch).unwrap();
    send(app, "PATCH", &format!("/api/v1/wizards/{id}/answers"), Some(body)).await
}

async fn wait_for_record(store: &InMemoryClaimStore) {
    for _ in 0..50 {
        if !store.is_empty().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("completed claim was never stored");
}

mod health {
    use super::*;
    use async_trait::async_trait;
    use core_kernel::{
        ClaimId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
    };
    use domain_claims::{ClaimRecord, ClaimRecordPort};
    use interface_api::create_router;

    struct OfflineClaimStore;

    impl DomainPort for OfflineClaimStore {}

    #[async_trait]
    impl HealthCheckable for OfflineClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::unhealthy("offline-claim-store", "store offline")
        }
    }

    #[async_trait]
    impl ClaimRecordPort for OfflineClaimStore {
        async fn save_claim(
            &self,
            record: &ClaimRecord,
            _metadata: &OperationMetadata,
        ) -> Result<(), PortError> {
            Err(PortError::conflict(format!("claim {} rejected", record.id)))
        }

        async fn get_claim(&self, id: ClaimId) -> Result<ClaimRecord, PortError> {
            Err(PortError::not_found("ClaimRecord", id))
        }
    }

    #[tokio::test]
    async fn test_unhealthy_store_fails_readiness() {
        let app = create_router(ApiConfig::default(), Arc::new(OfflineClaimStore));

        let (status, _) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_and_readiness() {
        let app = create_router(ApiConfig::default(), Arc::new(InMemoryClaimStore::new()));

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active_sessions"], 0);
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn test_new_session_starts_at_first_step() {
        let (app, _) = test_app(ApiConfig::default());
        let (status, view) = send(&app, "POST", "/api/v1/wizards", None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view["current_step"], "channel");
        assert_eq!(view["step_index"], 1);
        assert_eq!(view["total_steps"], 6);
        assert_eq!(view["open_branch"], Value::Null);
        assert_eq!(view["complete"], false);
        assert_eq!(view["missing"], json!(["channel"]));
        assert!(view["session_id"].as_str().unwrap().starts_with("WIZ-"));
    }

    #[tokio::test]
    async fn test_session_id_accepted_with_or_without_prefix() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;
        let bare = id.trim_start_matches("WIZ-");

        let (status, _) = send(&app, "GET", &format!("/api/v1/wizards/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/v1/wizards/{bare}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _) = test_app(ApiConfig::default());
        let (status, body) = send(
            &app,
            "GET",
            "/api/v1/wizards/0191f1a2-7c3e-7d4a-9b1c-2e3f4a5b6c7d",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_session_id_is_bad_request() {
        let (app, _) = test_app(ApiConfig::default());
        let (status, _) = send(&app, "POST", "/api/v1/wizards/not-a-session/advance", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod transitions {
    use super::*;

    #[tokio::test]
    async fn test_advance_on_incomplete_step_names_missing_field() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/wizards/{id}/advance"), None).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "cannot_advance");
        assert_eq!(body["details"], json!(["channel"]));
    }

    #[tokio::test]
    async fn test_retreat_after_advance_returns_to_previous_step() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;
        patch_answers(&app, &id, AnswerFixtures::courier_overpayment()).await;

        let (_, view) = send(&app, "POST", &format!("/api/v1/wizards/{id}/advance"), None).await;
        assert_eq!(view["current_step"], "carrier");

        let (status, view) = send(&app, "POST", &format!("/api/v1/wizards/{id}/retreat"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["current_step"], "channel");
        assert_eq!(view["answers"]["channel"], "courier");
    }

    #[tokio::test]
    async fn test_overlong_identifier_is_rejected() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/v1/wizards/{id}/answers"),
            Some(json!({ "mrn": "9".repeat(60) })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}

mod branches {
    use super::*;

    #[tokio::test]
    async fn test_postal_answer_opens_bor286_and_gates_close() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;

        let (_, view) = send(
            &app,
            "PATCH",
            &format!("/api/v1/wizards/{id}/answers"),
            Some(json!({ "channel": "postal" })),
        )
        .await;
        assert_eq!(view["open_branch"], "bor286");

        let (status, body) = send(&app, "DELETE", &format!("/api/v1/wizards/{id}/branch"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "branch_incomplete");
        assert_eq!(body["details"], json!(["charge_reference"]));

        send(
            &app,
            "PATCH",
            &format!("/api/v1/wizards/{id}/answers"),
            Some(json!({ "charge_reference": IdentifierFixtures::charge_reference() })),
        )
        .await;

        let (status, view) = send(&app, "DELETE", &format!("/api/v1/wizards/{id}/branch"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["open_branch"], Value::Null);
    }

    #[tokio::test]
    async fn test_vat_return_branch_opens_and_closes_freely() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;

        let (status, view) = send(
            &app,
            "POST",
            &format!("/api/v1/wizards/{id}/branch"),
            Some(json!({ "kind": "vat_return" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["open_branch"], "vat_return");

        let (status, view) = send(&app, "DELETE", &format!("/api/v1/wizards/{id}/branch"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["open_branch"], Value::Null);
    }
}

mod routing {
    use super::*;

    #[tokio::test]
    async fn test_route_preview_for_low_value_courier() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;
        patch_answers(&app, &id, AnswerFixtures::courier_low_value()).await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/wizards/{id}/route"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"], "CE1179");
        let tags: Vec<&str> = body["required_evidence"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["tag"].as_str().unwrap())
            .collect();
        assert!(tags.contains(&"invoice"));
    }

    #[tokio::test]
    async fn test_route_preview_reports_missing_answer() {
        let (app, _) = test_app(ApiConfig::default());
        let id = start_session(&app).await;

        let (status, body) = send(&app, "GET", &format!("/api/v1/wizards/{id}/route"), None).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "incomplete_answers");
        assert_eq!(body["details"], json!(["claim_type"]));
    }
}

mod journeys {
    use super::*;

    async fn walk_to_completion(app: &Router, id: &str) -> Value {
        let mut view = Value::Null;
        for _ in 0..6 {
            let (status, next) = send(app, "POST", &format!("/api/v1/wizards/{id}/advance"), None).await;
            assert_eq!(status, StatusCode::OK, "advance failed: {next}");
            view = next;
        }
        view
    }

    #[tokio::test]
    async fn test_full_postal_journey_stores_bor286_claim() {
        let (app, store) = test_app(ApiConfig::default());
        let id = start_session(&app).await;

        let (status, view) = patch_answers(&app, &id, AnswerFixtures::complete_postal_journey()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["open_branch"], "bor286");
        send(&app, "DELETE", &format!("/api/v1/wizards/{id}/branch"), None).await;

        let view = walk_to_completion(&app, &id).await;

        assert_eq!(view["complete"], true);
        assert_eq!(view["outcome"]["route"], "BOR286");

        wait_for_record(&store).await;
        let records = store.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].route.route, ClaimRoute::Bor286);
    }

    #[tokio::test]
    async fn test_courier_journey_after_cutover_routes_to_cds() {
        let config = ApiConfig {
            cds_cutover: Some(DateFixtures::cds_cutover()),
            ..ApiConfig::default()
        };
        let (app, store) = test_app(config);
        let id = start_session(&app).await;

        let patch = AnswerFixtures::complete_courier_journey().import_date(DateFixtures::after_cutover());
        patch_answers(&app, &id, patch).await;

        let view = walk_to_completion(&app, &id).await;
        assert_eq!(view["outcome"]["route"], "CDS");

        wait_for_record(&store).await;
    }

    #[tokio::test]
    async fn test_completed_session_is_discarded() {
        let (app, store) = test_app(ApiConfig::default());
        let id = start_session(&app).await;
        patch_answers(&app, &id, AnswerFixtures::complete_courier_journey()).await;

        let (_, ready) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(ready["active_sessions"], 1);

        let view = walk_to_completion(&app, &id).await;
        assert_eq!(view["outcome"]["route"], "C285");

        let (_, ready) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(ready["active_sessions"], 0);

        let (status, _) = patch_answers(&app, &id, AnswerPatch::new().vat_registered(true)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        wait_for_record(&store).await;
    }

    #[tokio::test]
    async fn test_clearing_answers_on_review_blocks_completion() {
        let (app, store) = test_app(ApiConfig::default());
        let id = start_session(&app).await;
        patch_answers(&app, &id, AnswerFixtures::complete_courier_journey()).await;
        for _ in 0..5 {
            send(&app, "POST", &format!("/api/v1/wizards/{id}/advance"), None).await;
        }

        let (_, view) = send(
            &app,
            "PATCH",
            &format!("/api/v1/wizards/{id}/answers"),
            Some(json!({ "mrn": null })),
        )
        .await;
        assert_eq!(view["current_step"], "review");

        let (status, body) = send(&app, "POST", &format!("/api/v1/wizards/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "cannot_advance");
        assert_eq!(body["details"], json!(["mrn"]));
        assert!(store.is_empty().await);
    }
}
