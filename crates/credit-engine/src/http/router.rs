use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use super::service::{
    AccountsOverviewRequest, AggregateRequest, BlendRequest, ClassifyRequest, CorridorRequest,
    EngineService, MappingRequest, OriginFitRequest, UtilizationRequest,
};
use crate::corridor::CorridorSelection;
use crate::error::EngineError;

/// Router builder exposing the scoring endpoints.
pub fn engine_router(service: Arc<EngineService>) -> Router {
    Router::new()
        .route("/api/v1/scores/classify", post(classify_handler))
        .route("/api/v1/scores/aggregate", post(aggregate_handler))
        .route("/api/v1/utilization", post(utilization_handler))
        .route("/api/v1/accounts/overview", post(accounts_handler))
        .route("/api/v1/countries/blend", post(blend_handler))
        .route("/api/v1/corridor/score", post(corridor_handler))
        .route(
            "/api/v1/corridor/selection",
            get(selection_handler).put(select_handler),
        )
        .route("/api/v1/lender-fit/origin", post(origin_fit_handler))
        .route("/api/v1/normalization/map", post(mapping_handler))
        .with_state(service)
}

fn respond<T: Serialize>(endpoint: &'static str, result: Result<T, EngineError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => {
            match &error {
                EngineError::Validation(details) => {
                    warn!(endpoint, violations = details.len(), "rejected request")
                }
            }
            error.into_response()
        }
    }
}

pub(crate) async fn classify_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<ClassifyRequest>,
) -> Response {
    respond("classify", service.classify(request))
}

pub(crate) async fn aggregate_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<AggregateRequest>,
) -> Response {
    respond("aggregate", service.aggregate(request))
}

pub(crate) async fn utilization_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<UtilizationRequest>,
) -> Response {
    respond("utilization", service.utilization(request))
}

pub(crate) async fn accounts_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<AccountsOverviewRequest>,
) -> Response {
    respond("accounts_overview", service.accounts_overview(request))
}

pub(crate) async fn blend_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<BlendRequest>,
) -> Response {
    respond("countries_blend", service.blend(request))
}

pub(crate) async fn corridor_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<CorridorRequest>,
) -> Response {
    respond("corridor_score", service.corridor_score(request))
}

pub(crate) async fn origin_fit_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<OriginFitRequest>,
) -> Response {
    respond("origin_fit", service.origin_fit(request))
}

pub(crate) async fn mapping_handler(
    State(service): State<Arc<EngineService>>,
    Json(request): Json<MappingRequest>,
) -> Response {
    respond("normalization_map", service.map_scores(request))
}

pub(crate) async fn selection_handler(State(service): State<Arc<EngineService>>) -> Response {
    (StatusCode::OK, Json(service.selection())).into_response()
}

pub(crate) async fn select_handler(
    State(service): State<Arc<EngineService>>,
    Json(selection): Json<CorridorSelection>,
) -> Response {
    respond("corridor_selection", service.select(selection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        engine_router(Arc::new(EngineService::new(EngineConfig::default())))
    }

    async fn send(router: Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, payload)
    }

    #[tokio::test]
    async fn classify_returns_band_and_percent() {
        let (status, payload) =
            send(router(), "POST", "/api/v1/scores/classify", json!({ "score": 742 })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["band"], "Very Good");
        assert_eq!(payload["percent_of_max"], 74);
    }

    #[tokio::test]
    async fn aggregate_flattens_score_fields() {
        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/scores/aggregate",
            json!({
                "components": {
                    "payment": 290, "utilization": 230, "age": 95, "inquiries": 45, "mix": 20
                }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["score"], 680.0);
        assert_eq!(payload["band"], "Good");
        assert_eq!(payload["weight_shares"][0]["percent"], 40);
    }

    #[tokio::test]
    async fn utilization_uses_configured_target_by_default() {
        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/utilization",
            json!({
                "as_of": "2025-10-15",
                "lines": [
                    { "id": "sapphire", "balance": 2600, "limit": 6000 },
                    { "id": "amex", "balance": 400, "limit": 3500 }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["target_percent"], 30.0);
        assert_eq!(payload["worst_line"]["id"], "sapphire");
        assert_eq!(payload["lines"][0]["id"], "sapphire");
        assert_eq!(payload["lines"][0]["paydown"], 800.0);
        assert_eq!(payload["lines"][1]["paydown"], 0.0);
    }

    #[tokio::test]
    async fn invalid_lines_are_rejected_with_every_detail() {
        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/utilization",
            json!({
                "target_percent": 140,
                "lines": [{ "id": "bad", "balance": -1, "limit": -2 }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(payload["error"], "request failed validation");
        assert_eq!(payload["details"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn corridor_score_records_last_score() {
        let service = Arc::new(EngineService::new(EngineConfig::default()));
        let (status, payload) = send(
            engine_router(service.clone()),
            "POST",
            "/api/v1/corridor/score",
            json!({ "origin": 680, "destination": 720 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["corridor"]["global"], 700);
        assert_eq!(payload["fit"]["tag"], "Pre-qualified");
        assert_eq!(payload["selection"]["origin"], "IN");
        assert_eq!(service.corridor().last_score().map(|s| s.global), Some(700));

        let (_, selection) = send(
            engine_router(service),
            "GET",
            "/api/v1/corridor/selection",
            Value::Null,
        )
        .await;
        assert_eq!(selection["last_score"]["gap"], 40.0);
    }

    #[tokio::test]
    async fn selection_update_normalizes_codes() {
        let service = Arc::new(EngineService::new(EngineConfig::default()));
        let (status, payload) = send(
            engine_router(service.clone()),
            "PUT",
            "/api/v1/corridor/selection",
            json!({ "origin": "ae", "destination": "gb" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["selection"]["origin"], "AE");
        assert_eq!(payload["changed"], true);

        let (status, _) = send(
            engine_router(service),
            "PUT",
            "/api/v1/corridor/selection",
            json!({ "origin": "UAE", "destination": "GB" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn blend_honours_configured_consent_policy() {
        let service = Arc::new(EngineService::new(EngineConfig {
            revoked_consent: crate::scoring::RevokedConsentPolicy::Exclude,
            ..EngineConfig::default()
        }));
        let (status, payload) = send(
            engine_router(service),
            "POST",
            "/api/v1/countries/blend",
            json!({
                "profiles": [
                    { "code": "IN", "normalized_score": 840, "reliability": "A", "weight": 0.5 },
                    {
                        "code": "US",
                        "normalized_score": 760,
                        "reliability": "B",
                        "weight": 0.5,
                        "consent": "revoked"
                    }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["global_score"], 420);
        assert_eq!(payload["excluded_revoked"], 1);
        assert_eq!(payload["policy"], "exclude");
    }

    #[tokio::test]
    async fn mapping_reports_points_and_shifts() {
        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/normalization/map",
            json!({ "anchors": [[670, 690], [740, 770]], "scores": [670, 1200] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["points"][0]["to"], 690);
        assert_eq!(payload["points"][1]["to"], 1000);
        assert_eq!(payload["shifts"]["very_good"], 30);
    }

    #[tokio::test]
    async fn origin_fit_includes_band_when_score_given() {
        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/lender-fit/origin",
            json!({
                "utilization_pct": 28,
                "on_time_rate": 97,
                "avg_age_months": 30,
                "inquiries_12m": 3,
                "score": 705
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["band"], "Good");
        assert_eq!(payload["fit"]["tag"], "Borderline");
        assert_eq!(payload["highlights"][0], "Low utilization (28%)");
    }

    #[tokio::test]
    async fn origin_fit_derives_metrics_from_history() {
        let mut months: Vec<Value> = (1..=12)
            .map(|month| json!({ "month": format!("2025-{month:02}"), "status": "on" }))
            .collect();
        months[3]["status"] = json!("late60");

        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/lender-fit/origin",
            json!({
                "utilization_pct": 22,
                "avg_age_months": 40,
                "as_of": "2025-12-20",
                "payment_history": months,
                "inquiries": [
                    { "date": "2025-11-03", "kind": "hard" },
                    { "date": "2025-02-14" },
                    { "date": "2025-08-01", "kind": "soft" },
                    { "date": "2023-05-09", "kind": "hard" }
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // 11 of 12 months on time
        assert_eq!(payload["metrics"]["on_time_rate"], 92.0);
        assert_eq!(payload["metrics"]["inquiries_12m"], 2);
        assert_eq!(payload["inquiries"]["impact"], "Moderate");
        assert_eq!(payload["fit"]["tag"], "Borderline");
    }

    #[tokio::test]
    async fn origin_fit_needs_payment_signal() {
        let (status, payload) = send(
            router(),
            "POST",
            "/api/v1/lender-fit/origin",
            json!({ "utilization_pct": 22, "avg_age_months": 40, "inquiries_12m": 0 }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            payload["details"][0],
            "on_time_rate or payment_history is required"
        );
    }
}
