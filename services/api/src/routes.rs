use crate::infra::{replay_answers, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use preflight_risk::assessment::{
    ApproachType, AssessmentError, BooleanField, Category, ScoreComponent, ScoreSheet,
};
use preflight_risk::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreRequest {
    /// Boolean answers keyed by field identifier; omitted fields stay false.
    #[serde(default)]
    pub(crate) answers: BTreeMap<String, bool>,
    #[serde(default)]
    pub(crate) ifr_approach_type: Option<String>,
    #[serde(default)]
    pub(crate) include_breakdown: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreResponse {
    pub(crate) scores: ScoreSheet,
    pub(crate) ifr_approach_type: ApproachType,
    pub(crate) raised: Vec<BooleanField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) breakdown: Option<Vec<ScoreComponent>>,
}

pub(crate) fn assessment_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/assessments/score", post(score_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let response = score_assessment(&state, payload)?;
    Ok(Json(response))
}

// Replays the request into a fresh session and snapshots the result.
fn score_assessment(state: &AppState, request: ScoreRequest) -> Result<ScoreResponse, AssessmentError> {
    let ScoreRequest {
        answers,
        ifr_approach_type,
        include_breakdown,
    } = request;

    let session = replay_answers(
        &state.engine,
        answers.iter().map(|(key, value)| (key.as_str(), *value)),
        ifr_approach_type.as_deref(),
    )?;

    let breakdown = include_breakdown
        .unwrap_or(state.assessment.include_breakdown)
        .then(|| session.breakdown(Category::Total));

    debug!(total = session.total_score(), "assessment scored");

    Ok(ScoreResponse {
        scores: *session.scores(),
        ifr_approach_type: session.approach(),
        raised: session.answers().raised_flags().collect(),
        breakdown,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use preflight_risk::assessment::ScoringEngine;
    use preflight_risk::config::AssessmentConfig;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_state(include_breakdown: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            engine: Arc::new(ScoringEngine::standard().expect("standard configuration")),
            assessment: AssessmentConfig { include_breakdown },
        }
    }

    fn request(answers: &[(&str, bool)], approach: Option<&str>) -> ScoreRequest {
        ScoreRequest {
            answers: answers
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
            ifr_approach_type: approach.map(str::to_string),
            include_breakdown: None,
        }
    }

    #[tokio::test]
    async fn score_endpoint_returns_worked_example() {
        let payload = request(
            &[
                ("lessThan50InType", true),
                ("afterWork", true),
                ("mountainous", true),
            ],
            Some("nonprecision"),
        );

        let Json(body) = score_endpoint(Extension(app_state(true)), Json(payload))
            .await
            .expect("assessment scores");

        assert_eq!(body.scores.pilot, 3);
        assert_eq!(body.scores.airport, 5);
        assert_eq!(body.scores.total, 8);
        assert_eq!(body.ifr_approach_type, ApproachType::Nonprecision);
        assert_eq!(body.raised.len(), 3);
        let breakdown = body.breakdown.expect("breakdown included by default");
        assert_eq!(breakdown.len(), 4);
    }

    #[tokio::test]
    async fn breakdown_can_be_disabled_per_request() {
        let mut payload = request(&[("night", true)], None);
        payload.include_breakdown = Some(false);

        let Json(body) = score_endpoint(Extension(app_state(true)), Json(payload))
            .await
            .expect("assessment scores");

        assert!(body.breakdown.is_none());
        assert_eq!(body.scores.environment, 2);
    }

    #[tokio::test]
    async fn unknown_field_is_a_bad_request() {
        let app = assessment_routes().layer(Extension(app_state(false)));
        let response = app
            .oneshot(
                Request::post("/api/v1/assessments/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"answers":{"fuelLow":true}}"#))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("fuelLow"));
    }

    #[tokio::test]
    async fn json_payload_round_trips_through_router() {
        let app = assessment_routes().layer(Extension(app_state(false)));
        let response = app
            .oneshot(
                Request::post("/api/v1/assessments/score")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"answers":{"IFRCurrent":true,"night":true},"ifrApproachType":"circling"}"#,
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["scores"]["pilot"], -1);
        assert_eq!(body["scores"]["airport"], 3);
        assert_eq!(body["scores"]["total"], 4);
        assert_eq!(body["ifrApproachType"], "circling");
        assert!(body.get("breakdown").is_none());
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let state = app_state(true);
        state
            .readiness
            .store(false, std::sync::atomic::Ordering::Release);

        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
