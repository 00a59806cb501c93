use crate::infra::{deserialize_month, deserialize_settings, validate_records, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use commission_engine::bonus::{
    DateRange, DebtorBonus, MethodQuantities, MonthlyReport, PublicationBonus, RankingEntry,
    RankingPeriod, RegistrationBonus, Scope, TransactionRecord, UserEvolution, UserId,
};
use commission_engine::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct QuantitiesRequest {
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
    #[serde(flatten)]
    pub(crate) quantities: MethodQuantities,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DebtorRequest {
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
    pub(crate) resolved_amount: f64,
    #[serde(default)]
    pub(crate) paid_installments: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MonthlyReportRequest {
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
    #[serde(deserialize_with = "deserialize_month")]
    pub(crate) month: NaiveDate,
    #[serde(default)]
    pub(crate) user_id: Option<UserId>,
    #[serde(default)]
    pub(crate) records: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvolutionRequest {
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
    #[serde(deserialize_with = "deserialize_month")]
    pub(crate) month: NaiveDate,
    pub(crate) user_id: UserId,
    #[serde(default)]
    pub(crate) records: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankingRequest {
    #[serde(default, deserialize_with = "deserialize_settings")]
    pub(crate) settings: BTreeMap<String, String>,
    #[serde(deserialize_with = "deserialize_month")]
    pub(crate) month: NaiveDate,
    #[serde(default)]
    pub(crate) period: RankingPeriod,
    #[serde(default)]
    pub(crate) records: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankingResponse {
    pub(crate) period: RankingPeriod,
    pub(crate) period_label: &'static str,
    pub(crate) range: DateRange,
    pub(crate) entries: Vec<RankingEntry>,
}

pub(crate) fn bonus_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/bonus/registration", post(registration_endpoint))
        .route("/api/v1/bonus/publication", post(publication_endpoint))
        .route("/api/v1/bonus/debtor", post(debtor_endpoint))
        .route("/api/v1/reports/monthly", post(monthly_report_endpoint))
        .route("/api/v1/reports/evolution", post(evolution_endpoint))
        .route("/api/v1/reports/ranking", post(ranking_endpoint))
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

pub(crate) async fn registration_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<QuantitiesRequest>,
) -> Result<Json<RegistrationBonus>, AppError> {
    let engine = state.engine_for(&payload.settings)?;
    Ok(Json(engine.registration(payload.quantities)))
}

pub(crate) async fn publication_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<QuantitiesRequest>,
) -> Result<Json<PublicationBonus>, AppError> {
    let engine = state.engine_for(&payload.settings)?;
    Ok(Json(engine.publication(payload.quantities)))
}

pub(crate) async fn debtor_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DebtorRequest>,
) -> Result<Json<DebtorBonus>, AppError> {
    if !payload.resolved_amount.is_finite() || payload.resolved_amount < 0.0 {
        return Err(AppError::invalid_request(
            "resolved_amount must be a non-negative number",
        ));
    }

    let engine = state.engine_for(&payload.settings)?;
    Ok(Json(
        engine.debtor(payload.resolved_amount, payload.paid_installments),
    ))
}

pub(crate) async fn monthly_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<MonthlyReportRequest>,
) -> Result<Json<MonthlyReport>, AppError> {
    validate_records(&payload.records)?;
    let engine = state.engine_for(&payload.settings)?;
    let scope = match payload.user_id {
        Some(user_id) => Scope::User(user_id),
        None => Scope::AllUsers,
    };

    debug!(
        month = %payload.month,
        records = payload.records.len(),
        ?scope,
        "monthly report requested"
    );

    Ok(Json(
        engine.monthly_report(&payload.records, payload.month, &scope),
    ))
}

pub(crate) async fn evolution_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<EvolutionRequest>,
) -> Result<Json<UserEvolution>, AppError> {
    validate_records(&payload.records)?;
    let engine = state.engine_for(&payload.settings)?;
    Ok(Json(engine.evolution(
        &payload.records,
        &payload.user_id,
        payload.month,
    )))
}

pub(crate) async fn ranking_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RankingRequest>,
) -> Result<Json<RankingResponse>, AppError> {
    validate_records(&payload.records)?;
    let engine = state.engine_for(&payload.settings)?;
    let entries = engine.ranking(&payload.records, payload.month, payload.period);

    Ok(Json(RankingResponse {
        period: payload.period,
        period_label: payload.period.label(),
        range: payload.period.range(payload.month),
        entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            default_settings: Arc::new(BTreeMap::new()),
        }
    }

    fn router(ready: bool) -> Router {
        bonus_router().layer(Extension(test_state(ready)))
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                axum::http::Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn march_records() -> Value {
        json!([
            { "user_id": "ana", "date": "2025-03-03", "category": "registration",
              "payment_method": "cash", "quantity": 30 },
            { "user_id": "ana", "date": "2025-03-04", "category": "registration",
              "payment_method": "installment", "quantity": 5 },
            { "user_id": "ana", "date": "2025-03-05", "category": "registration",
              "payment_method": "promotional", "quantity": 2 },
            { "user_id": "ana", "date": "2025-03-20", "category": "debtor",
              "resolved_amount": 2000, "paid_installments": 4 },
            { "user_id": "bruno", "date": "2025-02-10", "category": "publication",
              "payment_method": "cash", "quantity": 2 },
            { "user_id": "bruno", "date": "2025-03-10", "category": "publication",
              "payment_method": "cash", "quantity": 10 },
            { "user_id": "bruno", "date": "2025-03-11", "category": "publication",
              "payment_method": "installment", "quantity": 4 }
        ])
    }

    #[tokio::test]
    async fn registration_endpoint_applies_goal_rate() {
        let request = QuantitiesRequest {
            settings: BTreeMap::from([("meta_registros".to_string(), "30".to_string())]),
            quantities: MethodQuantities::new(30, 5, 2),
        };

        let Json(body) = registration_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect("registration computes");

        assert!(body.goal_reached);
        assert_eq!(body.multiplier_label, "2x");
        assert_eq!(body.total, 3350.0);
    }

    #[tokio::test]
    async fn publication_route_accepts_numeric_settings() {
        let (status, body) = post_json(
            router(true),
            "/api/v1/bonus/publication",
            json!({
                "settings": { "publicacao_valor_avista": 100, "publicacao_valor_parcelado": "50" },
                "cash": 10,
                "installment": 4
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], json!(1200.0));
    }

    #[tokio::test]
    async fn debtor_route_reports_tier() {
        let (status, body) = post_json(
            router(true),
            "/api/v1/bonus/debtor",
            json!({ "resolved_amount": 2000, "paid_installments": 4 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["per_installment"], json!(500.0));
        assert_eq!(body["tier_label"], json!("399–597"));
        assert_eq!(body["total"], json!(100.0));
    }

    #[tokio::test]
    async fn debtor_endpoint_rejects_negative_amounts() {
        let request = DebtorRequest {
            settings: BTreeMap::new(),
            resolved_amount: -10.0,
            paid_installments: 1,
        };

        let error = debtor_endpoint(Extension(test_state(true)), Json(request))
            .await
            .expect_err("negative amount rejected");

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_settings_return_bad_request() {
        let (status, body) = post_json(
            router(true),
            "/api/v1/bonus/registration",
            json!({ "settings": { "faixa_1_max": "100" }, "cash": 1 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("strictly increasing"));
    }

    #[tokio::test]
    async fn monthly_report_route_covers_all_categories() {
        let (status, body) = post_json(
            router(true),
            "/api/v1/reports/monthly",
            json!({ "month": "2025-03", "user_id": "ana", "records": march_records() }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["registration"]["total"], json!(3350.0));
        assert_eq!(body["debtor"]["total"], json!(100.0));
        assert_eq!(body["total"], json!(3450.0));
        assert_eq!(body["summary"]["record_count"], json!(4));
    }

    #[tokio::test]
    async fn monthly_report_rejects_malformed_month() {
        let (status, _) = post_json(
            router(true),
            "/api/v1/reports/monthly",
            json!({ "month": "March", "records": [] }),
        )
        .await;

        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn evolution_route_compares_previous_month() {
        let (status, body) = post_json(
            router(true),
            "/api/v1/reports/evolution",
            json!({ "month": "2025-03", "user_id": "bruno", "records": march_records() }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["previous_month"]["total"], json!(200.0));
        assert_eq!(body["month"]["total"], json!(1200.0));
        assert_eq!(body["evolution_pct"], json!(500.0));
    }

    #[tokio::test]
    async fn ranking_route_orders_sellers() {
        let (status, body) = post_json(
            router(true),
            "/api/v1/reports/ranking",
            json!({ "month": "2025-03", "period": "quarter", "records": march_records() }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], json!("quarter"));
        assert_eq!(body["range"]["start"], json!("2025-01-01"));
        let entries = body["entries"].as_array().expect("entries");
        assert_eq!(entries[0]["user_id"], json!("ana"));
        assert_eq!(entries[1]["user_id"], json!("bruno"));
        assert_eq!(entries[1]["bonus"]["total"], json!(1400.0));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let response = router(false)
            .oneshot(
                axum::http::Request::get("/ready")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = router(true)
            .oneshot(
                axum::http::Request::get("/health")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
