//! JSON API over the calculation engine.
//!
//! Input validation lives here; the engine accepts anything.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::{DefaultBodyLimit, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::{Validate, ValidationError};

use crate::calculations::{self, CityMetrics, KpiAssessment, KpiResults, KpiTarget, ProjectionResult, ProjectionTotals};
use crate::config::Config;
use crate::domain::value_objects::status;
use crate::domain::{DateRange, GroupKey, Order, StatusClass};
use crate::ingest::{extract_base_name, CityTableDetector, Country, CountryDetector};
use crate::AnalyticsError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub detector: Arc<dyn CountryDetector>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config: Arc::new(config), detector: Arc::new(CityTableDetector::default()) }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-cod-analytics"})) }))
        .route("/api/v1/status/classify", get(classify_status))
        .route("/api/v1/products/base-name", get(base_name))
        .route("/api/v1/kpis", post(kpis))
        .route("/api/v1/kpis/health", post(kpi_health))
        .route("/api/v1/projection", post(projection))
        .route("/api/v1/geo/cities", post(cities))
        .route("/api/v1/country/detect", post(detect_country))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn reject(e: AnalyticsError) -> (StatusCode, String) {
    tracing::warn!(error = %e, "rejected request");
    let status = match e {
        AnalyticsError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalyticsError::InvalidConfig { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn check(request: &impl Validate) -> Result<(), (StatusCode, String)> {
    request.validate().map_err(|e| reject(e.into()))
}

fn ordered_period(period: &DateRange) -> Result<(), ValidationError> {
    if period.is_ordered() { Ok(()) } else { Err(ValidationError::new("from_after_to")) }
}

fn non_negative_spend(spend: &HashMap<String, f64>) -> Result<(), ValidationError> {
    if spend.values().all(|v| *v >= 0.0) { Ok(()) } else { Err(ValidationError::new("negative_ad_spend")) }
}

/// Lines outside the window are dropped; with no bounds everything is kept.
fn in_period(orders: Vec<Order>, period: &DateRange) -> Vec<Order> {
    if period.is_unbounded() { return orders; }
    orders.into_iter().filter(|o| period.contains(o.date)).collect()
}

#[derive(Debug, Deserialize)]
pub struct ClassifyParams { pub status: String }

#[derive(Debug, Serialize)]
pub struct StatusReport { pub status: String, pub class: StatusClass, pub novelty: bool }

async fn classify_status(Query(p): Query<ClassifyParams>) -> Json<StatusReport> {
    let class = status::classify(&p.status);
    let novelty = status::is_novelty(&p.status);
    Json(StatusReport { status: p.status, class, novelty })
}

#[derive(Debug, Deserialize)]
pub struct BaseNameParams { pub name: String }

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseNameReport { pub name: String, pub base_name: String }

/// Suggests a shared group label for listing variants of the same product.
async fn base_name(Query(p): Query<BaseNameParams>) -> Json<BaseNameReport> {
    let base_name = extract_base_name(&p.name);
    Json(BaseNameReport { name: p.name, base_name })
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct KpiRequest {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub ad_spend: f64,
    pub global_revenue: Option<f64>,
    #[serde(flatten)]
    #[validate(custom = "ordered_period")]
    pub period: DateRange,
}

impl KpiRequest {
    fn compute(self) -> KpiResults {
        let orders = in_period(self.orders, &self.period);
        calculations::compute_kpis(&orders, self.ad_spend, self.global_revenue)
    }
}

async fn kpis(Json(r): Json<KpiRequest>) -> ApiResult<KpiResults> {
    check(&r)?;
    tracing::info!(lines = r.orders.len(), ad_spend = r.ad_spend, "computing KPIs");
    Ok(Json(r.compute()))
}

#[derive(Debug, Deserialize)]
pub struct HealthRequest {
    #[serde(flatten)]
    pub request: KpiRequest,
    pub targets: Option<Vec<KpiTarget>>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse { pub kpis: KpiResults, pub health: Vec<KpiAssessment> }

async fn kpi_health(Json(r): Json<HealthRequest>) -> ApiResult<HealthResponse> {
    check(&r.request)?;
    tracing::info!(lines = r.request.orders.len(), custom_targets = r.targets.is_some(), "assessing KPI health");
    let targets = r.targets.unwrap_or_else(calculations::default_kpi_targets);
    let kpis = r.request.compute();
    let health = calculations::assess(&kpis, &targets);
    Ok(Json(HealthResponse { kpis, health }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub group_key: GroupKey,
    #[serde(default)]
    pub target_delivery: HashMap<String, f64>,
    #[validate(range(min = 0.0))]
    pub buffer_multiplier: Option<f64>,
    #[serde(default)]
    #[validate(custom = "non_negative_spend")]
    pub ad_spend: HashMap<String, f64>,
    #[serde(flatten)]
    #[validate(custom = "ordered_period")]
    pub period: DateRange,
}

#[derive(Debug, Serialize)]
pub struct ProjectionResponse { pub results: Vec<ProjectionResult>, pub totals: ProjectionTotals }

async fn projection(State(s): State<AppState>, Json(r): Json<ProjectionRequest>) -> ApiResult<ProjectionResponse> {
    check(&r)?;
    let buffer = r.buffer_multiplier.unwrap_or(s.config.default_buffer_multiplier);
    tracing::info!(lines = r.orders.len(), group_key = %r.group_key, buffer, "computing projection");
    let orders = in_period(r.orders, &r.period);
    let results = calculations::compute_projection(&orders, r.group_key, &r.target_delivery, buffer, &r.ad_spend);
    let totals = calculations::summarize(&results);
    Ok(Json(ProjectionResponse { results, totals }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CitiesRequest {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(flatten)]
    #[validate(custom = "ordered_period")]
    pub period: DateRange,
}

async fn cities(Json(r): Json<CitiesRequest>) -> ApiResult<Vec<CityMetrics>> {
    check(&r)?;
    tracing::info!(lines = r.orders.len(), "aggregating by city");
    let orders = in_period(r.orders, &r.period);
    Ok(Json(calculations::aggregate_by_city(&orders)))
}

#[derive(Debug, Deserialize)]
pub struct CountryRequest { pub cities: Vec<String> }

#[derive(Debug, Serialize)]
pub struct CountryResponse { pub country: Option<Country> }

async fn detect_country(State(s): State<AppState>, Json(r): Json<CountryRequest>) -> Json<CountryResponse> {
    let country = s.detector.detect(&r.cities);
    tracing::debug!(cities = r.cities.len(), ?country, "country detection");
    Json(CountryResponse { country })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router { router(AppState::new(Config::default())) }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        send(Request::post(uri).header("content-type", "application/json").body(Body::from(body.to_string())).unwrap()).await
    }

    fn order(id: &str, status: &str, total: f64, cost: f64, shipping: f64) -> Value {
        json!({"id": id, "status": status, "totalAmount": total, "supplierUnitCost": cost, "shippingCost": shipping})
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_classify() {
        let (status, body) = send(Request::get("/api/v1/status/classify?status=CON%20NOVEDAD").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["class"], "transit");
        assert_eq!(body["novelty"], true);
    }

    #[tokio::test]
    async fn test_kpis_multi_line_order() {
        let (status, body) = post_json("/api/v1/kpis", json!({
            "orders": [
                order("1", "ENTREGADO", 80000.0, 10000.0, 8000.0),
                order("1", "ENTREGADO", 80000.0, 12000.0, 8000.0),
                order("2", "ENTREGADO", 60000.0, 15000.0, 7000.0),
            ],
            "adSpend": 20000.0
        })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalOrders"], 2);
        assert_eq!(body["realIncome"], 140000.0);
        assert_eq!(body["costOfGoods"], 37000.0);
        assert_eq!(body["forwardShipping"], 15000.0);
    }

    #[tokio::test]
    async fn test_kpis_accepts_blank_cells() {
        let (status, body) = post_json("/api/v1/kpis", json!({
            "orders": [{"id": "7", "status": null, "totalAmount": null, "shippingCost": null}]
        })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalOrders"], 1);
        assert_eq!(body["inTransit"], 1);
        assert_eq!(body["netInvoiced"], 0.0);
    }

    #[tokio::test]
    async fn test_base_name() {
        let (status, body) = send(
            Request::get("/api/v1/products/base-name?name=Lampara%20LED%20x%202%20para%20Cocina").body(Body::empty()).unwrap(),
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["baseName"], "LAMPARA LED");
    }

    #[tokio::test]
    async fn test_kpis_rejects_negative_spend() {
        let (status, _) = post_json("/api/v1/kpis", json!({"orders": [], "adSpend": -1.0})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_kpis_period_filter() {
        let mut early = order("1", "ENTREGADO", 50000.0, 0.0, 0.0);
        early["date"] = json!("2025-01-10");
        let mut late = order("2", "ENTREGADO", 70000.0, 0.0, 0.0);
        late["date"] = json!("2025-02-10");
        let undated = order("3", "ENTREGADO", 90000.0, 0.0, 0.0);

        let (status, body) = post_json("/api/v1/kpis", json!({
            "orders": [early, late, undated], "from": "2025-02-01", "to": "2025-02-28"
        })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalOrders"], 1);
        assert_eq!(body["realIncome"], 70000.0);

        let (status, _) = post_json("/api/v1/kpis", json!({"orders": [], "from": "2025-03-01", "to": "2025-02-01"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_kpi_health_with_default_targets() {
        let (status, body) = post_json("/api/v1/kpis/health", json!({
            "orders": [order("1", "ENTREGADO", 50000.0, 15000.0, 8000.0)],
            "adSpend": 10000.0
        })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kpis"]["realProfit"], 17000.0);
        let health = body["health"].as_array().unwrap();
        assert_eq!(health.len(), 7);
        let roas = health.iter().find(|a| a["key"] == "roas_real").unwrap();
        assert_eq!(roas["status"], "good");
    }

    #[tokio::test]
    async fn test_projection_spend_only_product() {
        let mut line = order("1", "ENTREGADO", 50000.0, 15000.0, 8000.0);
        line["productId"] = json!("P1");
        let (status, body) = post_json("/api/v1/projection", json!({
            "orders": [line],
            "groupKey": "productId",
            "targetDelivery": {"P1": 100.0},
            "adSpend": {"P2": 5000.0}
        })).await;
        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["productId"], "P2");
        assert_eq!(results[1]["orders"], 0);
        assert_eq!(results[1]["profit"], -5000.0);
        assert_eq!(body["totals"]["profit"], 22000.0);
    }

    #[tokio::test]
    async fn test_projection_rejects_negative_buffer() {
        let (status, _) = post_json("/api/v1/projection", json!({"orders": [], "bufferMultiplier": -0.5})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = post_json("/api/v1/projection", json!({"orders": [], "adSpend": {"P1": -3.0}})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_cities_and_country() {
        let mut a = order("1", "ENTREGADO", 50000.0, 0.0, 8000.0);
        a["city"] = json!("Quito");
        let (status, body) = post_json("/api/v1/geo/cities", json!({"orders": [a]})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["city"], "Quito");
        assert_eq!(body[0]["deliveryRate"], 100.0);

        let (status, body) = post_json("/api/v1/country/detect", json!({"cities": ["Quito", "Guayaquil"]})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["country"], "Ecuador");

        let (_, body) = post_json("/api/v1/country/detect", json!({"cities": ["Lima"]})).await;
        assert_eq!(body["country"], Value::Null);
    }
}
