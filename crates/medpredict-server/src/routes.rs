//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use medpredict_core::{Domain, FeatureVector};
use medpredict_features::{
    CommonInput, DiabetesEncoder, DiabetesInput, Encoded, FeatureEncoder, HeartEncoder,
    HeartInput, ParkinsonsEncoder, ParkinsonsInput, SymptomEncoder,
};
use medpredict_models::{
    arbitrate, predict_risk, RiskPrediction, COMMON_PRIMARY_KEY, COMMON_SECONDARY_KEY,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Instant;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};

use crate::auth::require_api_key;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let predict = Router::new()
        .route("/diabetes", post(predict_diabetes))
        .route("/heart", post(predict_heart))
        .route("/parkinsons", post(predict_parkinsons))
        .route("/common", post(predict_common))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .nest("/predict", predict)
        .fallback(fallback)
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// CORS for the configured origins, with credentials and any method or header
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Health response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    models_loaded: BTreeMap<String, bool>,
    version: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: state.registry.status(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = state
        .metrics_handle
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Prediction response shared by every domain
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

impl PredictionResponse {
    fn risk(prediction: RiskPrediction, with_level: bool, risk_factors: serde_json::Value) -> Self {
        Self {
            risk_level: with_level.then(|| prediction.risk_level()),
            prediction: prediction.result.label,
            confidence: prediction.result.confidence,
            risk_factors: Some(risk_factors),
            model_used: None,
        }
    }
}

/// Count the request and any degraded answers
fn record_request(domain: Domain, encoded: Option<&Encoded>) {
    metrics::counter!("medpredict_requests_total", "domain" => domain.as_str()).increment(1);

    if let Some(encoded) = encoded.filter(|e| e.is_degraded()) {
        metrics::counter!("medpredict_degraded_inputs_total", "domain" => domain.as_str())
            .increment(1);
        debug!(domain = %domain, degraded = ?encoded.degraded, "Request used sentinel values");
    }
}

fn record_latency(domain: Domain, started: Instant) {
    metrics::histogram!("medpredict_inference_latency_us", "domain" => domain.as_str())
        .record(started.elapsed().as_micros() as f64);
}

/// Read a questionnaire body; an unreadable body is treated as all fields missing
fn read_input<T: Default>(domain: Domain, payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            warn!(
                domain = %domain,
                reason = %rejection.body_text(),
                "Unreadable request body, encoding with sentinel answers"
            );
            T::default()
        }
    }
}

/// Run the single binary model registered for `domain`
fn predict_fixed(
    state: &AppState,
    domain: Domain,
    features: &FeatureVector,
) -> Result<RiskPrediction, AppError> {
    let artifact = state
        .registry
        .get(domain.as_str())
        .ok_or(AppError::Unavailable(domain))?;

    let started = Instant::now();
    let prediction = predict_risk(&artifact, features)?;
    record_latency(domain, started);

    info!(
        domain = %domain,
        prediction = %prediction.result.label,
        confidence = prediction.result.confidence,
        tier = ?prediction.result.provenance,
        "Prediction complete"
    );

    Ok(prediction)
}

async fn predict_diabetes(
    State(state): State<AppState>,
    payload: Result<Json<DiabetesInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let input = read_input(Domain::Diabetes, payload);
    let encoded = DiabetesEncoder.encode(&input);
    record_request(Domain::Diabetes, Some(&encoded));

    let prediction = predict_fixed(&state, Domain::Diabetes, &encoded.features)?;

    Ok(Json(PredictionResponse::risk(
        prediction,
        false,
        json!({
            "excessive_thirst": input.excessive_thirst,
            "frequent_urination": input.frequent_urination,
            "weight_loss": input.unexplained_weight_loss,
            "fatigue": input.fatigue,
            "blurred_vision": input.blurred_vision,
            "slow_healing": input.slow_healing_wounds,
        }),
    )))
}

async fn predict_heart(
    State(state): State<AppState>,
    payload: Result<Json<HeartInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let input = read_input(Domain::Heart, payload);
    let encoded = HeartEncoder.encode(&input);
    record_request(Domain::Heart, Some(&encoded));

    let prediction = predict_fixed(&state, Domain::Heart, &encoded.features)?;

    Ok(Json(PredictionResponse::risk(
        prediction,
        true,
        json!({
            "chest_pain": input.chest_pain,
            "breathing_difficulty": input.breathing_difficulty,
            "age": input.age,
            "fatigue": input.fatigue,
            "heart_rate": input.heart_rate,
            "exercise_habits": input.exercise_habits,
        }),
    )))
}

async fn predict_parkinsons(
    State(state): State<AppState>,
    payload: Result<Json<ParkinsonsInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let input = read_input(Domain::Parkinsons, payload);
    let encoded = ParkinsonsEncoder.encode(&input);
    record_request(Domain::Parkinsons, Some(&encoded));

    let prediction = predict_fixed(&state, Domain::Parkinsons, &encoded.features)?;

    Ok(Json(PredictionResponse::risk(
        prediction,
        true,
        json!({
            "speech_problems": input.speech_problems,
            "tremors": input.tremors,
            "handwriting_changes": input.handwriting_changes,
            "balance_issues": input.balance_issues,
            "stiffness": input.stiffness,
            "age": input.age,
        }),
    )))
}

async fn predict_common(
    State(state): State<AppState>,
    payload: Result<Json<CommonInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let input = read_input(Domain::Common, payload);
    record_request(Domain::Common, None);

    let registry = &state.registry;
    let (Some(primary), Some(secondary), Some(encoder), Some(table)) = (
        registry.get(COMMON_PRIMARY_KEY),
        registry.get(COMMON_SECONDARY_KEY),
        registry.label_encoder(),
        registry.symptom_table(),
    ) else {
        return Err(AppError::Unavailable(Domain::Common));
    };

    let encoded = SymptomEncoder::new(table.columns()).encode(&input);

    let started = Instant::now();
    let result = arbitrate(&primary, &secondary, &encoder, &encoded.features)?;
    record_latency(Domain::Common, started);

    info!(
        domain = %Domain::Common,
        prediction = %result.label,
        confidence = result.confidence,
        model = ?result.model_used,
        "Prediction complete"
    );

    Ok(Json(PredictionResponse {
        prediction: result.label,
        confidence: result.confidence,
        risk_level: None,
        risk_factors: Some(json!({
            "symptoms": input.symptoms,
            "severity": input.severity,
            "duration": input.duration,
        })),
        model_used: result.model_used,
    }))
}

async fn fallback(method: Method) -> impl IntoResponse {
    debug!("Unmatched {} request", method);
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}
