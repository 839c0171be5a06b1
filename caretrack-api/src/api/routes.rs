use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::api::handlers::{analysis, health, medications, patients, readings};
use crate::api::AppState;
use crate::openapi::configure_swagger_routes;
use caretrack_domain::auth::auth_middleware;

/// Create the application router
pub fn create_app(state: AppState) -> Router {
    debug!("Creating application router");

    // Resource routes, all behind bearer authentication
    let api_routes = Router::new()
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/:id",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/medications",
            get(medications::list_medications).post(medications::create_medication),
        )
        // Static segments before parametrized ones to avoid conflicts
        .route(
            "/medications/patient/:patient_id",
            get(medications::patient_medications),
        )
        .route(
            "/medications/:id",
            get(medications::get_medication)
                .put(medications::update_medication)
                .delete(medications::delete_medication),
        )
        .route("/medications/:id/taken", put(medications::mark_dose_taken))
        .route(
            "/readings",
            get(readings::list_readings).post(readings::create_reading),
        )
        .route(
            "/readings/patient/:patient_id",
            get(readings::patient_readings),
        )
        .route("/readings/:id", get(readings::get_reading))
        .route("/ai/analyze", post(analysis::analyze))
        .route("/ai/ranges", get(analysis::ranges))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AppState>,
        ));

    debug!("API routes configured");

    // Public routes that don't require authentication
    let public_routes = Router::new().route("/health", get(health::health_check));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .with_state(state);

    let app = app.merge(configure_swagger_routes());

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    health::initialize_server_start_time();
    debug!("Application router ready");

    app
}
