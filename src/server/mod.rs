mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::error::GENERIC_ERROR;
pub use self::state::*;

/// 请求体上限：50M
pub const BODY_LIMIT: usize = 1024 * 1024 * 50;

#[derive(OpenApi)]
#[openapi(
    paths(api::train_vector_handler, api::process_image_handler),
    components(schemas(
        types::TrainRequest,
        types::TrainResponse,
        types::ProcessRequest,
        types::ProcessResponse,
        types::ErrorResponse,
    ))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/train-vector", post(api::train_vector_handler))
        .route("/process-image", post(api::process_image_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .with_state(state)
}
