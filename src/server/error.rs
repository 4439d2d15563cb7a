use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

use super::types::ErrorResponse;

/// 返回给调用方的统一错误信息，不区分具体原因
pub const GENERIC_ERROR: &str = "Error while processing the image";

/// API错误类型
pub struct AppError(pub anyhow::Error);

pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("处理图片时出错: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: GENERIC_ERROR.to_string() }))
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
