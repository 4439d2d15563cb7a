use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use log::info;

use super::error::Result;
use super::state::AppState;
use super::types::*;

/// 保存一张图片到向量数据库
#[utoipa::path(
    post,
    path = "/train-vector",
    request_body = TrainRequest,
    responses(
        (status = 200, body = TrainResponse),
        (status = 500, body = ErrorResponse),
    )
)]
pub async fn train_vector_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TrainRequest>, JsonRejection>,
) -> Result<Json<TrainResponse>> {
    let Json(data) = payload?;
    info!("保存图片: {}", data.text);
    state.gateway.store_image(data.image, data.text).await?;
    Ok(Json(TrainResponse { message: "OK".to_string() }))
}

/// 搜索最相似的一张图片
#[utoipa::path(
    post,
    path = "/process-image",
    request_body = ProcessRequest,
    responses(
        (status = 200, body = ProcessResponse),
        (status = 500, body = ErrorResponse),
    )
)]
pub async fn process_image_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>> {
    let Json(data) = payload?;
    info!("正在搜索上传图片");
    let processed_image = state.gateway.find_nearest(&data.image).await?;
    Ok(Json(ProcessResponse { processed_image }))
}
