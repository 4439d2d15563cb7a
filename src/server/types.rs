use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 保存图片的请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct TrainRequest {
    /// base64 编码的图片
    pub image: String,
    /// 图片标签
    pub text: String,
}

/// 保存成功的响应
#[derive(Debug, Serialize, ToSchema)]
pub struct TrainResponse {
    /// 固定为 `OK`
    pub message: String,
}

/// 以图搜图的请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    /// base64 编码的图片
    pub image: String,
}

/// 以图搜图的响应
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    /// 最相似图片的 base64 内容
    #[serde(rename = "processedImage")]
    pub processed_image: String,
}

/// 错误响应
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
