use std::sync::Arc;

use log::debug;

use crate::metrics::{self, StoreOp};
use crate::store::{ImageRecord, StoreError, StoreResult, VectorStore};
use crate::utils::decode_image;

/// 将调用方的图片请求转发给向量数据库
#[derive(Clone)]
pub struct ImageGateway {
    store: Arc<dyn VectorStore>,
    class: String,
}

impl ImageGateway {
    pub fn new(store: Arc<dyn VectorStore>, class: impl Into<String>) -> Self {
        Self { store, class: class.into() }
    }

    /// 保存一张图片及其标签
    pub async fn store_image(&self, image: String, text: String) -> StoreResult<()> {
        decode_image(&image)?;
        debug!("保存图片: {text}");
        let record = ImageRecord { image, text };
        metrics::observe(StoreOp::Insert, self.store.insert(&self.class, &record)).await
    }

    /// 查找与 `image` 最相似的一张已保存图片，返回其 base64 内容
    pub async fn find_nearest(&self, image: &str) -> StoreResult<String> {
        decode_image(image)?;
        let matches =
            metrics::observe(StoreOp::NearImage, self.store.near_image(&self.class, image, 1)).await?;
        matches.into_iter().next().ok_or(StoreError::NoMatch)
    }
}
