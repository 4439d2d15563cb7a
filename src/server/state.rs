use std::sync::Arc;

use crate::gateway::ImageGateway;
use crate::store::VectorStore;

/// 应用状态
pub struct AppState {
    /// 向量数据库转发
    pub gateway: ImageGateway,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(store: Arc<dyn VectorStore>, class: impl Into<String>) -> Arc<Self> {
        Arc::new(AppState { gateway: ImageGateway::new(store, class) })
    }
}
