mod memory;
mod types;
mod weaviate;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use self::memory::MemoryStore;
pub use self::types::*;
pub use self::weaviate::WeaviateStore;

/// 向量数据库访问错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("请求向量数据库失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("向量数据库返回错误 {status}: {body}")]
    Status { status: u16, body: String },
    #[error("GraphQL 查询失败: {0}")]
    GraphQl(String),
    #[error("没有找到相似的图片")]
    NoMatch,
    #[error("schema 冲突: {0}")]
    Conflict(String),
    #[error("向量数据库不可用: {0}")]
    Unavailable(String),
    #[error("图片不是合法的 base64 数据")]
    InvalidImage(#[from] base64::DecodeError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 外部向量数据库的最小接口
///
/// 向量化、HNSW 索引以及相似度搜索全部由数据库完成，这里只负责转发请求。
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// 创建一个 class，已存在时返回错误
    async fn create_class(&self, schema: &ClassSchema) -> StoreResult<()>;

    /// 获取指定 class 的定义，不存在时返回 `None`
    async fn get_class(&self, name: &str) -> StoreResult<Option<ClassSchema>>;

    /// 删除 class 以及其中的全部对象
    async fn delete_class(&self, name: &str) -> StoreResult<()>;

    /// 返回完整的 schema
    async fn schema(&self) -> StoreResult<Value>;

    /// 插入一条图片记录
    async fn insert(&self, class: &str, record: &ImageRecord) -> StoreResult<()>;

    /// 以图搜图，按相似度从高到低返回最多 `limit` 张已存储图片（base64）
    async fn near_image(&self, class: &str, image: &str, limit: usize) -> StoreResult<Vec<String>>;
}
