use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ClassSchema, IMAGE_FIELD, ImageRecord, StoreError, StoreResult, VectorStore};

/// Weaviate REST/GraphQL 客户端
///
/// 无鉴权、无重试，默认也不设置超时。
#[derive(Debug, Clone)]
pub struct WeaviateStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl WeaviateStore {
    /// 创建客户端
    ///
    /// # Arguments
    ///
    /// * `base_url` - 数据库地址，例如 `http://localhost:8080`
    /// * `timeout` - 单次请求超时，`None` 表示一直等待
    pub fn new(base_url: &str, timeout: Option<Duration>) -> StoreResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()?, base_url: base_url.trim_end_matches('/').to_string() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }
}

#[async_trait]
impl VectorStore for WeaviateStore {
    async fn create_class(&self, schema: &ClassSchema) -> StoreResult<()> {
        debug!("创建 class: {}", schema.class);
        let resp = self.client.post(self.url("/schema")).json(schema).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn get_class(&self, name: &str) -> StoreResult<Option<ClassSchema>> {
        let resp = self.client.get(self.url(&format!("/schema/{name}"))).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp).await?;
        Ok(Some(resp.json().await?))
    }

    async fn delete_class(&self, name: &str) -> StoreResult<()> {
        debug!("删除 class: {name}");
        let resp = self.client.delete(self.url(&format!("/schema/{name}"))).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn schema(&self) -> StoreResult<Value> {
        let resp = self.client.get(self.url("/schema")).send().await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn insert(&self, class: &str, record: &ImageRecord) -> StoreResult<()> {
        let body = json!({ "class": class, "properties": record });
        let resp = self.client.post(self.url("/objects")).json(&body).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn near_image(&self, class: &str, image: &str, limit: usize) -> StoreResult<Vec<String>> {
        // serde_json 生成的带引号字符串同时也是合法的 GraphQL 字符串字面量
        let query = format!(
            "{{ Get {{ {class}(nearImage: {{ image: {} }}, limit: {limit}) {{ {IMAGE_FIELD} }} }} }}",
            serde_json::to_string(image).map_err(|e| StoreError::GraphQl(e.to_string()))?,
        );
        let resp = self.client.post(self.url("/graphql")).json(&json!({ "query": query })).send().await?;
        let resp: GraphQlResponse = check_status(resp).await?.json().await?;

        if !resp.errors.is_empty() {
            let messages = resp.errors.into_iter().map(|e| e.message).collect::<Vec<_>>();
            return Err(StoreError::GraphQl(messages.join("; ")));
        }

        let objects = resp
            .data
            .as_ref()
            .and_then(|data| data.get("Get"))
            .and_then(|get| get.get(class))
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::GraphQl(format!("响应中缺少 Get.{class}")))?;

        Ok(objects
            .iter()
            .filter_map(|obj| obj.get(IMAGE_FIELD).and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }
}

async fn check_status(resp: Response) -> StoreResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status { status: status.as_u16(), body })
}
