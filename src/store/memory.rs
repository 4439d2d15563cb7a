use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::{ClassSchema, ImageRecord, StoreError, StoreResult, VectorStore};
use crate::utils::decode_image;

/// 进程内的向量数据库替身
///
/// 行为与 Weaviate 保持一致（重复创建 class 会失败、删除 class 会级联删除对象），
/// 并支持注入故障，用于本地演示和测试。相似度使用字节直方图的 L1 距离粗略代替。
#[derive(Debug, Default)]
pub struct MemoryStore {
    classes: Mutex<BTreeMap<String, MemoryClass>>,
    /// 剩余需要失败的 create_class 次数
    create_failures: AtomicUsize,
    failing_label: Mutex<Option<String>>,
    unavailable: AtomicBool,
    insert_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Debug)]
struct MemoryClass {
    schema: ClassSchema,
    records: Vec<ImageRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预先放入一个 class
    pub fn with_class(mut self, schema: ClassSchema) -> Self {
        self.classes
            .get_mut()
            .insert(schema.class.clone(), MemoryClass { schema, records: vec![] });
        self
    }

    /// 让接下来的 `times` 次 create_class 失败
    pub fn fail_create(self, times: usize) -> Self {
        self.create_failures.store(times, Ordering::SeqCst);
        self
    }

    /// 让标签为 `label` 的插入失败
    pub fn fail_insert_label(mut self, label: &str) -> Self {
        *self.failing_label.get_mut() = Some(label.to_string());
        self
    }

    /// 模拟数据库无法连接
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 一共收到的插入请求数量（包括失败的）
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// 同时处理中的插入请求数量峰值
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub async fn class_names(&self) -> Vec<String> {
        self.classes.lock().await.keys().cloned().collect()
    }

    pub async fn records(&self, class: &str) -> Vec<ImageRecord> {
        self.classes.lock().await.get(class).map(|c| c.records.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    async fn insert_inner(&self, class: &str, record: &ImageRecord) -> StoreResult<()> {
        let failing = self.failing_label.lock().await.clone();
        if failing.as_deref() == Some(record.text.as_str()) {
            return Err(StoreError::Status { status: 500, body: "injected failure".to_string() });
        }
        decode_image(&record.image)?;
        // 让出执行权，使并发插入真正交错执行
        tokio::task::yield_now().await;

        let mut classes = self.classes.lock().await;
        let class = classes.get_mut(class).ok_or_else(|| StoreError::Status {
            status: 422,
            body: format!("class {class} not found"),
        })?;
        class.records.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn create_class(&self, schema: &ClassSchema) -> StoreResult<()> {
        self.check_available()?;
        let remaining = self.create_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.create_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Status { status: 500, body: "injected failure".to_string() });
        }

        let mut classes = self.classes.lock().await;
        if classes.contains_key(&schema.class) {
            return Err(StoreError::Status {
                status: 422,
                body: format!("class name {:?} already exists", schema.class),
            });
        }
        classes.insert(schema.class.clone(), MemoryClass { schema: schema.clone(), records: vec![] });
        Ok(())
    }

    async fn get_class(&self, name: &str) -> StoreResult<Option<ClassSchema>> {
        self.check_available()?;
        Ok(self.classes.lock().await.get(name).map(|c| c.schema.clone()))
    }

    async fn delete_class(&self, name: &str) -> StoreResult<()> {
        self.check_available()?;
        self.classes.lock().await.remove(name);
        Ok(())
    }

    async fn schema(&self) -> StoreResult<Value> {
        self.check_available()?;
        let classes = self.classes.lock().await;
        let classes = classes.values().map(|c| &c.schema).collect::<Vec<_>>();
        Ok(json!({ "classes": classes }))
    }

    async fn insert(&self, class: &str, record: &ImageRecord) -> StoreResult<()> {
        self.check_available()?;
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let result = self.insert_inner(class, record).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn near_image(&self, class: &str, image: &str, limit: usize) -> StoreResult<Vec<String>> {
        self.check_available()?;
        let query = histogram(&decode_image(image)?);

        let classes = self.classes.lock().await;
        let class = classes
            .get(class)
            .ok_or_else(|| StoreError::GraphQl(format!("Cannot query field {class:?} on type \"GetObjectsObj\"")))?;

        let mut scored = class
            .records
            .iter()
            .filter_map(|r| decode_image(&r.image).ok().map(|bytes| (l1(&query, &histogram(&bytes)), r)))
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(scored.into_iter().take(limit).map(|(_, r)| r.image.clone()).collect())
    }
}

fn histogram(bytes: &[u8]) -> [f32; 256] {
    let mut hist = [0f32; 256];
    for &b in bytes {
        hist[b as usize] += 1.0;
    }
    let total = bytes.len().max(1) as f32;
    hist.iter_mut().for_each(|v| *v /= total);
    hist
}

fn l1(a: &[f32; 256], b: &[f32; 256]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
