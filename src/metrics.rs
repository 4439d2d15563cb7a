use std::future::Future;
use std::sync::LazyLock;
use std::time::Instant;

use prometheus::*;

static METRIC_STORE_REQUEST_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "imvec_store_request_count",
        "count of the requests sent to the vector store",
        &["op", "status"]
    )
    .unwrap()
});

static METRIC_STORE_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "imvec_store_duration",
        "duration of the vector store requests in seconds",
        &["op"]
    )
    .unwrap()
});

static METRIC_INGEST_FILE_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "imvec_ingest_file_count",
        "count of the files processed by bulk ingestion",
        &["status"]
    )
    .unwrap()
});

/// 向量数据库操作类型
#[derive(Debug, Clone, Copy)]
pub enum StoreOp {
    Insert,
    NearImage,
}

impl StoreOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::NearImage => "near_image",
        }
    }
}

/// 记录一次数据库请求的耗时和结果
pub async fn observe<T, E>(
    op: StoreOp,
    fut: impl Future<Output = std::result::Result<T, E>>,
) -> std::result::Result<T, E> {
    let start = Instant::now();
    let result = fut.await;
    let status = if result.is_ok() { "ok" } else { "error" };

    METRIC_STORE_REQUEST_COUNT.with_label_values(&[op.as_str(), status]).inc();
    METRIC_STORE_DURATION
        .with_label_values(&[op.as_str()])
        .observe(start.elapsed().as_secs_f64());

    result
}

pub fn inc_ingest_file(ok: bool) {
    METRIC_INGEST_FILE_COUNT.with_label_values(&[if ok { "ok" } else { "error" }]).inc();
}
