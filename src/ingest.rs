use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use indicatif::ProgressBar;
use log::{info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::metrics::{self, StoreOp};
use crate::store::{ImageRecord, StoreError, VectorStore};
use crate::utils::encode_image;

/// 默认同时进行的插入请求数量
pub const DEFAULT_CONCURRENCY: usize = 32;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("无法读取图片目录 {}: {reason}", .path.display())]
    ReadDir { path: PathBuf, reason: String },
    #[error("{failed}/{total} 张图片导入失败")]
    Incomplete { failed: usize, total: usize },
}

/// 单个文件导入失败的原因
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败: {0}")]
    Read(#[from] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 单个文件的导入结果
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub label: String,
    pub result: Result<(), FileError>,
}

/// 一次批量导入的结果，每个文件一条
#[derive(Debug, Default)]
pub struct IngestReport {
    pub outcomes: Vec<FileOutcome>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// 任意一个文件失败即视为整体失败，成功时返回导入数量
    pub fn ensure_complete(&self) -> Result<usize, IngestError> {
        let failed = self.failures().count();
        if failed > 0 {
            return Err(IngestError::Incomplete { failed, total: self.total() });
        }
        Ok(self.total())
    }
}

/// 由文件名生成标签：去掉第一个 `.` 之后的部分，并将下划线替换为空格
///
/// `jane_doe.png` => `jane doe`
pub fn label_from_file_name(name: &str) -> String {
    let stem = name.split('.').next().unwrap_or_default();
    stem.replace('_', " ")
}

/// 列出目录下的所有文件（不递归），按文件名排序
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let read_dir_err = |reason: String| IngestError::ReadDir { path: dir.to_path_buf(), reason };
    if !dir.is_dir() {
        return Err(read_dir_err("不是目录".to_string()));
    }

    let mut files = vec![];
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| read_dir_err(e.to_string()))?;
        // 跟随符号链接，失效的链接直接跳过
        if entry.path().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// 批量导入本地图片
pub struct Ingestor {
    store: Arc<dyn VectorStore>,
    class: String,
    concurrency: usize,
    pb: ProgressBar,
}

impl Ingestor {
    pub fn new(store: Arc<dyn VectorStore>, class: impl Into<String>) -> Self {
        Self { store, class: class.into(), concurrency: DEFAULT_CONCURRENCY, pb: ProgressBar::hidden() }
    }

    /// 同时进行的插入请求上限，至少为 1
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn progress(mut self, pb: ProgressBar) -> Self {
        self.pb = pb;
        self
    }

    /// 导入目录下的所有文件，每个文件恰好发送一次插入请求
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        info!("开始导入目录: {}", dir.display());
        let files = list_images(dir)?;
        info!("扫描完成，共 {} 个文件", files.len());

        self.pb.set_length(files.len() as u64);

        let mut outcomes = futures::stream::iter(files)
            .map(|path| self.ingest_file(path))
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));

        let report = IngestReport { outcomes };
        for failure in report.failures() {
            if let Err(e) = &failure.result {
                warn!("导入失败 {}: {e}", failure.path.display());
            }
        }
        self.pb.finish_with_message("图片导入完成");
        info!("导入完成: {}/{}", report.succeeded(), report.total());

        Ok(report)
    }

    async fn ingest_file(&self, path: PathBuf) -> FileOutcome {
        let label = path
            .file_name()
            .map(|name| label_from_file_name(&name.to_string_lossy()))
            .unwrap_or_default();

        let result = async {
            let data = tokio::fs::read(&path).await?;
            let record = ImageRecord { image: encode_image(data), text: label.clone() };
            metrics::observe(StoreOp::Insert, self.store.insert(&self.class, &record)).await?;
            Ok::<_, FileError>(())
        }
        .await;

        metrics::inc_ingest_file(result.is_ok());
        self.pb.set_message(label.clone());
        self.pb.inc(1);

        FileOutcome { path, label, result }
    }
}
