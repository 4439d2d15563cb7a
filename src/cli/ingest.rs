use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use log::warn;

use crate::cli::SubCommandExtend;
use crate::config::{IngestOptions, Opts, StoreOptions};
use crate::ingest::{IngestReport, Ingestor};
use crate::schema::ensure_schema;
use crate::store::VectorStore;
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct IngestCommand {
    #[command(flatten)]
    pub ingest: IngestOptions,
}

impl SubCommandExtend for IngestCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let store = opts.store.connect()?;
        bootstrap(&*store, &opts.store, &self.ingest).await?;
        let report = ingest(store, &opts.store, &self.ingest).await?;

        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(()) => println!("[OK] {}: {}", outcome.label, outcome.path.display()),
                Err(e) => println!("[ERR] {}: {}", outcome.path.display(), e),
            }
        }
        println!("{}/{}", report.succeeded(), report.total());
        Ok(())
    }
}

/// 初始化 schema，失败时返回错误，调用方不应继续导入
pub(crate) async fn bootstrap(
    store: &dyn VectorStore,
    store_opts: &StoreOptions,
    ingest: &IngestOptions,
) -> Result<()> {
    ensure_schema(store, &store_opts.schema(), ingest.recreate_policy())
        .await
        .into_result()
        .with_context(|| format!("初始化 class {} 失败", store_opts.class))
}

/// 导入图片目录，除非允许部分失败，否则任意一张失败都返回错误
pub(crate) async fn ingest(
    store: Arc<dyn VectorStore>,
    store_opts: &StoreOptions,
    ingest: &IngestOptions,
) -> Result<IngestReport> {
    let pb = ProgressBar::no_length().with_style(pb_style());
    let report = Ingestor::new(store, &store_opts.class)
        .concurrency(ingest.concurrency)
        .progress(pb)
        .ingest_directory(&ingest.image_dir)
        .await?;

    if let Err(e) = report.ensure_complete() {
        if !ingest.allow_partial {
            return Err(e.into());
        }
        warn!("{e}，继续运行");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use assert_fs::TempDir;

    use super::*;
    use crate::config::StoreKind;
    use crate::store::{ClassSchema, MemoryStore};

    fn options(dir: &TempDir, allow_partial: bool) -> (StoreOptions, IngestOptions) {
        let store_opts = StoreOptions {
            kind: StoreKind::Memory,
            store_url: String::new(),
            store_timeout: None,
            class: "Employee".to_string(),
        };
        let ingest_opts = IngestOptions {
            image_dir: dir.path().to_path_buf(),
            concurrency: 2,
            allow_partial,
            force_recreate: false,
        };
        (store_opts, ingest_opts)
    }

    fn failing_store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::new()
                .with_class(ClassSchema::employee("Employee"))
                .fail_insert_label("jane doe"),
        )
    }

    fn image_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("jane_doe.png"), b"jane").unwrap();
        fs::write(dir.path().join("alice.jpg"), b"alice").unwrap();
        dir
    }

    #[tokio::test]
    async fn partial_failure_aborts_by_default() {
        let dir = image_dir();
        let (store_opts, ingest_opts) = options(&dir, false);
        let store = failing_store();

        let result = ingest(store.clone(), &store_opts, &ingest_opts).await;

        assert!(result.is_err());
        assert_eq!(store.insert_calls(), 2);
    }

    #[tokio::test]
    async fn partial_failure_allowed() {
        let dir = image_dir();
        let (store_opts, ingest_opts) = options(&dir, true);
        let store = failing_store();

        let report = ingest(store.clone(), &store_opts, &ingest_opts).await.unwrap();

        assert_eq!(report.succeeded(), 1);
        let failed = report.failures().map(|o| o.label.as_str()).collect::<Vec<_>>();
        assert_eq!(failed, vec!["jane doe"]);
        assert_eq!(store.records("Employee").await.len(), 1);
    }
}
