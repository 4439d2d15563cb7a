use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::*;
use crate::ingest::DEFAULT_CONCURRENCY;
use crate::schema::RecreatePolicy;
use crate::store::{ClassSchema, MemoryStore, StoreResult, VectorStore, WeaviateStore};

#[derive(Parser, Debug, Clone)]
pub struct StoreOptions {
    /// 向量数据库类型
    #[arg(long = "store", value_name = "KIND", value_enum, default_value_t = StoreKind::Weaviate)]
    pub kind: StoreKind,
    /// 向量数据库地址
    #[arg(long, value_name = "URL", default_value = "http://localhost:8080")]
    pub store_url: String,
    /// 向量数据库请求超时（秒），不填则一直等待
    #[arg(long, value_name = "SECS")]
    pub store_timeout: Option<u64>,
    /// 存放图片的 class 名称
    #[arg(long, value_name = "NAME", default_value = "Employee")]
    pub class: String,
}

impl StoreOptions {
    /// 建立数据库连接
    pub fn connect(&self) -> StoreResult<Arc<dyn VectorStore>> {
        Ok(match self.kind {
            StoreKind::Weaviate => {
                let timeout = self.store_timeout.map(Duration::from_secs);
                Arc::new(WeaviateStore::new(&self.store_url, timeout)?)
            }
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        })
    }

    /// 本服务需要的 class 定义
    pub fn schema(&self) -> ClassSchema {
        ClassSchema::employee(&self.class)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct IngestOptions {
    /// 启动时导入的图片目录
    #[arg(long, value_name = "DIR", default_value = "img")]
    pub image_dir: PathBuf,
    /// 同时进行的插入请求数量
    #[arg(short = 'j', long, value_name = "N", default_value_t = DEFAULT_CONCURRENCY, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub concurrency: usize,
    /// 部分图片导入失败时继续运行，而不是退出
    #[arg(long)]
    pub allow_partial: bool,
    /// 创建 class 失败时，即使已有 class 的结构不一致也删除重建
    /// 注意：这会删除该 class 下的所有数据
    #[arg(long, verbatim_doc_comment)]
    pub force_recreate: bool,
}

impl IngestOptions {
    pub fn recreate_policy(&self) -> RecreatePolicy {
        if self.force_recreate { RecreatePolicy::Always } else { RecreatePolicy::IfCompatible }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imvec", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    #[command(flatten)]
    pub store: StoreOptions,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 初始化 schema、导入图片并启动 HTTP 服务
    Serve(ServeCommand),
    /// 初始化 schema 并导入图片
    Ingest(IngestCommand),
    /// 以图搜图，并将结果保存到文件
    Query(QueryCommand),
    /// 打印数据库当前的 schema
    Schema(SchemaCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// 外部 Weaviate 服务
    Weaviate,
    /// 进程内存储，仅用于演示和测试
    Memory,
}
