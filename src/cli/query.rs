use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::gateway::ImageGateway;
use crate::utils::{decode_image, encode_image};

#[derive(Parser, Debug, Clone)]
pub struct QueryCommand {
    /// 被搜索的图片路径
    pub image: PathBuf,
    /// 最相似图片的保存路径
    #[arg(short, long, default_value = "result.jpg")]
    pub output: PathBuf,
}

impl SubCommandExtend for QueryCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let data = tokio::fs::read(&self.image)
            .await
            .with_context(|| format!("读取图片失败: {}", self.image.display()))?;

        let gateway = ImageGateway::new(opts.store.connect()?, &opts.store.class);
        let result = gateway.find_nearest(&encode_image(data)).await?;

        tokio::fs::write(&self.output, decode_image(&result)?).await?;
        info!("结果已保存到 {}", self.output.display());
        Ok(())
    }
}
