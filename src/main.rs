use std::path::PathBuf;

use anyhow::{Context, Result};
use speaker_outreach::utils::logging;
use speaker_outreach::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置（可选的 TOML 文件 + 环境变量）
    let config_path = std::env::var("OUTREACH_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(&config.log_level);

    // 初始化并运行应用
    let _stats = App::initialize(config).await?.run().await?;

    Ok(())
}
