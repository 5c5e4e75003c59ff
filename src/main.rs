use std::path::Path;

use anyhow::Result;
use ticket_extractor::config::Config;
use ticket_extractor::orchestrator::App;
use ticket_extractor::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init_log_file(&config.output_log_file)?;
    logging::init(config.verbose_logging, Some(Path::new(&config.output_log_file)))?;

    // 初始化并运行应用
    let _summary = App::initialize(config).await?.run().await?;

    Ok(())
}
