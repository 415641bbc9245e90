use anyhow::Result;
use clap::Parser;
use plate_console::cli::{self, Cli};
use plate_console::config::Config;
use plate_console::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    config.verbose_logging |= args.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    if let Err(e) = cli::run(args, config).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
