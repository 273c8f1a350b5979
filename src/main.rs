//! Internet Vitals 主程序入口
//!
//! 互联网连通性监控工具

use anyhow::{Context, Result};
use clap::Parser;
use internet_vitals::cli::args::{Args, Commands};
use internet_vitals::cli::commands::{
    CheckCommand, Command, InitCommand, StartCommand, ValidateCommand, VersionCommand,
};
use internet_vitals::config::TomlConfigLoader;
use internet_vitals::logging::{LogConfig, LoggingSystem};
use log::LevelFilter;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = resolve_log_config(&args).await;

    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    debug!("Internet Vitals v{} 启动", internet_vitals::VERSION);

    // 执行命令
    match execute_command(&args).await {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            error!("命令执行失败: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// 确定诊断日志配置
///
/// 格式与日志文件来自配置文件；级别优先级为
/// `--log-level` > `--verbose` > 配置文件 > info
async fn resolve_log_config(args: &Args) -> LogConfig {
    // 此时日志系统尚未初始化，加载失败交给具体命令报告
    let global = TomlConfigLoader::new(true)
        .load_or_default(args.get_config_path())
        .await
        .map(|config| config.global)
        .unwrap_or_default();

    let mut log_config = LogConfig::from_global(&global);
    if let Some(level) = args.log_level {
        log_config.level = level.into();
    } else if args.verbose {
        log_config.level = LevelFilter::Debug;
    }
    log_config
}

/// 执行CLI命令，返回进程退出码
async fn execute_command(args: &Args) -> Result<i32> {
    let result = match &args.command {
        Commands::Start { .. } => StartCommand.execute(args).await,
        Commands::Check { .. } => {
            // 整体离线时以非零退出码结束，便于脚本使用
            let report = CheckCommand.check(args).await?;
            return Ok(if report.overall_online { 0 } else { 1 });
        }
        Commands::Init { .. } => InitCommand.execute(args).await,
        Commands::Validate { .. } => ValidateCommand.execute(args).await,
        Commands::Version { .. } => VersionCommand.execute(args).await,
    };

    result.map(|()| 0).map_err(anyhow::Error::from)
}
