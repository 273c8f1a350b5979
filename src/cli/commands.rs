//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{Config, ConfigLoader, TomlConfigLoader, DEFAULT_CONFIG_TEMPLATE};
use crate::error::Result;
use crate::monitor::{CycleReport, CycleScheduler, MonitorCycle, Scheduler};
use crate::probe::HttpProber;
use crate::sink::{ConsoleSink, CsvLogSink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 加载配置文件，不存在时使用内置默认配置
async fn load_config(args: &Args) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);
    loader.load_or_default(args.get_config_path()).await
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 创建配置文件
    ///
    /// 文件已存在且未指定 `force` 时不做任何修改。
    pub async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(config_path, DEFAULT_CONFIG_TEMPLATE).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件以调整探测目标");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { config_path } = &args.command {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, args.is_verbose())
                .await
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    pub async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<Config> {
        println!("验证配置文件: {}", config_path.display());

        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_file(config_path).await?;

        if verbose {
            println!("配置验证通过！");
            println!("全局配置:");
            println!("  检测间隔: {}ms", config.global.check_interval_ms);
            println!("  探测超时: {}ms", config.global.probe_timeout_ms);
            println!("  日志级别: {}", config.global.log_level);
            println!("  探测日志: {}", config.global.log_file.display());
            if config.global.max_log_size_mb > 0 {
                println!(
                    "  日志轮转: {}MB，保留 {} 个归档",
                    config.global.max_log_size_mb, config.global.max_log_files
                );
            } else {
                println!("  日志轮转: 关闭");
            }

            println!("探测目标:");
            for (i, target) in config.targets.iter().enumerate() {
                println!("  {}. {} ({})", i + 1, target, target.url());
            }
        } else {
            println!("✓ 配置文件验证通过");
            println!("✓ 找到 {} 个探测目标", config.targets.len());
        }

        Ok(config)
    }
}

/// 检测命令
///
/// 执行一轮探测并打印结果，不写入探测日志。
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        self.check(args).await.map(|_| ())
    }
}

impl CheckCommand {
    /// 执行一轮探测并输出结果
    ///
    /// # 返回
    /// * `Result<CycleReport>` - 本轮报告，调用方据此决定退出码
    pub async fn check(&self, args: &Args) -> Result<CycleReport> {
        let (format, timeout) = match &args.command {
            Commands::Check { format, timeout } => (*format, *timeout),
            _ => (OutputFormat::Text, None),
        };

        let mut config = load_config(args).await?;
        if let Some(timeout_ms) = timeout {
            config.global.probe_timeout_ms = timeout_ms;
        }
        TomlConfigLoader::new(false).validate(&config)?;

        let probe_timeout = config.global.probe_timeout();
        let cycle = MonitorCycle::new(Arc::new(HttpProber::new()?), config.targets, probe_timeout);
        let report = cycle.probe_all().await;

        match format {
            OutputFormat::Json => println!("{}", report.to_json()?),
            OutputFormat::Text => self.print_text_results(&report),
        }

        Ok(report)
    }

    /// 打印文本格式结果
    fn print_text_results(&self, report: &CycleReport) {
        println!("{:<24} {:<10} {:<10}", "目标", "状态", "响应时间");
        println!("{}", "-".repeat(46));
        for outcome in &report.outcomes {
            let status_icon = if outcome.status.is_online() { "✓" } else { "✗" };
            println!(
                "{} {:<22} {:<10} {}ms",
                status_icon,
                outcome.target,
                outcome.status,
                outcome.response_time_ms()
            );
        }
        print!("{}", <ConsoleSink>::render(report));
    }
}

/// 启动命令
///
/// 在前台持续监控，直到收到 Ctrl+C。
pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let Commands::Start {
            interval,
            timeout,
            log_file,
        } = &args.command
        else {
            return Ok(());
        };

        let mut config = load_config(args).await?;
        Self::apply_overrides(&mut config, *interval, *timeout, log_file.clone());
        TomlConfigLoader::new(false).validate(&config)?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        // 设置Ctrl+C信号处理
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("收到中断信号，正在停止监控...");
                    let _ = shutdown_tx.send(());
                }
                Err(err) => {
                    error!("监听中断信号失败: {}", err);
                }
            }
        });

        self.run(&config, shutdown_rx).await
    }
}

impl StartCommand {
    /// 把命令行参数覆盖到配置上
    pub fn apply_overrides(
        config: &mut Config,
        interval: Option<u64>,
        timeout: Option<u64>,
        log_file: Option<PathBuf>,
    ) {
        if let Some(interval_ms) = interval {
            config.global.check_interval_ms = interval_ms;
        }
        if let Some(timeout_ms) = timeout {
            config.global.probe_timeout_ms = timeout_ms;
        }
        if let Some(path) = log_file {
            config.global.log_file = path;
        }
    }

    /// 构建监控周期：CSV日志与控制台两个输出端
    pub async fn build_cycle(config: &Config) -> Result<MonitorCycle> {
        let csv_sink =
            CsvLogSink::open(config.global.log_file.clone(), config.global.log_rotation()).await?;

        Ok(MonitorCycle::new(
            Arc::new(HttpProber::new()?),
            config.targets.clone(),
            config.global.probe_timeout(),
        )
        .with_sink(Arc::new(csv_sink))
        .with_sink(Arc::new(ConsoleSink::stdout())))
    }

    /// 运行监控直到收到关闭信号
    pub async fn run(
        &self,
        config: &Config,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let cycle = Arc::new(Self::build_cycle(config).await?);
        let scheduler = CycleScheduler::new(cycle, config.global.check_interval());

        println!(
            "Monitoring started. Logging to {}",
            config.global.log_file.display()
        );
        println!(
            "Checking every {} seconds...",
            scheduler.interval().as_secs_f64()
        );

        scheduler.start().await?;

        match shutdown_rx.recv().await {
            Ok(()) => info!("收到关闭信号，正在停止监控..."),
            Err(err) => error!("等待关闭信号失败: {}", err),
        }

        scheduler.stop().await?;

        let status = scheduler.get_status().await;
        info!("监控已停止，共完成 {} 轮检测", status.cycles_completed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CSV_HEADER;
    use clap::Parser;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        InitCommand.create_config_file(&path, false).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, DEFAULT_CONFIG_TEMPLATE);
    }

    #[tokio::test]
    async fn test_init_does_not_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        InitCommand.create_config_file(&path, false).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        InitCommand.create_config_file(&path, true).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            DEFAULT_CONFIG_TEMPLATE
        );
    }

    #[tokio::test]
    async fn test_validate_reports_target_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE).unwrap();

        let config = ValidateCommand
            .validate_config_file(&path, true)
            .await
            .unwrap();
        assert_eq!(config.targets.len(), 3);
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = ValidateCommand
            .validate_config_file(&dir.path().join("absent.toml"), false)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        StartCommand::apply_overrides(
            &mut config,
            Some(1_000),
            None,
            Some(PathBuf::from("/tmp/other.csv")),
        );

        assert_eq!(config.global.check_interval_ms, 1_000);
        assert_eq!(config.global.probe_timeout_ms, 5_000);
        assert_eq!(config.global.log_file, PathBuf::from("/tmp/other.csv"));
    }

    #[tokio::test]
    async fn test_build_cycle_creates_log_with_header() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.global.log_file = dir.path().join("logs").join("internet-log.csv");

        let cycle = StartCommand::build_cycle(&config).await.unwrap();

        assert_eq!(cycle.targets().len(), 3);
        assert_eq!(
            std::fs::read_to_string(&config.global.log_file).unwrap(),
            CSV_HEADER
        );
    }

    #[tokio::test]
    async fn test_start_stops_on_shutdown_signal() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.targets.clear();
        config.global.log_file = dir.path().join("internet-log.csv");

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        shutdown_tx.send(()).unwrap();

        StartCommand.run(&config, shutdown_rx).await.unwrap();

        // 空目标列表的一轮不产生任何数据行
        assert_eq!(
            std::fs::read_to_string(&config.global.log_file).unwrap(),
            CSV_HEADER
        );
    }

    #[tokio::test]
    async fn test_check_rejects_zero_timeout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[global]\nprobe_timeout_ms = 1000\n").unwrap();

        let args = Args::try_parse_from([
            "internet-vitals",
            "--config",
            path.to_str().unwrap(),
            "check",
            "--timeout",
            "0",
        ])
        .unwrap();

        let err = CheckCommand.check(&args).await.unwrap_err();
        assert!(err.to_string().contains("探测超时时间不能为0"));
    }

    #[tokio::test]
    async fn test_init_output_loads_with_env_substitution() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        InitCommand.create_config_file(&path, false).await.unwrap();

        let config = TomlConfigLoader::new(true)
            .load_from_file(&path)
            .await
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_check_with_no_targets_is_down() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[global]\nprobe_timeout_ms = 1000\n").unwrap();

        let args = Args::try_parse_from([
            "internet-vitals",
            "--config",
            path.to_str().unwrap(),
            "check",
        ])
        .unwrap();

        let report = CheckCommand.check(&args).await.unwrap();
        assert!(report.is_down());
        assert!(report.outcomes.is_empty());
    }
}
