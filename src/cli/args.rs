//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Internet Vitals - 互联网连通性监控工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "internet-vitals",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "INTERNET_VITALS_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别（不指定时使用配置文件中的级别）
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "INTERNET_VITALS_LOG_LEVEL",
        global = true
    )]
    pub log_level: Option<LogLevel>,

    /// 是否启用详细输出
    #[arg(short, long, help = "启用详细输出", global = true)]
    pub verbose: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 跟踪级别
    Trace,
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 启动连通性监控
    Start {
        /// 检测间隔（毫秒）
        #[arg(
            short,
            long,
            value_name = "MS",
            help = "检测间隔（毫秒）",
            env = "INTERNET_VITALS_INTERVAL"
        )]
        interval: Option<u64>,

        /// 单次探测超时时间（毫秒）
        #[arg(
            short,
            long,
            value_name = "MS",
            help = "单次探测超时时间（毫秒）",
            env = "INTERNET_VITALS_TIMEOUT"
        )]
        timeout: Option<u64>,

        /// 探测日志（CSV）路径
        #[arg(
            long,
            value_name = "FILE",
            help = "探测日志（CSV）路径",
            env = "INTERNET_VITALS_LOG_FILE"
        )]
        log_file: Option<PathBuf>,
    },

    /// 执行一次探测并输出结果，不写入探测日志
    Check {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,

        /// 单次探测超时时间（毫秒）
        #[arg(short, long, value_name = "MS", help = "单次探测超时时间（毫秒）")]
        timeout: Option<u64>,
    },

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "config.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }

    /// 是否启用详细输出
    pub fn is_verbose(&self) -> bool {
        self.verbose || matches!(self.log_level, Some(LogLevel::Debug | LogLevel::Trace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_overrides() {
        let args = Args::try_parse_from([
            "internet-vitals",
            "start",
            "--interval",
            "10000",
            "--timeout",
            "2000",
            "--log-file",
            "/tmp/net.csv",
        ])
        .unwrap();

        match args.command {
            Commands::Start {
                interval,
                timeout,
                log_file,
            } => {
                assert_eq!(interval, Some(10_000));
                assert_eq!(timeout, Some(2_000));
                assert_eq!(log_file, Some(PathBuf::from("/tmp/net.csv")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "internet-vitals",
            "check",
            "--format",
            "json",
            "--config",
            "custom.toml",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.get_config_path(), PathBuf::from("custom.toml"));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert!(args.is_verbose());
        assert!(matches!(
            args.command,
            Commands::Check {
                format: OutputFormat::Json,
                timeout: None
            }
        ));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(log::LevelFilter::from(LogLevel::Warn), log::LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }
}
