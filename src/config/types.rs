//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use crate::probe::Target;
use crate::sink::LogRotation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 主配置结构，包含全局配置和目标列表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 探测目标列表，顺序即日志中的记录顺序
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 检测间隔（毫秒）
    #[serde(default = "default_check_interval")]
    pub check_interval_ms: u64,
    /// 单次探测超时时间（毫秒）
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 诊断日志格式: text / json
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// 诊断日志文件（可选），与探测日志相互独立
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic_log_file: Option<PathBuf>,
    /// 探测日志（CSV）路径
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// 探测日志轮转大小（MB），0 表示不轮转
    #[serde(default)]
    pub max_log_size_mb: u64,
    /// 轮转后保留的归档数量
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

// 默认值函数
fn default_check_interval() -> u64 {
    30_000
}
fn default_probe_timeout() -> u64 {
    5_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("internet-log.csv")
}
fn default_max_log_files() -> usize {
    5
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval(),
            probe_timeout_ms: default_probe_timeout(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            diagnostic_log_file: None,
            log_file: default_log_file(),
            max_log_size_mb: 0,
            max_log_files: default_max_log_files(),
        }
    }
}

impl GlobalConfig {
    /// 检测间隔
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// 单次探测超时时间
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// 探测日志轮转策略
    pub fn log_rotation(&self) -> LogRotation {
        LogRotation::from_size_mb(self.max_log_size_mb, self.max_log_files)
    }
}

impl Default for Config {
    /// 内置的默认目标
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            targets: vec![
                Target::new("google.com", "/"),
                Target::new("cloudflare.com", "/"),
                Target::new("1.1.1.1", "/"),
            ],
        }
    }
}

/// 配置验证函数
///
/// 空目标列表不是错误，此时每一轮都被视为离线。
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    // 验证全局配置
    if config.global.check_interval_ms == 0 {
        return Err("检测间隔不能为0".to_string());
    }

    if config.global.probe_timeout_ms == 0 {
        return Err("探测超时时间不能为0".to_string());
    }

    // 验证日志级别
    let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    let valid_log_formats = ["text", "json"];
    if !valid_log_formats.contains(&config.global.log_format.as_str()) {
        return Err(format!(
            "无效的日志格式: {}，支持的格式: {:?}",
            config.global.log_format, valid_log_formats
        ));
    }

    if config.global.log_file.as_os_str().is_empty() {
        return Err("探测日志路径不能为空".to_string());
    }

    if config.global.max_log_size_mb > 0 && config.global.max_log_files == 0 {
        return Err("启用日志轮转时归档数量不能为0".to_string());
    }

    // 验证目标配置
    for target in &config.targets {
        if target.host.trim().is_empty() {
            return Err("目标主机不能为空".to_string());
        }

        if target.host.contains('/') || target.host.contains(',') {
            return Err(format!("目标主机 {} 格式无效", target.host));
        }

        if !target.path.starts_with('/') {
            return Err(format!(
                "目标 {} 的路径 {} 必须以 / 开头",
                target.host, target.path
            ));
        }

        let valid_schemes = ["http", "https"];
        if !valid_schemes.contains(&target.scheme.as_str()) {
            return Err(format!(
                "目标 {} 的协议 {} 无效，支持的协议: {:?}",
                target.host, target.scheme, valid_schemes
            ));
        }
    }

    Ok(())
}
