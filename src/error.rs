//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。
//! 探测失败不属于错误，它们总是被归类为 [`crate::probe::ProbeStatus`]。

use std::path::PathBuf;
use thiserror::Error;

/// Internet Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum InternetVitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测器构建错误
    #[error("探测器错误: {0}")]
    Probe(#[from] ProbeError),

    /// 输出端（日志文件/控制台）错误
    #[error("输出错误: {0}")]
    Sink(#[from] SinkError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 探测器错误类型
///
/// 只会在构建探测器时出现，单次探测永远不会返回错误。
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP客户端构建失败
    #[error("HTTP客户端构建失败: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// 输出端错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// 写入失败
    #[error("写入 {path} 失败: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 日志轮转失败
    #[error("轮转 {path} 失败: {source}")]
    Rotate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, InternetVitalsError>;
