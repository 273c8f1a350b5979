//! 配置管理模块
//!
//! 提供配置文件解析和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_config_path, ConfigLoader, TomlConfigLoader};
pub use types::{validate_config, Config, GlobalConfig};

/// `init` 命令写出的默认配置模板
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../../templates/config.toml");
