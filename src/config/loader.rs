//! 配置加载器实现
//!
//! 提供TOML配置文件解析、环境变量替换和错误处理功能

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

/// 配置加载器trait，定义配置加载接口
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// 从文件加载配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config>;

    /// 从字符串加载配置
    ///
    /// # 参数
    /// * `content` - 配置文件内容
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或错误
    async fn load_from_string(&self, content: &str) -> Result<Config>;

    /// 验证配置
    ///
    /// # 参数
    /// * `config` - 要验证的配置
    ///
    /// # 返回
    /// * `Result<()>` - 验证结果
    fn validate(&self, config: &Config) -> Result<()>;
}

/// TOML配置加载器实现
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlConfigLoader {
    /// 创建新的TOML配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 文件存在时加载，不存在时使用内置默认配置
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回
    /// * `Result<Config>` - 加载的配置或默认配置
    pub async fn load_or_default<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();
        if path.exists() {
            self.load_from_file(path).await
        } else {
            log::info!("未找到配置文件 {}，使用内置默认配置", path.display());
            Ok(Config::default())
        }
    }

    /// 替换字符串中的环境变量
    ///
    /// # 参数
    /// * `content` - 要处理的字符串
    ///
    /// # 返回
    /// * `Result<String>` - 替换后的字符串或错误
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")))?;

        let mut result = String::with_capacity(content.len());

        for line in content.split_inclusive('\n') {
            // 注释行原样保留
            if line.trim_start().starts_with('#') {
                result.push_str(line);
                continue;
            }

            let mut missing: Option<String> = None;
            let replaced = env_var_regex.replace_all(line, |captures: &Captures| {
                let var_name = &captures[1];
                std::env::var(var_name).unwrap_or_else(|_| {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                })
            });

            if let Some(var) = missing {
                return Err(ConfigError::EnvVarError { var }.into());
            }
            result.push_str(&replaced);
        }

        Ok(result)
    }

    /// 解析TOML内容
    fn parse_toml(&self, content: &str) -> Result<Config> {
        // 替换环境变量
        let processed_content = self.substitute_env_vars(content)?;

        // 解析TOML
        let config: Config = toml::from_str(&processed_content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?;

        Ok(config)
    }

    /// 验证通过后的额外检查，只产生警告
    fn warn_on_suspicious(config: &Config) {
        if config.targets.is_empty() {
            log::warn!("没有配置任何探测目标，每一轮都将被判定为离线");
        }
        if config.global.probe_timeout_ms >= config.global.check_interval_ms {
            log::warn!(
                "探测超时时间 ({}ms) 不小于检测间隔 ({}ms)，周期会被推迟",
                config.global.probe_timeout_ms,
                config.global.check_interval_ms
            );
        }
    }
}

impl Default for TomlConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl ConfigLoader for TomlConfigLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        // 检查文件是否存在
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        // 读取文件内容
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::ParseError(format!("读取文件失败: {e}")))?;

        // 解析配置
        let config = self.parse_toml(&content)?;

        // 验证配置
        self.validate(&config)?;

        log::info!("成功加载配置文件: {}", path.display());
        log::debug!("配置内容: {:?}", config);

        Ok(config)
    }

    async fn load_from_string(&self, content: &str) -> Result<Config> {
        let config = self.parse_toml(content)?;
        self.validate(&config)?;

        log::debug!("成功解析配置字符串");

        Ok(config)
    }

    fn validate(&self, config: &Config) -> Result<()> {
        validate_config(config).map_err(ConfigError::ValidationError)?;
        Self::warn_on_suspicious(config);
        Ok(())
    }
}

/// 获取默认配置文件路径
///
/// 优先使用当前目录下的 `config.toml`，否则使用用户配置目录。
pub fn get_default_config_path() -> PathBuf {
    let local = PathBuf::from("config.toml");
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join(crate::APP_NAME).join("config.toml"))
        .unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::Target;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    const TEST_CONFIG_TOML: &str = r#"
[global]
check_interval_ms = 10000
probe_timeout_ms = 2000
log_level = "debug"
log_file = "logs/net.csv"

[[targets]]
host = "example.com"
path = "/generate_204"

[[targets]]
host = "127.0.0.1:8080"
scheme = "http"
"#;

    const TEST_CONFIG_WITH_ENV_VARS: &str = r#"
[global]
log_file = "${IV_TEST_LOG_DIR}/internet-log.csv"

[[targets]]
host = "${IV_TEST_HOST}"
"#;

    #[tokio::test]
    async fn test_toml_parsing() {
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(TEST_CONFIG_TOML).await.unwrap();

        assert_eq!(config.global.check_interval_ms, 10_000);
        assert_eq!(config.global.probe_timeout_ms, 2_000);
        assert_eq!(config.global.log_level, "debug");
        assert_eq!(config.global.log_file, PathBuf::from("logs/net.csv"));
        assert_eq!(
            config.targets,
            vec![
                Target::new("example.com", "/generate_204"),
                Target::new("127.0.0.1:8080", "/").with_scheme("http"),
            ]
        );
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution() {
        env::set_var("IV_TEST_LOG_DIR", "/tmp/iv");
        env::set_var("IV_TEST_HOST", "one.one.one.one");

        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(TEST_CONFIG_WITH_ENV_VARS)
            .await
            .unwrap();

        assert_eq!(
            config.global.log_file,
            PathBuf::from("/tmp/iv/internet-log.csv")
        );
        assert_eq!(config.targets[0].host, "one.one.one.one");

        env::remove_var("IV_TEST_LOG_DIR");
        env::remove_var("IV_TEST_HOST");
    }

    #[tokio::test]
    #[serial]
    async fn test_env_var_substitution_missing_var() {
        let config_with_missing_var = r#"
[[targets]]
host = "${IV_TEST_MISSING_VAR}"
"#;

        let loader = TomlConfigLoader::new(true);
        let result = loader.load_from_string(config_with_missing_var).await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("IV_TEST_MISSING_VAR"));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let loader = TomlConfigLoader::new(false);
        let result = loader
            .load_from_string("[global]\nprobe_timeout_ms = 0\n")
            .await;

        assert!(result.unwrap_err().to_string().contains("探测超时时间不能为0"));
    }

    #[tokio::test]
    async fn test_load_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let loader = TomlConfigLoader::new(false);

        let result = loader.load_from_file(dir.path().join("absent.toml")).await;

        assert!(result.unwrap_err().to_string().contains("配置文件不存在"));
    }

    #[tokio::test]
    async fn test_load_or_default_falls_back() {
        let dir = TempDir::new().unwrap();
        let loader = TomlConfigLoader::new(false);

        let config = loader
            .load_or_default(dir.path().join("absent.toml"))
            .await
            .unwrap();

        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, TEST_CONFIG_TOML).unwrap();

        let loader = TomlConfigLoader::new(false);
        let config = loader.load_or_default(&path).await.unwrap();

        assert_eq!(config.targets.len(), 2);
    }

    #[tokio::test]
    async fn test_bundled_template_is_valid() {
        let loader = TomlConfigLoader::new(true);
        let config = loader
            .load_from_string(crate::config::DEFAULT_CONFIG_TEMPLATE)
            .await
            .unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_substitute_env_vars_skips_comment_lines() {
        env::remove_var("IV_TEST_COMMENTED");
        env::set_var("IV_TEST_HOST_LINE", "example.org");

        let loader = TomlConfigLoader::new(true);
        let content = "# 使用 ${IV_TEST_COMMENTED} 引用环境变量\nhost = \"${IV_TEST_HOST_LINE}\"\n";
        let result = loader.substitute_env_vars(content).unwrap();

        assert_eq!(
            result,
            "# 使用 ${IV_TEST_COMMENTED} 引用环境变量\nhost = \"example.org\"\n"
        );
        env::remove_var("IV_TEST_HOST_LINE");
    }

    #[test]
    fn test_substitute_env_vars_disabled() {
        let loader = TomlConfigLoader::new(false);
        let content = "test ${VAR} content";
        let result = loader.substitute_env_vars(content).unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_get_default_config_path() {
        let path = get_default_config_path();
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
