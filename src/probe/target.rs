//! 探测目标定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 一个需要探测的网络端点
///
/// 进程启动时确定，运行期间不再变化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// 主机名或IP（可带端口）
    pub host: String,
    /// 请求路径
    #[serde(default = "default_path")]
    pub path: String,
    /// 协议，默认 https
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

impl Target {
    /// 创建使用 https 协议的探测目标
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            scheme: default_scheme(),
        }
    }

    /// 设置协议
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// 构建请求URL
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)
    }
}
