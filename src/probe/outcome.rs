//! 探测结果数据结构
//!
//! 定义单次探测的结果类型和状态枚举

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 探测状态枚举
///
/// 三种状态互斥，每次探测恰好得到其中之一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// 在截止时间前收到了远端的任意响应
    Online,
    /// 在截止时间前发生了网络层失败（拒绝连接、DNS、重置、TLS等）
    Offline,
    /// 截止时间内既没有响应也没有失败
    Timeout,
}

impl ProbeStatus {
    /// 日志文件中使用的文本形式
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Online => "online",
            ProbeStatus::Offline => "offline",
            ProbeStatus::Timeout => "timeout",
        }
    }

    /// 判断是否在线
    pub fn is_online(&self) -> bool {
        matches!(self, ProbeStatus::Online)
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次探测结果
///
/// 每次探测新建一个，创建后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// 目标主机
    pub target: String,
    /// 探测状态
    pub status: ProbeStatus,
    /// 从发起探测到得出结论的耗时
    #[serde(rename = "response_time_ms", with = "duration_serde")]
    pub response_time: Duration,
}

impl ProbeOutcome {
    /// 创建新的探测结果
    pub fn new(target: impl Into<String>, status: ProbeStatus, response_time: Duration) -> Self {
        Self {
            target: target.into(),
            status,
            response_time,
        }
    }

    /// 获取响应时间（毫秒）
    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }

    /// 渲染为CSV行（不含换行符）
    pub fn to_csv_row(&self, timestamp: &str) -> String {
        format!(
            "{},{},{},{}",
            timestamp,
            self.target,
            self.status,
            self.response_time_ms()
        )
    }
}

/// Duration序列化模块
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
