//! 周期报告数据结构

use crate::probe::ProbeOutcome;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 一轮监控的聚合结果
///
/// 每个目标恰好对应一条结果，顺序与目标配置顺序一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// 本轮统一使用的时间戳
    pub timestamp: DateTime<Utc>,
    /// 各目标的探测结果
    pub outcomes: Vec<ProbeOutcome>,
    /// 是否至少有一个目标在线
    pub overall_online: bool,
}

impl CycleReport {
    /// 创建周期报告，并推导整体在线状态
    pub fn new(timestamp: DateTime<Utc>, outcomes: Vec<ProbeOutcome>) -> Self {
        let overall_online = outcomes.iter().any(|outcome| outcome.status.is_online());
        Self {
            timestamp,
            outcomes,
            overall_online,
        }
    }

    /// ISO-8601 时间戳，毫秒精度，UTC以 `Z` 结尾
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// 整体是否离线
    pub fn is_down(&self) -> bool {
        !self.overall_online
    }

    /// 在线目标数量
    pub fn online_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status.is_online())
            .count()
    }

    /// 渲染为CSV行，每个结果一行，均以换行符结尾
    pub fn to_csv_rows(&self) -> String {
        let timestamp = self.iso_timestamp();
        self.outcomes
            .iter()
            .map(|outcome| format!("{}\n", outcome.to_csv_row(&timestamp)))
            .collect()
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
