//! 报告输出模块
//!
//! 定义周期报告的输出接口，以及追加式CSV日志和控制台两种实现

pub mod console;
pub mod csv_log;

use crate::error::Result;
use crate::monitor::CycleReport;
use async_trait::async_trait;

// 重新导出主要类型
pub use console::ConsoleSink;
pub use csv_log::{CsvLogSink, LogRotation, CSV_HEADER};

/// 报告输出trait
///
/// 每轮监控结束后，每个输出端恰好收到一次完整报告。
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// 输出端名称，用于日志
    fn name(&self) -> &str;

    /// 输出一份周期报告
    ///
    /// # 参数
    /// * `report` - 周期报告
    ///
    /// # 返回
    /// * `Result<()>` - 输出结果
    async fn emit(&self, report: &CycleReport) -> Result<()>;
}
