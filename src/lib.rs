//! Internet Vitals - 互联网连通性监控工具
//!
//! 按固定间隔并发探测一组网络端点，判断互联网是否可达，
//! 并把每次探测的结果追加写入CSV日志：
//! - 有截止时间的HTTP(S)可达性探测
//! - 并发探测、按配置顺序聚合的监控周期
//! - 不会重叠执行的周期调度器
//! - 追加式CSV日志与控制台输出
//! - 结构化诊断日志

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod sink;

// 重新导出主要类型
pub use config::{Config, GlobalConfig};
pub use error::InternetVitalsError;
pub use monitor::{CycleReport, CycleScheduler, MonitorCycle, Scheduler};
pub use probe::{HttpProber, ProbeOutcome, ProbeStatus, Prober, Target};
pub use sink::{ConsoleSink, CsvLogSink, ReportSink};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
