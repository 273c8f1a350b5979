//! 监控周期模块
//!
//! 提供周期报告、单轮探测聚合以及周期调度功能

pub mod cycle;
pub mod report;
pub mod scheduler;

// 重新导出主要类型
pub use cycle::MonitorCycle;
pub use report::CycleReport;
pub use scheduler::{CycleScheduler, Scheduler, SchedulerStatus};
