//! 可达性探测模块
//!
//! 提供探测目标、探测结果以及基于HTTP的探测器实现

pub mod outcome;
pub mod prober;
pub mod target;

// 重新导出主要类型
pub use outcome::{ProbeOutcome, ProbeStatus};
pub use prober::{HttpProber, Prober};
pub use target::Target;
