//! 单轮监控实现
//!
//! 并发探测全部目标，等待所有结果落定后聚合为一份报告，再交给各输出端

use crate::monitor::report::CycleReport;
use crate::probe::{Prober, Target};
use crate::sink::ReportSink;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 单轮监控
///
/// 周期之间不保留任何状态，报告交给输出端后即被丢弃。
pub struct MonitorCycle {
    /// 探测器
    prober: Arc<dyn Prober>,
    /// 目标列表，顺序即报告中的结果顺序
    targets: Vec<Target>,
    /// 单次探测超时时间
    probe_timeout: Duration,
    /// 输出端列表
    sinks: Vec<Arc<dyn ReportSink>>,
}

impl MonitorCycle {
    /// 创建新的监控周期
    ///
    /// # 参数
    /// * `prober` - 探测器
    /// * `targets` - 目标列表
    /// * `probe_timeout` - 单次探测超时时间
    pub fn new(prober: Arc<dyn Prober>, targets: Vec<Target>, probe_timeout: Duration) -> Self {
        Self {
            prober,
            targets,
            probe_timeout,
            sinks: Vec::new(),
        }
    }

    /// 添加输出端
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// 目标列表
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// 单次探测超时时间
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// 并发探测全部目标并聚合
    ///
    /// `join_all` 按输入顺序返回结果，与完成顺序无关。
    pub async fn probe_all(&self) -> CycleReport {
        if self.targets.is_empty() {
            warn!("没有配置任何探测目标，本轮视为离线");
        }

        let probes = self
            .targets
            .iter()
            .map(|target| self.prober.probe(target, self.probe_timeout));
        let outcomes = futures::future::join_all(probes).await;

        CycleReport::new(Utc::now(), outcomes)
    }

    /// 执行完整的一轮：探测、聚合、输出
    ///
    /// 某个输出端失败只记录错误，其余输出端仍会收到报告。
    pub async fn run_cycle(&self) -> CycleReport {
        let report = self.probe_all().await;

        if report.overall_online {
            info!(
                "网络正常: {}/{} 个目标在线",
                report.online_count(),
                report.outcomes.len()
            );
        } else {
            warn!("网络中断: 所有目标均不可达 ({})", report.iso_timestamp());
        }

        for outcome in &report.outcomes {
            debug!(
                "{} -> {} ({}ms)",
                outcome.target,
                outcome.status,
                outcome.response_time_ms()
            );
        }

        self.emit(&report).await;
        report
    }

    /// 把报告交给每个输出端
    async fn emit(&self, report: &CycleReport) {
        for sink in &self.sinks {
            if let Err(e) = sink.emit(report).await {
                error!("输出端 {} 写入失败: {}", sink.name(), e);
            }
        }
    }
}
