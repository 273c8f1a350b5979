//! 周期调度器模块
//!
//! 启动时立即执行一轮，之后按固定间隔重复执行。
//! 下一轮只会在上一轮的输出完成之后才开始计时等待，因此各轮之间不会重叠，
//! 日志中的记录始终按时间顺序追加。

use crate::monitor::cycle::MonitorCycle;
use crate::monitor::report::CycleReport;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 调度器状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerStatus {
    /// 调度器是否运行中
    pub is_running: bool,
    /// 已完成的周期数
    pub cycles_completed: u64,
    /// 最近一轮的时间戳
    pub last_cycle_at: Option<DateTime<Utc>>,
    /// 最近一轮的整体在线状态
    pub last_overall_online: Option<bool>,
}

impl SchedulerStatus {
    fn record(&mut self, report: &CycleReport) {
        self.cycles_completed += 1;
        self.last_cycle_at = Some(report.timestamp);
        self.last_overall_online = Some(report.overall_online);
    }
}

/// 调度器trait，定义调度接口
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// 启动调度器
    async fn start(&self) -> Result<()>;

    /// 停止调度器，等待进行中的一轮完成
    async fn stop(&self) -> Result<()>;

    /// 获取调度器状态
    async fn get_status(&self) -> SchedulerStatus;
}

/// 周期调度器实现
///
/// 显式持有的对象，生命周期为 构建 → 启动 → 停止。
pub struct CycleScheduler {
    /// 监控周期
    cycle: Arc<MonitorCycle>,
    /// 周期间隔
    interval: Duration,
    /// 调度器状态
    status: Arc<RwLock<SchedulerStatus>>,
    /// 关闭信号发送端
    shutdown_tx: watch::Sender<bool>,
    /// 后台任务句柄
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CycleScheduler {
    /// 创建新的周期调度器
    ///
    /// # 参数
    /// * `cycle` - 监控周期
    /// * `interval` - 周期间隔
    pub fn new(cycle: Arc<MonitorCycle>, interval: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            cycle,
            interval,
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    /// 周期间隔
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 不经过定时器，直接执行一轮
    pub async fn run_once(&self) -> CycleReport {
        let report = self.cycle.run_cycle().await;
        self.status.write().await.record(&report);
        report
    }

    /// 调度循环
    async fn run_loop(
        cycle: Arc<MonitorCycle>,
        period: Duration,
        status: Arc<RwLock<SchedulerStatus>>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = interval(period);
        // 某一轮超出间隔时，从该轮结束起重新计时，而不是补跑
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("调度循环收到关闭信号");
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let report = cycle.run_cycle().await;
            status.write().await.record(&report);
        }
    }
}

#[async_trait]
impl Scheduler for CycleScheduler {
    async fn start(&self) -> Result<()> {
        anyhow::ensure!(!self.interval.is_zero(), "周期间隔不能为0");

        let mut task = self.task.lock().await;
        if task.is_some() {
            warn!("调度器已在运行，忽略重复启动");
            return Ok(());
        }

        info!(
            "启动周期调度器，目标数量: {}，间隔: {}ms，探测超时: {}ms",
            self.cycle.targets().len(),
            self.interval.as_millis(),
            self.cycle.probe_timeout().as_millis()
        );

        self.shutdown_tx.send_replace(false);
        let shutdown_rx = self.shutdown_tx.subscribe();

        self.status.write().await.is_running = true;
        *task = Some(tokio::spawn(Self::run_loop(
            Arc::clone(&self.cycle),
            self.interval,
            Arc::clone(&self.status),
            shutdown_rx,
        )));

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let handle = self.task.lock().await.take();
        let Some(handle) = handle else {
            debug!("调度器未运行");
            return Ok(());
        };

        info!("停止周期调度器");
        self.shutdown_tx.send_replace(true);
        handle.await.context("等待调度任务结束失败")?;

        self.status.write().await.is_running = false;
        info!("周期调度器已停止");
        Ok(())
    }

    async fn get_status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }
}

impl Drop for CycleScheduler {
    fn drop(&mut self) {
        // 无法在drop中等待，只能通知后台任务退出
        self.shutdown_tx.send_replace(true);
    }
}
