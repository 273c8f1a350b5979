//! 控制台输出端
//!
//! 每轮输出一行整体状态，整体离线时额外输出一行警告

use crate::error::Result;
use crate::monitor::CycleReport;
use crate::sink::ReportSink;
use async_trait::async_trait;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;

/// 控制台输出端
pub struct ConsoleSink<W: Write + Send = Stdout> {
    writer: Mutex<W>,
}

impl ConsoleSink<Stdout> {
    /// 输出到标准输出
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// 使用指定的写入器创建
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// 取回内部写入器
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 渲染一轮的控制台输出
    pub fn render(report: &CycleReport) -> String {
        let timestamp = report.iso_timestamp();
        let mut lines = format!(
            "[{}] Internet: {}\n",
            timestamp,
            if report.overall_online { "UP" } else { "DOWN" }
        );
        if report.is_down() {
            lines.push_str(&format!("⚠️  Connection lost at {timestamp}\n"));
        }
        lines
    }
}

#[async_trait]
impl<W: Write + Send> ReportSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    async fn emit(&self, report: &CycleReport) -> Result<()> {
        let rendered = Self::render(report);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writer.write_all(rendered.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
