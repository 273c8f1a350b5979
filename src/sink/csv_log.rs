//! 追加式CSV探测日志
//!
//! 每个探测结果写一行，文件只会被追加，不会被运行中的进程截断或重写

use crate::error::{Result, SinkError};
use crate::monitor::CycleReport;
use crate::sink::ReportSink;
use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// CSV文件头
pub const CSV_HEADER: &str = "timestamp,target,status,responseTime\n";

/// 日志轮转策略
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogRotation {
    /// 不轮转，文件无限增长
    #[default]
    Never,
    /// 按大小轮转，`log` → `log.1` → … → `log.{max_files}`
    Size { max_bytes: u64, max_files: usize },
}

impl LogRotation {
    /// 根据配置的大小上限（MB）创建策略，0 表示不轮转
    pub fn from_size_mb(max_size_mb: u64, max_files: usize) -> Self {
        if max_size_mb == 0 {
            LogRotation::Never
        } else {
            LogRotation::Size {
                max_bytes: max_size_mb * 1024 * 1024,
                max_files: max_files.max(1),
            }
        }
    }
}

/// 追加式CSV日志输出端
#[derive(Debug)]
pub struct CsvLogSink {
    /// 日志文件路径
    path: PathBuf,
    /// 轮转策略
    rotation: LogRotation,
    /// 写入锁，保证同一时刻只有一个写入者
    write_lock: Mutex<()>,
}

impl CsvLogSink {
    /// 打开（必要时创建）CSV日志
    ///
    /// 只有文件不存在或为空时才写入文件头，重复调用不会重复写入或截断已有内容。
    pub async fn open(path: impl Into<PathBuf>, rotation: LogRotation) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| SinkError::Write {
                    path: path.clone(),
                    source,
                })?;
        }

        if Self::ensure_header(&path).await? {
            info!("已创建探测日志: {}", path.display());
        }

        Ok(Self {
            path,
            rotation,
            write_lock: Mutex::new(()),
        })
    }

    /// 日志文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在或为空时写入文件头，返回是否写入
    async fn ensure_header(path: &Path) -> Result<bool> {
        match fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => return Ok(false),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(SinkError::Write {
                    path: path.to_path_buf(),
                    source,
                }
                .into())
            }
        }

        Self::append(path, CSV_HEADER).await?;
        Ok(true)
    }

    /// 以追加模式写入内容
    async fn append(path: &Path, content: &str) -> Result<()> {
        let write = async {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await
        };

        write.await.map_err(|source| {
            SinkError::Write {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// 第 `index` 个归档文件的路径
    fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    /// 文件超过大小上限时执行轮转
    async fn rotate_if_needed(&self) -> Result<()> {
        let (max_bytes, max_files) = match self.rotation {
            LogRotation::Never => return Ok(()),
            LogRotation::Size {
                max_bytes,
                max_files,
            } => (max_bytes, max_files.max(1)),
        };

        let size = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size < max_bytes {
            return Ok(());
        }

        let rotate_err = |source| SinkError::Rotate {
            path: self.path.clone(),
            source,
        };

        // 最旧的归档被覆盖，其余依次后移
        for index in (1..max_files).rev() {
            let from = self.rotated_path(index);
            if fs::try_exists(&from).await.unwrap_or(false) {
                fs::rename(&from, self.rotated_path(index + 1))
                    .await
                    .map_err(rotate_err)?;
            }
        }
        fs::rename(&self.path, self.rotated_path(1))
            .await
            .map_err(rotate_err)?;

        info!(
            "探测日志已轮转: {} ({} 字节)",
            self.path.display(),
            size
        );
        Ok(())
    }
}

#[async_trait]
impl ReportSink for CsvLogSink {
    fn name(&self) -> &str {
        "csv-log"
    }

    async fn emit(&self, report: &CycleReport) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // 轮转失败不影响本轮记录，继续写入当前文件
        if let Err(e) = self.rotate_if_needed().await {
            warn!("探测日志轮转失败，继续写入当前文件: {}", e);
        }
        // 文件可能被轮转或被外部删除，重新补齐文件头
        Self::ensure_header(&self.path).await?;

        if report.outcomes.is_empty() {
            return Ok(());
        }

        Self::append(&self.path, &report.to_csv_rows()).await?;
        debug!(
            "已写入 {} 条探测记录: {}",
            report.outcomes.len(),
            self.path.display()
        );
        Ok(())
    }
}
