//! HTTP可达性探测器实现
//!
//! 对单个目标发起一次有截止时间的请求，并把所有结果归类为 [`ProbeStatus`]

use crate::error::{ProbeError, Result};
use crate::probe::outcome::{ProbeOutcome, ProbeStatus};
use crate::probe::target::Target;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// 探测器trait，定义探测接口
///
/// 探测永远不会返回错误，所有失败都体现在结果的状态字段中。
#[async_trait]
pub trait Prober: Send + Sync {
    /// 在给定时间预算内探测一个目标
    ///
    /// # 参数
    /// * `target` - 探测目标
    /// * `budget` - 超时时间
    ///
    /// # 返回
    /// * `ProbeOutcome` - 探测结果，耗时不会超过 `budget`（加上调度误差）
    async fn probe(&self, target: &Target, budget: Duration) -> ProbeOutcome;
}

/// 基于HTTP(S) GET的探测器
#[derive(Debug, Clone)]
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// 客户端不跟随重定向，也不复用连接，保证每次探测只发起一次连接尝试。
    /// 截止时间由 [`Prober::probe`] 自行控制，客户端本身不设置超时。
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .redirect(redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ProbeError::ClientBuild)?;

        Ok(Self { client })
    }

    /// 格式化请求错误信息，仅用于调试日志
    fn describe_error(error: &reqwest::Error) -> String {
        if error.is_timeout() {
            "Request timeout".to_string()
        } else if error.is_connect() {
            "Connection failed".to_string()
        } else if error.is_builder() {
            "Invalid request".to_string()
        } else {
            let error_str = error.to_string();
            if error_str.contains("dns") || error_str.contains("DNS") {
                "DNS resolution failed".to_string()
            } else if error_str.contains("certificate")
                || error_str.contains("tls")
                || error_str.contains("ssl")
            {
                "SSL/TLS certificate error".to_string()
            } else {
                format!("Request failed: {error_str}")
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target, budget: Duration) -> ProbeOutcome {
        let start_time = Instant::now();
        let url = target.url();

        // 请求与计时器竞争，先完成者决定结果；超时后请求future被丢弃
        let response_result = timeout(budget, self.client.get(&url).send()).await;
        let response_time = start_time.elapsed();

        let status = match response_result {
            Ok(Ok(response)) => {
                debug!(
                    "探测成功: {} -> HTTP {} ({}ms)",
                    url,
                    response.status().as_u16(),
                    response_time.as_millis()
                );
                ProbeStatus::Online
            }
            // 截止时间之前的网络层失败（包括系统级连接超时）都算离线
            Ok(Err(e)) => {
                debug!("探测失败: {} -> {}", url, Self::describe_error(&e));
                ProbeStatus::Offline
            }
            Err(_) => {
                debug!("探测超时: {} ({}ms)", url, budget.as_millis());
                ProbeStatus::Timeout
            }
        };

        ProbeOutcome::new(target.host.clone(), status, response_time)
    }
}
