//! 限流重试 - 业务能力层
//!
//! 只认识"一个可能因限流失败的异步调用"，不关心调用的是分类还是邮件生成
//!
//! ## 策略
//! - 最多尝试 `max_attempts` 次
//! - 第 n 次重试前（n 从 0 开始）等待 `base_delay * 2^n`，不超过 `max_delay`
//! - 只有限流 / 配额类错误会重试；其他错误立即返回
//! - 次数用尽后返回最后一次的原始错误

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::is_rate_limit_message;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// 第 `retry_index` 次重试前的等待时间
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry_index))
            .min(self.max_delay)
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
            Duration::from_millis(config.retry_max_delay_ms),
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// 按限流策略执行异步调用
///
/// # 参数
/// - `policy`: 重试策略
/// - `label`: 日志中显示的调用名称
/// - `operation`: 每次尝试都会重新调用的闭包
///
/// # 返回
/// 第一次成功的结果；或非限流错误；或次数用尽后的最后一个错误
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} 在第 {} 次尝试后成功", label, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) => {
                let message = e.to_string();
                if !is_rate_limit_message(&message) {
                    error!("{} 调用失败: {}", label, message);
                    return Err(e);
                }

                if attempt + 1 >= max_attempts {
                    error!("{} 超过最大重试次数 ({}): {}", label, max_attempts, message);
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    "{} 触发限流，{:?} 后重试 (第 {}/{} 次尝试)",
                    label,
                    delay,
                    attempt + 1,
                    max_attempts
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
