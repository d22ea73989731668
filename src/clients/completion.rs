//! 文本补全能力
//!
//! 分类与邮件生成只依赖这个接口，不关心背后是哪家模型服务

use crate::error::LlmError;
use async_trait::async_trait;

/// 文本补全服务
///
/// 输入 prompt，返回模型生成的文本；可能因限流、网络或服务端错误失败
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}
