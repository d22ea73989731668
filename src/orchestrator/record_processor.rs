//! 单个嘉宾处理器 - 编排层
//!
//! ## 职责
//!
//! 定义"一位嘉宾"的完整处理流程：
//! 1. 限流间隔
//! 2. 分类（人工名单 → LLM → 关键词）
//! 3. 非目标类别直接跳过
//! 4. 生成邮件并组装输出行
//!
//! 每一步的失败都只影响当前嘉宾，以 `RecordOutcome` 的形式交给上层汇总

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::models::{Category, OutputRow, SpeakerRecord};
use crate::services::{ClassificationPolicy, EmailGenerator};

/// 单个嘉宾的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 未能完成分类（任务异常退出）
    Failed,
    /// 已分类，但不是目标类别
    Skipped(Category),
    /// 目标类别，但邮件或输出行未通过校验
    Rejected(Category),
    /// 生成了输出行
    Emailed(OutputRow),
}

/// 单个嘉宾处理器
pub struct RecordProcessor {
    policy: ClassificationPolicy,
    generator: EmailGenerator,
    config: Arc<Config>,
}

impl RecordProcessor {
    pub fn new(policy: ClassificationPolicy, generator: EmailGenerator, config: Arc<Config>) -> Self {
        Self {
            policy,
            generator,
            config,
        }
    }

    /// 处理单个嘉宾
    ///
    /// # 参数
    /// - `speaker`: 已校验的嘉宾
    /// - `index`: 序号（仅用于日志显示）
    pub async fn process(&self, speaker: &SpeakerRecord, index: usize) -> RecordOutcome {
        tokio::time::sleep(self.config.api_delay()).await;

        let category = self.policy.classify(speaker.company(), speaker.title()).await;

        if !self.config.rules.is_target(category) {
            info!("[嘉宾 {}] ⏭️ 跳过 {} - 类别: {}", index, speaker.name(), category);
            return RecordOutcome::Skipped(category);
        }

        let email = match self.generator.generate(speaker, category).await {
            Ok(email) => email,
            Err(e) => {
                error!("[嘉宾 {}] ❌ 邮件生成失败 {}: {}", index, speaker.name(), e);
                return RecordOutcome::Rejected(category);
            }
        };

        match OutputRow::new(speaker, category, &email, &self.config) {
            Ok(row) => {
                info!("[嘉宾 {}] ✉️ 已生成邮件: {} ({})", index, speaker.name(), category);
                RecordOutcome::Emailed(row)
            }
            Err(e) => {
                error!("[嘉宾 {}] ❌ 输出行校验失败 {}: {}", index, speaker.name(), e);
                RecordOutcome::Rejected(category)
            }
        }
    }
}
