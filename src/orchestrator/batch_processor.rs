//! 批量嘉宾处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量嘉宾的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查凭证、创建 LLM 客户端和各项服务
//! 2. **批量加载**：抓取嘉宾名单（在线 → 本地兜底）
//! 3. **并发控制**：使用 Semaphore 限制同时处理的嘉宾数量
//! 4. **结果汇总**：任务结束后统一汇总统计，写出 CSV
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个嘉宾的细节，委托 `RecordProcessor`
//! - **故障隔离**：单个嘉宾失败（包括任务 panic）只计入统计，不中断批次

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::{CompletionService, LlmClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{EmailLimits, OutputRow, SpeakerRecord};
use crate::orchestrator::record_processor::{RecordOutcome, RecordProcessor};
use crate::orchestrator::stats::RunStatistics;
use crate::services::{ClassificationPolicy, CsvWriter, EmailGenerator, RetryPolicy, SpeakerSource};
use crate::utils::logging;

/// 批量处理器
pub struct BatchProcessor {
    processor: Arc<RecordProcessor>,
    max_concurrent: usize,
}

impl BatchProcessor {
    pub fn new(processor: RecordProcessor, max_concurrent: usize) -> Self {
        Self {
            processor: Arc::new(processor),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 按配置组装分类、邮件生成和单个嘉宾处理器
    pub fn from_config(config: Arc<Config>, service: Arc<dyn CompletionService>) -> Self {
        let retry = RetryPolicy::from(config.as_ref());
        let policy = ClassificationPolicy::new(&config.rules, service.clone(), retry);
        let generator = EmailGenerator::new(service, retry, EmailLimits::from(config.as_ref()));
        let max_concurrent = config.max_concurrent;
        Self::new(RecordProcessor::new(policy, generator, config), max_concurrent)
    }

    /// 处理所有嘉宾
    ///
    /// # 参数
    /// - `records`: 已校验的嘉宾
    /// - `stats`: 运行统计，在所有任务结束后统一更新
    ///
    /// # 返回
    /// 生成的输出行（顺序不保证与输入一致）
    pub async fn run(&self, records: Vec<SpeakerRecord>, stats: &mut RunStatistics) -> Vec<OutputRow> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(records.len());
        let mut outcomes = Vec::with_capacity(records.len());

        for (idx, speaker) in records.into_iter().enumerate() {
            let index = idx + 1;
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("[嘉宾 {}] 获取并发许可失败: {}", index, e);
                    outcomes.push(RecordOutcome::Failed);
                    continue;
                }
            };
            let processor = self.processor.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                processor.process(&speaker, index).await
            });
            handles.push((index, handle));
        }

        for (index, result) in futures::future::join_all(
            handles
                .into_iter()
                .map(|(index, handle)| async move { (index, handle.await) }),
        )
        .await
        {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("[嘉宾 {}] 任务执行失败: {}", index, e);
                    outcomes.push(RecordOutcome::Failed);
                }
            }
        }

        let mut rows = Vec::new();
        for outcome in outcomes {
            stats.record(&outcome);
            if let RecordOutcome::Emailed(row) = outcome {
                rows.push(row);
            }
        }

        info!("✓ 成功处理 {} 位目标嘉宾", rows.len());
        rows
    }
}

/// 应用主结构
pub struct App {
    config: Arc<Config>,
    source: SpeakerSource,
    batch: BatchProcessor,
    writer: CsvWriter,
}

impl App {
    /// 初始化应用，缺少 API Key 时返回错误
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.require_api_key()?;
        let service: Arc<dyn CompletionService> = Arc::new(LlmClient::new(&config));
        Self::with_service(config, service)
    }

    /// 使用指定的补全服务初始化
    pub fn with_service(config: Config, service: Arc<dyn CompletionService>) -> AppResult<Self> {
        logging::log_startup(&config);

        let config = Arc::new(config);
        let source = SpeakerSource::new(&config)?;
        let writer = CsvWriter::new(&config.output_csv);
        let batch = BatchProcessor::from_config(config.clone(), service);

        Ok(Self {
            config,
            source,
            batch,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<RunStatistics> {
        let mut stats = RunStatistics::start();

        info!("\n📁 正在抓取嘉宾名单...");
        let mut speakers = self
            .source
            .fetch(&self.config.conference_url, Some(Path::new(&self.config.fallback_html)))
            .await;
        stats.total_scanned = speakers.len();

        if speakers.is_empty() {
            error!("❌ 没有找到任何嘉宾，程序结束");
            stats.finish();
            logging::print_execution_report(&stats, &self.config.output_csv);
            return Err(AppError::NoSpeakers);
        }

        if let Some(limit) = self.config.max_speakers {
            if limit < speakers.len() {
                warn!("⚠️ 只处理前 {} 位嘉宾（共 {} 位）", limit, speakers.len());
                speakers.truncate(limit);
            }
        }

        logging::log_speakers_loaded(speakers.len(), self.config.max_concurrent);

        let rows = self.batch.run(speakers, &mut stats).await;

        let written = self.writer.write(&rows)?;
        if written > 0 {
            logging::log_row_breakdown(&rows);
        }

        stats.finish();
        logging::print_execution_report(&stats, &self.config.output_csv);

        Ok(stats)
    }
}
