//! 运行统计
//!
//! 由编排层在每个嘉宾任务结束后汇总，任务之间不共享计数器

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::models::Category;
use crate::orchestrator::record_processor::RecordOutcome;

/// 一次运行的统计信息
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    /// 抓取到的嘉宾总数
    pub total_scanned: usize,
    /// 完成分类的嘉宾数
    pub processed: usize,
    pub category_counts: BTreeMap<Category, usize>,
    pub api_errors: usize,
    pub emails_generated: usize,
    pub skipped: usize,
}

impl RunStatistics {
    /// 开始计时
    pub fn start() -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            total_scanned: 0,
            processed: 0,
            category_counts: BTreeMap::new(),
            api_errors: 0,
            emails_generated: 0,
            skipped: 0,
        }
    }

    /// 停止计时
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    /// 汇总单个嘉宾的处理结果
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Failed => {
                self.api_errors += 1;
            }
            RecordOutcome::Skipped(category) => {
                self.count_category(*category);
                self.skipped += 1;
            }
            RecordOutcome::Rejected(category) => {
                self.count_category(*category);
                self.api_errors += 1;
            }
            RecordOutcome::Emailed(row) => {
                self.count_category(row.company_category);
                self.emails_generated += 1;
            }
        }
    }

    fn count_category(&mut self, category: Category) {
        *self.category_counts.entry(category).or_insert(0) += 1;
        self.processed += 1;
    }

    pub fn category_count(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// 运行时长；未结束时计算到当前时间
    pub fn execution_time(&self) -> chrono::Duration {
        self.finished_at.unwrap_or_else(Local::now) - self.started_at
    }

    /// 成功率（百分比），没有处理任何嘉宾时为 `None`
    pub fn success_rate(&self) -> Option<f64> {
        if self.processed == 0 {
            return None;
        }
        let succeeded = self.processed.saturating_sub(self.api_errors);
        Some(succeeded as f64 / self.processed as f64 * 100.0)
    }

    pub fn emails_per_minute(&self) -> Option<f64> {
        let seconds = self.execution_seconds();
        if self.emails_generated == 0 || seconds <= 0.0 {
            return None;
        }
        Some(self.emails_generated as f64 / seconds * 60.0)
    }

    pub fn avg_seconds_per_speaker(&self) -> Option<f64> {
        let seconds = self.execution_seconds();
        if self.processed == 0 || seconds <= 0.0 {
            return None;
        }
        Some(seconds / self.processed as f64)
    }

    fn execution_seconds(&self) -> f64 {
        self.execution_time()
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}
