//! # Speaker Outreach
//!
//! 抓取会议演讲嘉宾名单，对嘉宾所在公司分类，并为目标类别生成个性化邀约邮件
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有外部连接，只暴露能力
//! - `CompletionService` - 文本补全能力（prompt → text）
//! - `LlmClient` - 基于 async-openai 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个嘉宾
//! - `retry` - 限流重试（指数退避）
//! - `ClassificationPolicy` - 分层分类（人工名单 → LLM → 关键词）
//! - `EmailGenerator` - 邮件生成（LLM → 模板兜底）
//! - `SpeakerSource` - 嘉宾抓取（在线页面 → 本地文件）
//! - `CsvWriter` - 写出结果表格
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 并发上限内处理全部嘉宾，汇总结果
//! - `orchestrator/stats` - 运行统计与报告
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{CompletionService, LlmClient};
pub use config::{ClassificationRules, Config};
pub use error::{AppError, AppResult};
pub use models::{Category, EmailContent, OutputRow, SpeakerRecord};
pub use orchestrator::{App, BatchProcessor, RunStatistics};
pub use services::{ClassificationPolicy, CsvWriter, EmailGenerator, RetryPolicy, SpeakerSource};
