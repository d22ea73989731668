//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量嘉宾处理器
//! - 管理应用生命周期（初始化、运行）
//! - 抓取嘉宾名单（Vec<SpeakerRecord>）
//! - 控制并发数量（Semaphore）
//! - 写出 CSV、输出全局统计信息
//!
//! ### `record_processor` - 单个嘉宾处理器
//! - 分类 → 过滤 → 生成邮件 → 组装输出行
//!
//! ### `stats` - 运行统计
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SpeakerRecord>)
//!     ↓
//! record_processor (处理单个 SpeakerRecord)
//!     ↓
//! services (能力层：classifier / email_generator / retry)
//!     ↓
//! clients (CompletionService)
//! ```

pub mod batch_processor;
pub mod record_processor;
pub mod stats;

// 重新导出主要类型
pub use batch_processor::{App, BatchProcessor};
pub use record_processor::{RecordOutcome, RecordProcessor};
pub use stats::RunStatistics;
