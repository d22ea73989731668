/// 日志工具模块
///
/// 初始化 tracing，并提供启动信息与运行报告的输出
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{Category, OutputRow};
use crate::orchestrator::RunStatistics;

/// 初始化日志
///
/// `RUST_LOG` 优先于配置中的日志级别；重复调用不会报错
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 嘉宾邀约邮件生成");
    info!("🤖 模型: {}", config.llm_model_name);
    info!("📊 最大并发数: {}", config.max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录嘉宾加载信息
///
/// # 参数
/// - `total`: 嘉宾总数
/// - `max_concurrent`: 最大并发数
pub fn log_speakers_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 位待处理的嘉宾", total);
    info!("📋 最多同时处理 {} 位", max_concurrent);
}

/// 记录已写出结果的类别分布
pub fn log_row_breakdown(rows: &[OutputRow]) {
    info!("Category breakdown:");
    for category in Category::ALL {
        let count = rows.iter().filter(|r| r.company_category == category).count();
        if count > 0 {
            info!("  {}: {}", category, count);
        }
    }
}

/// 打印运行报告
///
/// # 参数
/// - `stats`: 运行统计
/// - `output_path`: 输出文件路径
pub fn print_execution_report(stats: &RunStatistics, output_path: &str) {
    let fmt_time = |t: chrono::DateTime<chrono::Local>| t.format("%Y-%m-%d %H:%M:%S").to_string();

    info!("\n{}", "=".repeat(80));
    info!("📊 EXECUTION REPORT");
    info!("{}", "=".repeat(80));

    info!("⏱️  Total Execution Time: {}", format_duration(stats.execution_time()));
    info!("📅 Started: {}", fmt_time(stats.started_at));
    info!(
        "📅 Finished: {}",
        stats.finished_at.map(fmt_time).unwrap_or_else(|| "N/A".to_string())
    );

    info!("\n👥 SPEAKER STATISTICS");
    info!("{}", "-".repeat(40));
    info!("📊 Total Speakers Scanned: {}", stats.total_scanned);
    info!("🔄 Speakers Processed: {}", stats.processed);
    info!("✉️  Emails Generated: {}", stats.emails_generated);
    info!("⏭️  Speakers Skipped: {}", stats.skipped);

    info!("\n🏷️  CATEGORY BREAKDOWN");
    info!("{}", "-".repeat(40));
    for (category, count) in &stats.category_counts {
        if *count > 0 {
            info!("{} {}: {}", category.emoji(), category, count);
        }
    }

    info!("\n🔌 API STATISTICS");
    info!("{}", "-".repeat(40));
    info!("❌ API Errors: {}", stats.api_errors);
    match stats.success_rate() {
        Some(rate) => info!("✅ Success Rate: {:.1}%", rate),
        None => info!("✅ Success Rate: N/A"),
    }

    if let Some(per_minute) = stats.emails_per_minute() {
        info!("\n⚡ PERFORMANCE METRICS");
        info!("{}", "-".repeat(40));
        info!("📈 Emails per Minute: {:.1}", per_minute);
        if let Some(avg) = stats.avg_seconds_per_speaker() {
            info!("⏱️  Average Time per Speaker: {:.1}s", avg);
        }
    }

    info!("\n📋 SUMMARY");
    info!("{}", "-".repeat(40));
    if stats.emails_generated > 0 {
        info!(
            "✅ Successfully generated {} personalized emails",
            stats.emails_generated
        );
        info!("📁 Output saved to: {}", output_path);
    } else {
        warn!("⚠️  No emails were generated");
    }
    if stats.api_errors > 0 {
        warn!("⚠️  {} API errors occurred during processing", stats.api_errors);
    }
    info!("{}", "=".repeat(80));
}

fn format_duration(duration: chrono::Duration) -> String {
    let total_ms = duration.num_milliseconds().max(0);
    let secs = total_ms / 1000;
    format!(
        "{}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60,
        total_ms % 1000
    )
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
