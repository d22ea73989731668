use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use speaker_outreach::error::LlmError;
use speaker_outreach::models::SpeakerLimits;
use speaker_outreach::{
    App, AppError, BatchProcessor, Category, CompletionService, Config, RunStatistics,
    SpeakerRecord,
};
use tokio_test::assert_ok;

/// 测试用补全服务：按 prompt 类型返回固定回复，并统计调用次数
struct FakeService {
    classification_reply: Option<String>,
    email_reply: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeService {
    fn failing() -> Self {
        Self {
            classification_reply: None,
            email_reply: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn replying(classification: &str, email: &str) -> Self {
        Self {
            classification_reply: Some(classification.to_string()),
            email_reply: Some(email.to_string()),
            ..Self::failing()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionService for FakeService {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = if prompt.contains("personalized email") {
            self.email_reply.clone()
        } else {
            self.classification_reply.clone()
        };
        reply.ok_or_else(|| LlmError::ApiCallFailed {
            model: "fake".to_string(),
            message: "service unavailable".to_string(),
        })
    }
}

/// 补全服务直接 panic，模拟单个任务异常退出
struct PanickingService;

#[async_trait]
impl CompletionService for PanickingService {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        panic!("completion backend crashed");
    }
}

fn test_config() -> Config {
    Config {
        api_delay_ms: 0,
        max_retries: 1,
        retry_base_delay_ms: 1,
        retry_max_delay_ms: 5,
        conference_url: "http://127.0.0.1:9/speakers".to_string(),
        ..Config::default()
    }
}

fn speaker(name: &str, title: &str, company: &str) -> SpeakerRecord {
    SpeakerRecord::new(name, title, company, &SpeakerLimits::default()).unwrap()
}

fn batch(config: Config, service: Arc<FakeService>) -> BatchProcessor {
    BatchProcessor::from_config(Arc::new(config), service)
}

#[tokio::test]
async fn test_builder_gets_fallback_email_when_service_fails() {
    let service = Arc::new(FakeService::failing());
    let processor = batch(test_config(), service.clone());
    let mut stats = RunStatistics::start();

    let rows = processor
        .run(
            vec![speaker("John Smith", "Project Manager", "ABC Construction")],
            &mut stats,
        )
        .await;

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.company_category, Category::Builder);
    assert!(row.email_subject.contains("ABC Construction"));
    assert!(row.email_body.contains("ABC Construction"));
    assert!(row.email_body.contains("John Smith"));

    // 分类一次 + 邮件一次，非限流错误不重试
    assert_eq!(service.calls(), 2);
    assert_eq!(stats.processed, 1);
    assert_eq!(stats.emails_generated, 1);
    assert_eq!(stats.category_count(Category::Builder), 1);
}

#[tokio::test]
async fn test_competitor_is_skipped_without_calling_service() {
    let service = Arc::new(FakeService::failing());
    let processor = batch(test_config(), service.clone());
    let mut stats = RunStatistics::start();

    let rows = processor
        .run(vec![speaker("Pat Jones", "CEO", "Propeller Aero")], &mut stats)
        .await;

    assert!(rows.is_empty());
    assert_eq!(service.calls(), 0);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.category_count(Category::Competitor), 1);
    assert_eq!(stats.emails_generated, 0);
}

#[tokio::test]
async fn test_empty_batch_produces_no_rows() {
    let service = Arc::new(FakeService::failing());
    let processor = batch(test_config(), service);
    let mut stats = RunStatistics::start();

    let rows = processor.run(Vec::new(), &mut stats).await;
    stats.finish();

    assert!(rows.is_empty());
    assert_eq!(stats.processed, 0);
    assert_eq!(stats.success_rate(), None);
}

#[tokio::test]
async fn test_mixed_batch_keeps_fields_with_their_speaker() {
    let service = Arc::new(FakeService::failing());
    let config = Config {
        max_concurrent: 3,
        ..test_config()
    };
    let processor = batch(config, service);
    let mut stats = RunStatistics::start();

    let records = vec![
        speaker("John Smith", "Project Manager", "ABC Construction"),
        speaker("Maria Garcia", "Asset Manager", "Harbor Properties"),
        speaker("Pat Jones", "CEO", "Propeller Aero"),
        speaker("Lee Chen", "Chief Executive", "Bluewave Foods"),
    ];
    let mut rows = processor.run(records, &mut stats).await;
    rows.sort_by(|a, b| a.speaker_name.cmp(&b.speaker_name));

    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].speaker_name, "John Smith");
    assert_eq!(rows[0].speaker_title, "Project Manager");
    assert_eq!(rows[0].speaker_company, "ABC Construction");
    assert_eq!(rows[0].company_category, Category::Builder);
    assert!(rows[0].email_body.contains("ABC Construction"));

    assert_eq!(rows[1].speaker_name, "Maria Garcia");
    assert_eq!(rows[1].speaker_title, "Asset Manager");
    assert_eq!(rows[1].speaker_company, "Harbor Properties");
    assert_eq!(rows[1].company_category, Category::Owner);
    assert!(rows[1].email_body.contains("Harbor Properties"));

    assert_eq!(stats.processed, 4);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.category_count(Category::Competitor), 1);
    assert_eq!(stats.category_count(Category::Other), 1);
    assert_eq!(stats.api_errors, 0);
}

#[tokio::test]
async fn test_llm_replies_are_used_when_available() {
    let service = Arc::new(FakeService::replying(
        "Owner",
        "SUBJECT: Aerial views of Harbor Properties\nBODY: Hi Maria, visit booth #42.",
    ));
    let processor = batch(test_config(), service.clone());
    let mut stats = RunStatistics::start();

    let rows = processor
        .run(
            vec![speaker("Maria Garcia", "Chief Executive", "Harbor Properties")],
            &mut stats,
        )
        .await;

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company_category, Category::Owner);
    assert_eq!(rows[0].email_subject, "Aerial views of Harbor Properties");
    assert_eq!(rows[0].email_body, "Hi Maria, visit booth #42.");
    assert_eq!(service.calls(), 2);
}

#[tokio::test]
async fn test_concurrency_limit_is_respected() {
    let service = Arc::new(FakeService {
        delay: Duration::from_millis(20),
        ..FakeService::failing()
    });
    let config = Config {
        max_concurrent: 2,
        ..test_config()
    };
    let processor = batch(config, service.clone());
    let mut stats = RunStatistics::start();

    let records = (0..6)
        .map(|i| speaker(&format!("Builder Person {}", i), "Superintendent", "Northwind Builders"))
        .collect();
    let rows = processor.run(records, &mut stats).await;

    assert_eq!(rows.len(), 6);
    assert!(service.max_in_flight.load(Ordering::SeqCst) <= 2);
    assert_eq!(stats.emails_generated, 6);
}

#[tokio::test]
async fn test_panicking_task_counts_as_error() {
    let processor = BatchProcessor::from_config(Arc::new(test_config()), Arc::new(PanickingService));
    let mut stats = RunStatistics::start();

    let rows = processor
        .run(
            vec![speaker("John Smith", "Project Manager", "ABC Construction")],
            &mut stats,
        )
        .await;

    assert!(rows.is_empty());
    assert_eq!(stats.api_errors, 1);
    assert_eq!(stats.processed, 0);
}

#[tokio::test]
async fn test_app_writes_csv_from_local_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let html_path = dir.path().join("speakers.html");
    let csv_path = dir.path().join("out").join("email_list.csv");
    std::fs::write(
        &html_path,
        r#"
        <html><body>
          <div class="speaker">
            <h3>John Smith</h3>
            <p class="title">Project Manager</p>
            <p class="company">ABC Construction</p>
          </div>
          <div class="speaker">
            <h3>Pat Jones</h3>
            <p class="title">CEO</p>
            <p class="company">Propeller Aero</p>
          </div>
        </body></html>
        "#,
    )
    .unwrap();

    let config = Config {
        fallback_html: html_path.display().to_string(),
        output_csv: csv_path.display().to_string(),
        ..test_config()
    };
    let app = assert_ok!(App::with_service(config, Arc::new(FakeService::failing())));
    let stats = assert_ok!(app.run().await);

    assert_eq!(stats.total_scanned, 2);
    assert_eq!(stats.emails_generated, 1);
    assert_eq!(stats.skipped, 1);
    assert!(stats.finished_at.is_some());

    let content = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("Speaker Name,Speaker Title,Speaker Company,Company Category,Email Subject,Email Body")
    );
    let data: Vec<_> = lines.collect();
    assert_eq!(data.len(), 1);
    assert!(data[0].starts_with("John Smith,Project Manager,ABC Construction,Builder,"));
}

#[tokio::test]
async fn test_app_reports_no_speakers() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("email_list.csv");
    let config = Config {
        fallback_html: dir.path().join("missing.html").display().to_string(),
        output_csv: csv_path.display().to_string(),
        ..test_config()
    };

    let app = assert_ok!(App::with_service(config, Arc::new(FakeService::failing())));
    let result = app.run().await;

    assert!(matches!(result, Err(AppError::NoSpeakers)));
    assert!(!csv_path.exists());
}

#[tokio::test]
async fn test_app_requires_api_key() {
    let config = Config {
        llm_api_key: String::new(),
        ..test_config()
    };
    let result = App::initialize(config).await;
    assert!(matches!(result, Err(AppError::Config(_))));
}
