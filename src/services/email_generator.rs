//! 邮件生成 - 业务能力层
//!
//! 只负责"为一位嘉宾写一封邀约邮件"，不关心流程
//!
//! LLM 调用失败或回复无法解析时，按类别模板生成兜底邮件，不再发起网络请求

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::clients::CompletionService;
use crate::error::ValidationError;
use crate::models::{Category, EmailContent, EmailLimits, SpeakerRecord};
use crate::services::retry::{with_retry, RetryPolicy};

const SUBJECT_MARKER: &str = "SUBJECT:";
const BODY_MARKER: &str = "BODY:";

/// 邮件生成服务
pub struct EmailGenerator {
    service: Arc<dyn CompletionService>,
    retry: RetryPolicy,
    limits: EmailLimits,
}

/// 类别相关的 prompt 描述
struct CategoryFraming {
    role_context: &'static str,
    value_props: &'static str,
}

impl CategoryFraming {
    fn for_category(category: Category) -> Self {
        match category {
            Category::Builder => Self {
                role_context: "construction professionals who build and manage projects",
                value_props: "aerial intelligence for construction progress tracking, site management, and project oversight",
            },
            Category::Owner => Self {
                role_context: "property owners and developers who commission construction projects",
                value_props: "aerial intelligence for project monitoring, progress verification, and asset management",
            },
            _ => Self {
                role_context: "construction industry professionals",
                value_props: "aerial intelligence for construction and site management",
            },
        }
    }
}

impl EmailGenerator {
    pub fn new(service: Arc<dyn CompletionService>, retry: RetryPolicy, limits: EmailLimits) -> Self {
        Self {
            service,
            retry,
            limits,
        }
    }

    /// 为嘉宾生成邮件
    ///
    /// # 参数
    /// - `speaker`: 已校验的嘉宾
    /// - `category`: 分类结果
    ///
    /// # 返回
    /// LLM 生成的邮件；LLM 失败时返回模板邮件。
    /// 只有模板本身无法满足长度约束时才返回错误
    pub async fn generate(
        &self,
        speaker: &SpeakerRecord,
        category: Category,
    ) -> Result<EmailContent, ValidationError> {
        let prompt = build_email_prompt(speaker, category);
        let service = &self.service;

        let reply = match with_retry(&self.retry, "邮件生成", || service.complete(&prompt)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Email generation failed for {}: {}", speaker.name(), e);
                return self.fallback(speaker, category);
            }
        };

        let (subject, body) = parse_email_reply(&reply);
        match EmailContent::new(&subject, &body, &self.limits) {
            Ok(email) => {
                debug!("✓ 邮件生成成功: {}", speaker.name());
                Ok(email)
            }
            Err(e) => {
                warn!("Failed to parse LLM email for {}: {}", speaker.name(), e);
                self.fallback(speaker, category)
            }
        }
    }

    /// 按类别模板生成兜底邮件，超长部分截断
    pub fn fallback(
        &self,
        speaker: &SpeakerRecord,
        category: Category,
    ) -> Result<EmailContent, ValidationError> {
        let (subject, body) = fallback_template(speaker, category);
        EmailContent::truncated(&subject, &body, &self.limits)
    }
}

/// 解析 LLM 回复
///
/// 以 `SUBJECT:` 开头的行设置主题；以 `BODY:` 开头的行设置正文，
/// 之后的非空行用空格拼接到正文。遇到新的 `SUBJECT:` 行后不再追加正文
pub fn parse_email_reply(content: &str) -> (String, String) {
    #[derive(PartialEq)]
    enum Section {
        None,
        Subject,
        Body,
    }

    let mut subject = String::new();
    let mut body = String::new();
    let mut current = Section::None;

    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(SUBJECT_MARKER) {
            subject = rest.trim().to_string();
            current = Section::Subject;
        } else if let Some(rest) = line.strip_prefix(BODY_MARKER) {
            body = rest.trim().to_string();
            current = Section::Body;
        } else if current == Section::Body && !line.is_empty() {
            body.push(' ');
            body.push_str(line);
        }
    }

    (subject.trim().to_string(), body.trim().to_string())
}

fn build_email_prompt(speaker: &SpeakerRecord, category: Category) -> String {
    let framing = CategoryFraming::for_category(category);
    format!(
        r#"You are writing a personalized email to invite a construction conference speaker to visit DroneDeploy's booth #42.

Speaker Details:
- Name: {name}
- Title: {title}
- Company: {company}
- Category: {category} ({role_context})

Requirements:
1. Subject line: Create an interesting hook that would appeal to their specific role and industry
2. Email body: 2-3 sentences that:
   - Mention why DroneDeploy is relevant to their business/role
   - Invite them to booth #42 for a demo
   - Mention they'll receive a free gift
   - Keep it professional but engaging

DroneDeploy Value Props to Consider:
- {value_props}
- Drone-based aerial mapping and surveying
- Construction progress tracking and documentation
- Site safety and compliance monitoring
- Integration with construction management software

Format your response as:
SUBJECT: [subject line here]
BODY: [email body here]"#,
        name = speaker.name(),
        title = speaker.title(),
        company = speaker.company(),
        category = category,
        role_context = framing.role_context,
        value_props = framing.value_props,
    )
}

fn fallback_template(speaker: &SpeakerRecord, category: Category) -> (String, String) {
    let (name, title, company) = (speaker.name(), speaker.title(), speaker.company());
    match category {
        Category::Builder => (
            format!("See how {} can streamline construction with aerial intelligence", company),
            format!(
                "Hi {}, as a {} at {}, you know how important it is to track construction progress efficiently. \
                 DroneDeploy's aerial intelligence platform helps construction teams like yours monitor projects, \
                 ensure safety compliance, and deliver on time. Stop by our booth #42 for a personalized demo and receive a free gift!",
                name, title, company
            ),
        ),
        Category::Owner => (
            format!("Monitor your {} construction investments with aerial intelligence", company),
            format!(
                "Hi {}, as a {} at {}, you understand the value of transparent project oversight. \
                 DroneDeploy provides property owners and developers with real-time aerial insights to verify progress, \
                 ensure quality, and protect your investments. Visit booth #42 for a demo and free gift!",
                name, title, company
            ),
        ),
        _ => (
            format!("Discover how {} can benefit from construction aerial intelligence", company),
            format!(
                "Hi {}, DroneDeploy's aerial intelligence platform is transforming how construction professionals manage projects and sites. \
                 As a {} at {}, you'll see immediate value in our progress tracking and site management capabilities. \
                 Stop by booth #42 for a demo and free gift!",
                name, title, company
            ),
        ),
    }
}
