use crate::config::Config;
use crate::error::ValidationError;
use crate::models::{Category, EmailContent, SpeakerRecord};
use serde::Serialize;

/// 输出表格中的一行
///
/// 列顺序固定：嘉宾姓名、职位、公司、类别、邮件主题、邮件正文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Speaker Name")]
    pub speaker_name: String,
    #[serde(rename = "Speaker Title")]
    pub speaker_title: String,
    #[serde(rename = "Speaker Company")]
    pub speaker_company: String,
    #[serde(rename = "Company Category")]
    pub company_category: Category,
    #[serde(rename = "Email Subject")]
    pub email_subject: String,
    #[serde(rename = "Email Body")]
    pub email_body: String,
}

impl OutputRow {
    /// 由嘉宾、类别和邮件组装输出行，并按输出约束再次校验
    ///
    /// 输出行的职位上限比嘉宾记录更严格，超出时返回错误
    pub fn new(
        speaker: &SpeakerRecord,
        category: Category,
        email: &EmailContent,
        config: &Config,
    ) -> Result<Self, ValidationError> {
        check_max("speaker_name", speaker.name(), config.max_name_len)?;
        check_max("speaker_title", speaker.title(), config.max_output_title_len)?;
        check_max("speaker_company", speaker.company(), config.max_company_len)?;
        check_max("email_subject", email.subject(), config.email_subject_max_len)?;
        check_max("email_body", email.body(), config.email_body_max_len)?;

        Ok(Self {
            speaker_name: speaker.name().to_string(),
            speaker_title: speaker.title().to_string(),
            speaker_company: speaker.company().to_string(),
            company_category: category,
            email_subject: email.subject().to_string(),
            email_body: email.body().to_string(),
        })
    }
}

fn check_max(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}
