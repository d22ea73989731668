use crate::config::Config;
use crate::error::ValidationError;

/// 邮件内容
///
/// 主题与正文去掉首尾空白后均非空，且不超过长度上限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    subject: String,
    body: String,
}

/// 邮件长度上限
#[derive(Debug, Clone, Copy)]
pub struct EmailLimits {
    pub max_subject: usize,
    pub max_body: usize,
}

impl From<&Config> for EmailLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_subject: config.email_subject_max_len,
            max_body: config.email_body_max_len,
        }
    }
}

impl Default for EmailLimits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl EmailContent {
    /// 严格校验：为空或超长都返回错误
    pub fn new(subject: &str, body: &str, limits: &EmailLimits) -> Result<Self, ValidationError> {
        let subject = subject.trim();
        let body = body.trim();
        check_bounds("subject", subject, limits.max_subject)?;
        check_bounds("body", body, limits.max_body)?;
        Ok(Self {
            subject: subject.to_string(),
            body: body.to_string(),
        })
    }

    /// 超长部分按字符截断，只在内容为空时返回错误
    pub fn truncated(
        subject: &str,
        body: &str,
        limits: &EmailLimits,
    ) -> Result<Self, ValidationError> {
        let subject = truncate_chars(subject.trim(), limits.max_subject);
        let body = truncate_chars(body.trim(), limits.max_body);
        Self::new(subject.trim_end(), body.trim_end(), limits)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

fn check_bounds(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::Empty { field });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(())
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
