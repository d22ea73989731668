use crate::config::Config;
use crate::error::ValidationError;

/// 嘉宾记录
///
/// 三个字段均已合并多余空白并通过长度校验，创建后不可修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerRecord {
    name: String,
    title: String,
    company: String,
}

/// 嘉宾字段长度约束
#[derive(Debug, Clone, Copy)]
pub struct SpeakerLimits {
    pub min_name: usize,
    pub min_title: usize,
    pub min_company: usize,
    pub max_name: usize,
    pub max_title: usize,
    pub max_company: usize,
}

impl From<&Config> for SpeakerLimits {
    fn from(config: &Config) -> Self {
        Self {
            min_name: config.min_name_len,
            min_title: config.min_title_len,
            min_company: config.min_company_len,
            max_name: config.max_name_len,
            max_title: config.max_title_len,
            max_company: config.max_company_len,
        }
    }
}

impl Default for SpeakerLimits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl SpeakerRecord {
    /// 校验并创建嘉宾记录
    ///
    /// # 参数
    /// - `name` / `title` / `company`: 原始文本
    /// - `limits`: 长度约束
    ///
    /// # 返回
    /// 任一字段为空、过短或过长时返回 `ValidationError`
    pub fn new(
        name: &str,
        title: &str,
        company: &str,
        limits: &SpeakerLimits,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validate_field("name", name, limits.min_name, limits.max_name)?,
            title: validate_field("title", title, limits.min_title, limits.max_title)?,
            company: validate_field("company", company, limits.min_company, limits.max_company)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }
}

impl std::fmt::Display for SpeakerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} @ {})", self.name, self.title, self.company)
    }
}

/// 合并连续空白为单个空格并去掉首尾空白
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn validate_field(
    field: &'static str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let value = normalize_whitespace(raw);
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::Empty { field });
    }
    if len < min {
        return Err(ValidationError::TooShort { field, len, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, len, max });
    }
    Ok(value)
}
