use crate::error::{AppResult, ConfigError};
use crate::models::Category;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置
///
/// 启动时加载一次，之后所有组件只读
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 数据来源与输出 ---
    /// 会议嘉宾页面
    pub conference_url: String,
    /// 在线抓取失败时使用的本地 HTML
    pub fallback_html: String,
    /// 输出 CSV 路径
    pub output_csv: String,
    /// 抓取超时（秒）
    pub fetch_timeout_secs: u64,
    // --- 限流与重试 ---
    /// 同时处理的嘉宾数量
    pub max_concurrent: usize,
    /// 每个嘉宾开始前的间隔（毫秒）
    pub api_delay_ms: u64,
    /// 最大尝试次数（含第一次）
    pub max_retries: u32,
    /// 退避基数（毫秒），第 n 次重试前等待 base * 2^n
    pub retry_base_delay_ms: u64,
    /// 单次退避上限（毫秒）
    pub retry_max_delay_ms: u64,
    /// 只处理前 N 个嘉宾（调试用）
    pub max_speakers: Option<usize>,
    // --- 字段长度约束 ---
    pub min_name_len: usize,
    pub min_title_len: usize,
    pub min_company_len: usize,
    pub max_name_len: usize,
    pub max_title_len: usize,
    pub max_company_len: usize,
    /// 输出行中职位的最大长度（比嘉宾记录更严格）
    pub max_output_title_len: usize,
    pub email_subject_max_len: usize,
    pub email_body_max_len: usize,
    /// 日志级别
    pub log_level: String,
    /// 分类规则
    pub rules: ClassificationRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            conference_url: "https://www.digitalconstructionweek.com/all-speakers/".to_string(),
            fallback_html: "in/speakers.html".to_string(),
            output_csv: "out/email_list.csv".to_string(),
            fetch_timeout_secs: 30,
            max_concurrent: 1,
            api_delay_ms: 100,
            max_retries: 3,
            retry_base_delay_ms: 2_000,
            retry_max_delay_ms: 60_000,
            max_speakers: None,
            min_name_len: 2,
            min_title_len: 2,
            min_company_len: 2,
            max_name_len: 100,
            max_title_len: 200,
            max_company_len: 100,
            max_output_title_len: 100,
            email_subject_max_len: 100,
            email_body_max_len: 1000,
            log_level: "info".to_string(),
            rules: ClassificationRules::default(),
        }
    }
}

impl Config {
    /// 从环境变量覆盖默认配置
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件（可选），再叠加环境变量
    ///
    /// # 参数
    /// - `path`: 配置文件路径，为 `None` 时只使用默认值
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| ConfigError::FileUnreadable {
                        path: path.display().to_string(),
                        source: e,
                    })?;
                toml::from_str::<Config>(&content).map_err(|e| ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        let llm_api_key = env_string("LLM_API_KEY")
            .or_else(|| env_string("GOOGLE_API_KEY"))
            .unwrap_or(self.llm_api_key);

        Self {
            llm_api_key,
            llm_api_base_url: env_string("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: env_string("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            conference_url: env_string("CONFERENCE_URL").unwrap_or(self.conference_url),
            fallback_html: env_string("FALLBACK_HTML").unwrap_or(self.fallback_html),
            output_csv: env_string("OUTPUT_CSV").unwrap_or(self.output_csv),
            max_concurrent: env_parse("MAX_CONCURRENT").unwrap_or(self.max_concurrent),
            api_delay_ms: env_parse("API_DELAY_MS").unwrap_or(self.api_delay_ms),
            max_retries: env_parse("MAX_RETRIES").unwrap_or(self.max_retries),
            retry_base_delay_ms: env_parse("RETRY_BASE_DELAY_MS")
                .unwrap_or(self.retry_base_delay_ms),
            max_speakers: env_parse("MAX_SPEAKERS").or(self.max_speakers),
            log_level: env_string("LOG_LEVEL").unwrap_or(self.log_level),
            ..self
        }
    }

    /// 检查 API Key，缺失时整个运行无法开始
    pub fn require_api_key(&self) -> AppResult<&str> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                var_name: "LLM_API_KEY / GOOGLE_API_KEY".to_string(),
            }
            .into());
        }
        Ok(&self.llm_api_key)
    }

    pub fn api_delay(&self) -> Duration {
        Duration::from_millis(self.api_delay_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// 分类规则：人工名单与关键词
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    /// 需要生成邮件的类别
    pub target_categories: Vec<Category>,
    pub excluded_categories: Vec<Category>,
    pub competitors: Vec<String>,
    pub partners: Vec<String>,
    /// 按顺序匹配，先于 owner 关键词
    pub builder_keywords: Vec<String>,
    pub owner_keywords: Vec<String>,
}

impl ClassificationRules {
    pub fn is_target(&self, category: Category) -> bool {
        self.target_categories.contains(&category)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            target_categories: vec![Category::Builder, Category::Owner],
            excluded_categories: vec![Category::Competitor, Category::Partner, Category::Other],
            competitors: strings(&[
                "Propeller",
                "DJI",
                "Skydio",
                "Pix4D",
                "Agisoft",
                "RealityCapture",
                "Bentley",
                "Autodesk Civil 3D",
                "Topcon",
                "Leica",
                "Trimble",
                "Hexagon",
                "Faro",
                "3DR",
                "Parrot",
                "Yuneec",
                "Autel",
            ]),
            partners: strings(&[
                "Autodesk",
                "Procore",
                "Trimble",
                "Bentley",
                "Oracle",
                "SAP",
                "Microsoft",
                "Google",
                "Amazon",
                "IBM",
                "Salesforce",
                "ServiceNow",
            ]),
            builder_keywords: strings(&[
                "contractor",
                "construction",
                "builder",
                "developer",
                "engineering",
                "architect",
                "design",
                "project manager",
                "superintendent",
                "foreman",
                "general contractor",
                "subcontractor",
                "specialty contractor",
            ]),
            owner_keywords: strings(&[
                "owner",
                "client",
                "investor",
                "developer",
                "property manager",
                "facility manager",
                "asset manager",
                "real estate",
                "investment",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_rules_targets() {
        let rules = ClassificationRules::default();
        assert!(rules.is_target(Category::Builder));
        assert!(rules.is_target(Category::Owner));
        assert!(!rules.is_target(Category::Competitor));
        assert!(!rules.is_target(Category::Partner));
        assert!(!rules.is_target(Category::Other));
    }

    #[test]
    fn test_load_toml_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
max_concurrent = 4
output_csv = "custom/out.csv"

[rules]
competitors = ["Acme Drones"]
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.rules.competitors, vec!["Acme Drones".to_string()]);
        // 未指定的字段保持默认值
        assert_eq!(config.rules.partners, ClassificationRules::default().partners);
        assert_eq!(config.email_subject_max_len, 100);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = Config::load(Some(Path::new("definitely/not/here.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_require_api_key() {
        let config = Config::default();
        assert!(config.require_api_key().is_err());

        let config = Config {
            llm_api_key: "key".to_string(),
            ..Config::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "key");
    }
}
