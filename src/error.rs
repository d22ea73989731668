use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 嘉宾数据校验失败
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 嘉宾数据抓取错误
    #[error("抓取错误: {0}")]
    Source(#[from] SourceError),
    /// 结果写出错误
    #[error("输出错误: {0}")]
    Output(#[from] OutputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 没有任何可处理的嘉宾
    #[error("没有找到任何嘉宾")]
    NoSpeakers,
}

/// 字段校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("字段 {field} 不能为空")]
    Empty { field: &'static str },
    #[error("字段 {field} 过短: {len} < {min}")]
    TooShort {
        field: &'static str,
        len: usize,
        min: usize,
    },
    #[error("字段 {field} 过长: {len} > {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("无效的类别: {0}")]
    InvalidCategory(String),
}

/// LLM 服务错误
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 请求频率限制或配额耗尽
    #[error("LLM API rate limit / quota exceeded (模型: {model}): {message}")]
    RateLimited { model: String, message: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 构建请求失败
    #[error("构建LLM请求失败: {0}")]
    RequestBuild(String),
}

impl LlmError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            other => is_rate_limit_message(&other.to_string()),
        }
    }
}

/// 根据错误文本判断是否为限流 / 配额错误
///
/// 匹配 "429"、"quota"、"rate limit"、"resource exhausted"（不区分大小写）
pub fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("429")
        || lower.contains("quota")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("resource exhausted")
        || lower.contains("resource_exhausted")
}

/// 嘉宾数据抓取错误
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("创建HTTP客户端失败: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} ({url})")]
    BadStatus { url: String, status: u16 },
    #[error("本地文件不存在: {path}")]
    FallbackMissing { path: String },
    #[error("读取本地文件失败 ({path}): {source}")]
    FallbackUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 结果写出错误
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("创建输出目录失败 ({path}): {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入CSV失败 ({path}): {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少必需的凭证
    #[error("缺少环境变量 {var_name}")]
    MissingCredential { var_name: String },
    #[error("无法读取配置文件 {path}: {source}")]
    FileUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件格式错误 {path}: {message}")]
    InvalidFile { path: String, message: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
