//! 公司分类 - 业务能力层
//!
//! 分类由一条有序的策略链完成，先命中者生效：
//! 1. 公司或职位为空 → Other
//! 2. 竞争对手名单 → Competitor
//! 3. 合作伙伴名单 → Partner
//! 4. LLM 判断（Builder / Owner / Other）
//! 5. 职位关键词兜底（builder 关键词优先于 owner 关键词）
//!
//! 人工名单是最终依据，始终先于 LLM 和关键词

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::clients::CompletionService;
use crate::config::ClassificationRules;
use crate::models::Category;
use crate::services::retry::{with_retry, RetryPolicy};
use crate::utils::logging::truncate_text;

/// 给出分类结果的阶段（用于审计日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationStage {
    EmptyInput,
    ManualList,
    CompletionService,
    KeywordFallback,
    /// 策略链全部未命中
    Default,
}

impl std::fmt::Display for ClassificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClassificationStage::EmptyInput => "empty input",
            ClassificationStage::ManualList => "manual list",
            ClassificationStage::CompletionService => "LLM",
            ClassificationStage::KeywordFallback => "keyword fallback",
            ClassificationStage::Default => "default",
        };
        write!(f, "{}", name)
    }
}

/// 分类结果及其来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub stage: ClassificationStage,
}

/// 分类策略
///
/// 命中时返回类别，未命中返回 `None` 交给下一个策略
#[async_trait]
pub trait ClassificationStrategy: Send + Sync {
    fn stage(&self) -> ClassificationStage;

    async fn evaluate(&self, company: &str, title: &str) -> Option<Category>;
}

/// 公司或职位为空
pub struct EmptyInputRule;

#[async_trait]
impl ClassificationStrategy for EmptyInputRule {
    fn stage(&self) -> ClassificationStage {
        ClassificationStage::EmptyInput
    }

    async fn evaluate(&self, company: &str, title: &str) -> Option<Category> {
        if company.trim().is_empty() || title.trim().is_empty() {
            Some(Category::Other)
        } else {
            None
        }
    }
}

/// 人工名单：公司或职位中包含名单中的任一名称（不区分大小写）
pub struct ManualListRule {
    names: Vec<String>,
    category: Category,
}

impl ManualListRule {
    pub fn new(names: &[String], category: Category) -> Self {
        Self {
            names: names
                .iter()
                .map(|n| n.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
            category,
        }
    }
}

#[async_trait]
impl ClassificationStrategy for ManualListRule {
    fn stage(&self) -> ClassificationStage {
        ClassificationStage::ManualList
    }

    async fn evaluate(&self, company: &str, title: &str) -> Option<Category> {
        let company = company.to_lowercase();
        let title = title.to_lowercase();
        self.names
            .iter()
            .any(|name| company.contains(name.as_str()) || title.contains(name.as_str()))
            .then_some(self.category)
    }
}

/// LLM 判断，调用失败或回复不在 {Builder, Owner, Other} 中时未命中
pub struct CompletionServiceRule {
    service: Arc<dyn CompletionService>,
    retry: RetryPolicy,
}

impl CompletionServiceRule {
    pub fn new(service: Arc<dyn CompletionService>, retry: RetryPolicy) -> Self {
        Self { service, retry }
    }
}

#[async_trait]
impl ClassificationStrategy for CompletionServiceRule {
    fn stage(&self) -> ClassificationStage {
        ClassificationStage::CompletionService
    }

    async fn evaluate(&self, company: &str, title: &str) -> Option<Category> {
        let prompt = build_classification_prompt(company, title);
        let service = &self.service;

        match with_retry(&self.retry, "公司分类", || service.complete(&prompt)).await {
            Ok(reply) => {
                let category = Category::from_llm_reply(&reply);
                if category.is_none() {
                    warn!(
                        "LLM 返回了无效的分类: '{}' ({})",
                        truncate_text(reply.trim(), 50),
                        company
                    );
                }
                category
            }
            Err(e) => {
                warn!("LLM 分类失败 ({}): {}", company, e);
                None
            }
        }
    }
}

/// 职位关键词兜底，总会给出结果
pub struct KeywordRule {
    builder_keywords: Vec<String>,
    owner_keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(rules: &ClassificationRules) -> Self {
        Self {
            builder_keywords: rules.builder_keywords.iter().map(|k| k.to_lowercase()).collect(),
            owner_keywords: rules.owner_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn classify_title(&self, title: &str) -> Category {
        let title = title.to_lowercase();
        let hit = |keywords: &[String]| keywords.iter().any(|k| !k.is_empty() && title.contains(k.as_str()));

        if hit(&self.builder_keywords) {
            Category::Builder
        } else if hit(&self.owner_keywords) {
            Category::Owner
        } else {
            Category::Other
        }
    }
}

#[async_trait]
impl ClassificationStrategy for KeywordRule {
    fn stage(&self) -> ClassificationStage {
        ClassificationStage::KeywordFallback
    }

    async fn evaluate(&self, _company: &str, title: &str) -> Option<Category> {
        Some(self.classify_title(title))
    }
}

/// 分类策略链
pub struct ClassificationPolicy {
    strategies: Vec<Box<dyn ClassificationStrategy>>,
}

impl ClassificationPolicy {
    /// 按标准顺序组装策略链
    pub fn new(
        rules: &ClassificationRules,
        service: Arc<dyn CompletionService>,
        retry: RetryPolicy,
    ) -> Self {
        Self::with_strategies(vec![
            Box::new(EmptyInputRule),
            Box::new(ManualListRule::new(&rules.competitors, Category::Competitor)),
            Box::new(ManualListRule::new(&rules.partners, Category::Partner)),
            Box::new(CompletionServiceRule::new(service, retry)),
            Box::new(KeywordRule::new(rules)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ClassificationStrategy>>) -> Self {
        Self { strategies }
    }

    /// 对公司分类，不会失败
    pub async fn classify(&self, company: &str, title: &str) -> Category {
        self.explain(company, title).await.category
    }

    /// 分类并返回给出结果的阶段
    pub async fn explain(&self, company: &str, title: &str) -> Classification {
        for strategy in &self.strategies {
            if let Some(category) = strategy.evaluate(company, title).await {
                let stage = strategy.stage();
                info!("Classified {} as {} ({})", company, category, stage);
                return Classification { category, stage };
            }
        }

        Classification {
            category: Category::Other,
            stage: ClassificationStage::Default,
        }
    }
}

fn build_classification_prompt(company: &str, title: &str) -> String {
    format!(
        r#"You are a construction industry expert. Classify this company and person into one of these categories:

- Builder: Companies that build things (contractors, engineering firms, construction companies, architects, etc.)
- Owner: Companies that own/commission construction projects (real estate developers, property owners, facility managers, etc.)
- Other: Any other type of company not clearly in the above categories

Company: {}
Person's Title: {}

Respond with ONLY one word: Builder, Owner, or Other"#,
        company, title
    )
}
