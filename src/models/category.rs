use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// 公司类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// 施工方：承包商、工程公司、建筑师等
    Builder,
    /// 业主方：开发商、物业、资产管理等
    Owner,
    /// 竞争对手（人工名单）
    Competitor,
    /// 合作伙伴（人工名单）
    Partner,
    /// 其他
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Builder,
        Category::Owner,
        Category::Competitor,
        Category::Partner,
        Category::Other,
    ];

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Category::Builder => "Builder",
            Category::Owner => "Owner",
            Category::Competitor => "Competitor",
            Category::Partner => "Partner",
            Category::Other => "Other",
        }
    }

    /// 报告中使用的图标
    pub fn emoji(self) -> &'static str {
        match self {
            Category::Builder => "🏗️",
            Category::Owner => "🏢",
            Category::Competitor => "⚔️",
            Category::Partner => "🤝",
            Category::Other => "❓",
        }
    }

    /// 解析 LLM 的分类回复
    ///
    /// 去掉首尾空白并转换为首字母大写后，只接受 Builder / Owner / Other
    pub fn from_llm_reply(reply: &str) -> Option<Self> {
        match title_case(reply.trim()).as_str() {
            "Builder" => Some(Category::Builder),
            "Owner" => Some(Category::Owner),
            "Other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ValidationError::InvalidCategory(s.to_string()))
    }
}

/// 每个单词首字母大写，其余小写
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_llm_reply_normalizes_case() {
        assert_eq!(Category::from_llm_reply("builder"), Some(Category::Builder));
        assert_eq!(Category::from_llm_reply("  OWNER \n"), Some(Category::Owner));
        assert_eq!(Category::from_llm_reply("Other"), Some(Category::Other));
    }

    #[test]
    fn test_from_llm_reply_rejects_unexpected_tokens() {
        // 人工名单类别不能由 LLM 给出
        assert_eq!(Category::from_llm_reply("Competitor"), None);
        assert_eq!(Category::from_llm_reply("Partner"), None);
        assert_eq!(Category::from_llm_reply("Builder."), None);
        assert_eq!(Category::from_llm_reply("InvalidCategory"), None);
        assert_eq!(Category::from_llm_reply(""), None);
    }

    #[test]
    fn test_from_str_exact() {
        assert_eq!("Partner".parse::<Category>().unwrap(), Category::Partner);
        assert!("partner".parse::<Category>().is_err());
    }
}
