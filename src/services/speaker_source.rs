//! 嘉宾抓取服务 - 业务能力层
//!
//! 先抓取在线页面，失败或没有解析到嘉宾时读取本地 HTML；两者都失败返回空列表
//!
//! 页面结构不固定，按优先级依次尝试多组选择器，第一组命中的生效

use std::path::Path;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::SourceError;
use crate::models::{normalize_whitespace, SpeakerLimits, SpeakerRecord};

/// 嘉宾卡片选择器，按优先级排列
const CARD_SELECTORS: &[&str] = &[
    ".speaker",
    ".speaker-card",
    ".speaker-item",
    ".speaker-profile",
    "[class*=\"speaker\"]",
];

const NAME_SELECTORS: &[&str] = &["h3", "h4", ".name", ".speaker-name", "[class*=\"name\"]"];

const TITLE_SELECTORS: &[&str] = &[
    ".title",
    ".position",
    ".role",
    "[class*=\"title\"]",
    "[class*=\"position\"]",
];

const COMPANY_SELECTORS: &[&str] = &[
    ".company",
    ".organization",
    "[class*=\"company\"]",
    "[class*=\"org\"]",
];

/// 从卡片中提取出的原始三元组
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSpeaker {
    pub name: String,
    pub title: String,
    pub company: String,
}

impl RawSpeaker {
    fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.title.is_empty() && !self.company.is_empty()
    }
}

/// 嘉宾抓取服务
pub struct SpeakerSource {
    client: reqwest::Client,
    limits: SpeakerLimits,
}

impl SpeakerSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(SourceError::ClientBuild)?;

        Ok(Self {
            client,
            limits: SpeakerLimits::from(config),
        })
    }

    /// 抓取嘉宾列表
    ///
    /// # 参数
    /// - `primary_url`: 在线页面
    /// - `fallback_path`: 本地 HTML 文件
    ///
    /// # 返回
    /// 通过校验的嘉宾；两个来源都失败时为空
    pub async fn fetch(&self, primary_url: &str, fallback_path: Option<&Path>) -> Vec<SpeakerRecord> {
        match self.fetch_live(primary_url).await {
            Ok(speakers) if !speakers.is_empty() => {
                info!("✓ 从在线页面抓取到 {} 位嘉宾", speakers.len());
                return speakers;
            }
            Ok(_) => warn!("在线页面没有解析到嘉宾: {}", primary_url),
            Err(e) => warn!("在线抓取失败: {}", e),
        }

        if let Some(path) = fallback_path {
            match self.fetch_local(path).await {
                Ok(speakers) => {
                    info!("✓ 从本地文件读取到 {} 位嘉宾", speakers.len());
                    return speakers;
                }
                Err(e) => error!("本地文件抓取失败: {}", e),
            }
        }

        error!("在线与本地抓取均失败");
        Vec::new()
    }

    async fn fetch_live(&self, url: &str) -> Result<Vec<SpeakerRecord>, SourceError> {
        debug!("请求嘉宾页面: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| SourceError::RequestFailed {
            url: url.to_string(),
            source: e,
        })?;

        Ok(self.parse_html(&html))
    }

    async fn fetch_local(&self, path: &Path) -> Result<Vec<SpeakerRecord>, SourceError> {
        if !path.exists() {
            return Err(SourceError::FallbackMissing {
                path: path.display().to_string(),
            });
        }

        let html = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::FallbackUnreadable {
                path: path.display().to_string(),
                source: e,
            })?;

        Ok(self.parse_html(&html))
    }

    /// 解析 HTML 并校验嘉宾，不合格的记录记录警告后丢弃
    pub fn parse_html(&self, html: &str) -> Vec<SpeakerRecord> {
        extract_raw_speakers(html)
            .into_iter()
            .filter_map(|raw| {
                match SpeakerRecord::new(&raw.name, &raw.title, &raw.company, &self.limits) {
                    Ok(speaker) => Some(speaker),
                    Err(e) => {
                        warn!("Invalid speaker data ({}): {}", raw.name, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// 提取所有字段齐全的嘉宾卡片
pub fn extract_raw_speakers(html: &str) -> Vec<RawSpeaker> {
    let document = Html::parse_document(html);
    let cards = find_speaker_cards(&document);

    cards
        .into_iter()
        .map(|card| RawSpeaker {
            name: text_by_selectors(card, NAME_SELECTORS),
            title: text_by_selectors(card, TITLE_SELECTORS),
            company: text_by_selectors(card, COMPANY_SELECTORS),
        })
        .filter(|raw| {
            let complete = raw.is_complete();
            if !complete {
                debug!("跳过字段不全的卡片: {:?}", raw);
            }
            complete
        })
        .collect()
}

fn find_speaker_cards(document: &Html) -> Vec<ElementRef<'_>> {
    for selector_str in CARD_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            let elements: Vec<_> = document.select(&selector).collect();
            if !elements.is_empty() {
                info!("Found {} speakers using selector: {}", elements.len(), selector_str);
                return elements;
            }
        }
    }

    // 兜底：class 中含 speaker 的 div / article（不区分大小写）
    let elements: Vec<_> = Selector::parse("div, article")
        .map(|selector| {
            document
                .select(&selector)
                .filter(|el| {
                    el.value()
                        .attr("class")
                        .map(|class| class.to_lowercase().contains("speaker"))
                        .unwrap_or(false)
                })
                .collect()
        })
        .unwrap_or_default();
    info!("Fallback found {} potential speaker elements", elements.len());
    elements
}

fn text_by_selectors(element: ElementRef<'_>, selectors: &[&str]) -> String {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(found) = element.select(&selector).next() {
                return clean_text(&found.text().collect::<Vec<_>>().join(" "));
            }
        }
    }
    String::new()
}

/// 合并空白并去掉常见前缀
fn clean_text(text: &str) -> String {
    normalize_whitespace(text)
        .replace("Speaker:", "")
        .replace("Name:", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
    <html>
        <body>
            <div class="speaker">
                <h3>John Smith</h3>
                <p class="title">CEO</p>
                <p class="company">ABC Construction</p>
            </div>
            <div class="speaker">
                <h3>Jane Doe</h3>
                <p class="title">Project Manager</p>
                <p class="company">XYZ Engineering</p>
            </div>
        </body>
    </html>
    "#;

    fn source() -> SpeakerSource {
        SpeakerSource::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_extract_primary_selector() {
        let raw = extract_raw_speakers(SAMPLE_HTML);
        assert_eq!(raw.len(), 2);
        assert_eq!(
            raw[0],
            RawSpeaker {
                name: "John Smith".to_string(),
                title: "CEO".to_string(),
                company: "ABC Construction".to_string(),
            }
        );
        assert_eq!(raw[1].company, "XYZ Engineering");
    }

    #[test]
    fn test_extract_alternate_card_and_field_selectors() {
        let html = r#"
            <section>
              <article class="speaker-profile">
                <span class="speaker-name">Name:  Ana   Lopez</span>
                <span class="position">Facility Manager</span>
                <span class="organization">City Hospital</span>
              </article>
            </section>
        "#;
        let raw = extract_raw_speakers(html);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].name, "Ana Lopez");
        assert_eq!(raw[0].title, "Facility Manager");
        assert_eq!(raw[0].company, "City Hospital");
    }

    #[test]
    fn test_incomplete_cards_are_skipped() {
        let html = r#"
            <div class="speaker"><h3>No Company</h3><p class="title">CEO</p></div>
            <div class="speaker"><h3>Ok Person</h3><p class="title">CTO</p><p class="company">Acme</p></div>
        "#;
        let raw = extract_raw_speakers(html);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].name, "Ok Person");
    }

    #[test]
    fn test_parse_html_drops_invalid_records() {
        let html = r#"
            <div class="speaker"><h3>J</h3><p class="title">CEO</p><p class="company">Acme</p></div>
            <div class="speaker"><h3>Jane Doe</h3><p class="title">CTO</p><p class="company">Acme</p></div>
        "#;
        let speakers = source().parse_html(html);
        assert_eq!(speakers.len(), 1);
        assert_eq!(speakers[0].name(), "Jane Doe");
    }

    #[test]
    fn test_no_speakers_in_page() {
        assert!(extract_raw_speakers("<html><body><p>Nothing here</p></body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speakers.html");
        std::fs::write(&path, SAMPLE_HTML).unwrap();

        // 无法连接的地址，立即失败后读取本地文件
        let speakers = source().fetch("http://127.0.0.1:9/speakers", Some(&path)).await;
        assert_eq!(speakers.len(), 2);
        assert_eq!(speakers[1].title(), "Project Manager");
    }

    #[tokio::test]
    async fn test_fetch_returns_empty_when_both_fail() {
        let speakers = source()
            .fetch("http://127.0.0.1:9/speakers", Some(Path::new("missing/speakers.html")))
            .await;
        assert!(speakers.is_empty());
    }
}
