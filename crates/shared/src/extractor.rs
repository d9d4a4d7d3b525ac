use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

/// Downloads a page and pulls out its readable text
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// `Ok(None)` means the page was fetched but had no usable text.
    async fn fetch_article_text(&self, url: &str) -> Result<Option<String>>;
}

pub struct ContentExtractor {
    client: Client,
}

impl ContentExtractor {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; AiNewsPodcast/1.0)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleSource for ContentExtractor {
    async fn fetch_article_text(&self, url: &str) -> Result<Option<String>> {
        let parsed = url::Url::parse(url).with_context(|| format!("Invalid article URL: {}", url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let html = response.text().await.context("Failed to read response body")?;

        let text = extract_main_text(&html);
        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(text))
    }
}

/// Best-effort main body text of an HTML document.
///
/// Paragraphs inside `<article>` win, then every `<p>` in the page, then a
/// plain-text rendering of the whole document.
pub fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for selector in ["article p", "p"] {
        if let Ok(selector) = Selector::parse(selector) {
            let paragraphs: Vec<String> = document
                .select(&selector)
                .map(|p| normalize_whitespace(&p.text().collect::<String>()))
                .filter(|p| !p.is_empty())
                .collect();

            if !paragraphs.is_empty() {
                return paragraphs.join("\n\n");
            }
        }
    }

    html2text::from_read(html.as_bytes(), 100).trim().to_string()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
