use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

/// Most articles pulled per topic
pub const MAX_ARTICLES_PER_TOPIC: usize = 3;

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    url: Option<String>,
}

/// Anything that can turn a topic into candidate article URLs
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn article_urls(&self, topic: &str, since: NaiveDate) -> Result<Vec<String>>;
}

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn article_urls(&self, topic: &str, since: NaiveDate) -> Result<Vec<String>> {
        let query = format!("AI AND {}", topic);
        let url = format!(
            "{}/v2/everything?q={}&from={}&sortBy=publishedAt&apiKey={}",
            self.base_url,
            urlencoding::encode(&query),
            since.format("%Y-%m-%d"),
            urlencoding::encode(&self.api_key)
        );

        // The request URL carries the API key, so it is stripped from errors.
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to fetch news from NewsAPI")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("NewsAPI returned error: {} - {}", status, error_text);
        }

        let news_response = response
            .json::<NewsApiResponse>()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse NewsAPI response")?;

        Ok(news_response
            .articles
            .into_iter()
            .take(MAX_ARTICLES_PER_TOPIC)
            .filter_map(|article| article.url)
            .collect())
    }
}

/// The day before today, in local time
pub fn yesterday() -> NaiveDate {
    Local::now().date_naive() - Duration::days(1)
}

/// Look up article URLs for every topic, in order.
///
/// A topic whose lookup fails is left out and the rest continue.
pub async fn retrieve_article_urls(
    source: &dyn NewsSource,
    topics: &[String],
    since: NaiveDate,
) -> Vec<(String, Vec<String>)> {
    let mut results = Vec::with_capacity(topics.len());

    for topic in topics {
        match source.article_urls(topic, since).await {
            Ok(mut urls) => {
                urls.truncate(MAX_ARTICLES_PER_TOPIC);
                results.push((topic.clone(), urls));
            }
            Err(e) => {
                warn!(topic = %topic, error = %format!("{:#}", e), "Failed to fetch news for topic");
            }
        }
    }

    results
}
