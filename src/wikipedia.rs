//! Topic source backed by the MediaWiki action API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;

use crate::error::SourceError;

const ROOT_CATEGORY: &str = "Category:Main topic classifications";
const CATEGORY_PREFIX: &str = "Category:";
const USER_AGENT: &str = concat!(
    "wiki-trivia/",
    env!("CARGO_PKG_VERSION"),
    " (terminal trivia game)"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub text: String,
}

#[async_trait]
pub trait TopicSource: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<String>, SourceError>;

    /// Summary of the article called `title`, or `None` if there is no such article.
    async fn summarize(&self, title: &str) -> Result<Option<Summary>, SourceError>;

    /// `n` distinct categories in random order.
    async fn sample(&self, n: usize) -> Result<Vec<String>, SourceError> {
        let categories = self.list_categories().await?;
        if categories.is_empty() {
            return Err(SourceError::NoCategories);
        }
        if n > categories.len() {
            return Err(SourceError::InsufficientCategories {
                requested: n,
                available: categories.len(),
            });
        }
        Ok(categories
            .choose_multiple(&mut rand::thread_rng(), n)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct CategoryMembersResponse {
    query: Option<CategoryMembersQuery>,
}

#[derive(Debug, Deserialize)]
struct CategoryMembersQuery {
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractsResponse {
    query: Option<ExtractsQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractsQuery {
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
}

pub struct WikipediaClient {
    client: Client,
    api_url: String,
    summary_sentences: usize,
}

impl WikipediaClient {
    pub fn new(api_url: impl Into<String>, summary_sentences: usize) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            summary_sentences,
        })
    }

    async fn query<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        debug!("Wikipedia query: {:?}", params);
        let response = self.client.get(self.api_url.as_str()).query(params).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TopicSource for WikipediaClient {
    async fn list_categories(&self) -> Result<Vec<String>, SourceError> {
        let response: CategoryMembersResponse = self
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "categorymembers"),
                ("cmtitle", ROOT_CATEGORY),
                ("cmtype", "subcat"),
                ("cmlimit", "500"),
            ])
            .await?;

        let mut categories: Vec<String> = response
            .query
            .map(|q| q.categorymembers)
            .unwrap_or_default()
            .into_iter()
            .map(|member| {
                member
                    .title
                    .strip_prefix(CATEGORY_PREFIX)
                    .map(str::to_string)
                    .unwrap_or(member.title)
            })
            .collect();
        categories.sort();
        categories.dedup();
        debug!("Found {} top-level categories", categories.len());
        Ok(categories)
    }

    async fn summarize(&self, title: &str) -> Result<Option<Summary>, SourceError> {
        let response: ExtractsResponse = self
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        let page = match response.query.and_then(|q| q.pages.into_iter().next()) {
            Some(page) if !page.missing => page,
            _ => {
                debug!("No article named {:?}", title);
                return Ok(None);
            }
        };

        let text = clip_sentences(page.extract.as_deref().unwrap_or(""), self.summary_sentences);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Summary {
            title: page.title,
            text,
        }))
    }
}

/// Keeps the first `sentences` sentences (split on ". ") and makes sure the result ends with a period.
pub fn clip_sentences(text: &str, sentences: usize) -> String {
    let mut clipped = text
        .trim()
        .split(". ")
        .take(sentences)
        .collect::<Vec<_>>()
        .join(". ")
        .trim()
        .to_string();
    if !clipped.is_empty() && !clipped.ends_with('.') {
        clipped.push('.');
    }
    clipped
}
