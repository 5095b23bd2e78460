use crate::{Page, Result, SyncConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use modsync_protocol::{decode_ndjson, format_since, EntryFilter};
use std::sync::Arc;

/// Source of index pages.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Fetch the records at or after `since`, filtered by `prefix`.
    async fn fetch(&self, prefix: &str, since: DateTime<Utc>) -> Result<Page>;
}

#[async_trait]
impl<T: Indexer + ?Sized> Indexer for Arc<T> {
    async fn fetch(&self, prefix: &str, since: DateTime<Utc>) -> Result<Page> {
        (**self).fetch(prefix, since).await
    }
}

/// HTTP client for an index that speaks `GET <url>?since=<RFC3339>`.
#[derive(Clone, Debug)]
pub struct IndexClient {
    http: reqwest::Client,
    index_url: String,
    page_limit: Option<u32>,
}

impl IndexClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("modsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            index_url: config.index_url.trim().to_string(),
            page_limit: config.page_limit,
        })
    }

    #[must_use]
    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    fn query(&self, since: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let mut query = vec![("since", format_since(since))];
        if let Some(limit) = self.page_limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

#[async_trait]
impl Indexer for IndexClient {
    async fn fetch(&self, prefix: &str, since: DateTime<Utc>) -> Result<Page> {
        let body = self
            .http
            .get(&self.index_url)
            .query(&self.query(since))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let records = decode_ndjson(&body)?;
        let page = Page::from_records(records, &EntryFilter::new(prefix));
        debug!(
            "index page since {}: {} records, {} kept",
            format_since(since),
            page.records,
            page.entries.len()
        );
        Ok(page)
    }
}
