use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::page::{
    document::{Document, HIDDEN_CLASS},
    error::PageError,
};

/// One batch from a load-more endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardPage {
    /// Rendered card markup, appended as-is.
    pub cards: String,
    pub has_more: bool,
}

pub trait CardSource {
    fn fetch(&self, offset: usize) -> Result<CardPage, PageError>;
}

/// `GET <endpoint>?offset=N` returning [`CardPage`] JSON.
pub struct HttpCardSource {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

impl HttpCardSource {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, PageError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| PageError::Config(format!("load-more endpoint '{}': {}", endpoint, e)))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PageError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client, endpoint })
    }
}

impl CardSource for HttpCardSource {
    fn fetch(&self, offset: usize) -> Result<CardPage, PageError> {
        let endpoint = self.endpoint.to_string();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("offset", offset)])
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .map_err(|e| PageError::Transport {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Http {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| PageError::Transport {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| PageError::JsonParse {
            context: format!("cards from {}", endpoint),
            source: e,
        })
    }
}

/// "Load more" button state over a card list.
#[derive(Debug, Clone)]
pub struct LoadMorePager {
    pub container_id: String,
    pub trigger_id: String,
    pub page_size: usize,
    offset: usize,
    has_more: bool,
}

impl LoadMorePager {
    /// `initial_offset` is the number of cards rendered with the page.
    pub fn new(
        container_id: &str,
        trigger_id: &str,
        page_size: usize,
        initial_offset: usize,
    ) -> Self {
        Self {
            container_id: container_id.to_string(),
            trigger_id: trigger_id.to_string(),
            page_size,
            offset: initial_offset,
            has_more: true,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Fetch the next batch into the container. `Ok(false)` once exhausted.
    /// A failed fetch leaves offset and markup untouched.
    pub fn load_next(
        &mut self,
        doc: &mut Document,
        source: &dyn CardSource,
    ) -> Result<bool, PageError> {
        if !self.has_more {
            return Ok(false);
        }
        doc.require(&self.container_id, "load more container")?;

        let page = source.fetch(self.offset)?;
        debug!(offset = self.offset, has_more = page.has_more, "cards loaded");

        doc.require_mut(&self.container_id, "load more container")?
            .text
            .push_str(&page.cards);
        self.offset += self.page_size;
        self.has_more = page.has_more;

        if !self.has_more {
            if let Some(trigger) = doc.get_mut(&self.trigger_id) {
                trigger.add_class(HIDDEN_CLASS);
            }
        }
        Ok(true)
    }
}
