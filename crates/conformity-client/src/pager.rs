//! Lazy reader for paginated collection endpoints.
//!
//! The Conformity checks endpoint pages with zero-based `page[number]` and
//! `page[size]` parameters and reports the collection size in `meta.total`.
//! The pager pulls one page at a time, so a caller that only wants a few
//! items never fetches the whole collection.

use std::collections::VecDeque;

use serde_json::Value;

use crate::client::ConformityClient;
use crate::error::ApiResult;

const PAGE_SIZE_MAX: u64 = 100;

pub struct CollectionPager {
    client: ConformityClient,
    path: String,
    params: Vec<(String, String)>,
    /// 0 = unlimited.
    limit: usize,
    page_size: u64,
    page_number: u64,
    buffer: VecDeque<Value>,
    fetched: u64,
    yielded: usize,
    done: bool,
}

impl CollectionPager {
    pub(crate) fn new(
        client: ConformityClient,
        path: String,
        params: Vec<(String, String)>,
        limit: usize,
    ) -> Self {
        // A small limit shrinks the page size so one request suffices.
        let page_size = if limit > 0 && (limit as u64) < PAGE_SIZE_MAX {
            limit as u64
        } else {
            PAGE_SIZE_MAX
        };
        Self {
            client,
            path,
            params,
            limit,
            page_size,
            page_number: 0,
            buffer: VecDeque::new(),
            fetched: 0,
            yielded: 0,
            done: false,
        }
    }

    /// The next item, or `None` when the collection (or the limit) is
    /// exhausted.
    pub async fn try_next(&mut self) -> ApiResult<Option<Value>> {
        if self.limit > 0 && self.yielded >= self.limit {
            return Ok(None);
        }
        if self.buffer.is_empty() {
            if self.done {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
        let item = self.buffer.pop_front();
        if item.is_some() {
            self.yielded += 1;
        }
        Ok(item)
    }

    /// Drain the remaining items into a vector.
    pub async fn collect_all(mut self) -> ApiResult<Vec<Value>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    async fn fetch_next_page(&mut self) -> ApiResult<()> {
        let page = self
            .client
            .fetch_collection_page(&self.path, &self.params, self.page_number, self.page_size)
            .await?;
        let count = page.data.len() as u64;
        self.fetched += count;
        if count < self.page_size || self.fetched >= page.meta.total {
            self.done = true;
        }
        self.buffer.extend(page.data);
        self.page_number += 1;
        Ok(())
    }
}
