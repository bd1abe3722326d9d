//! Provider-agnostic pagination.
//!
//! A [`PageSource`] knows how to fetch one page for a cursor. [`Paginator`]
//! owns the cursor and decides when to stop, so the termination rules live
//! in one place for every provider.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

/// Position of the next page to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    Start,
    /// 1-based page number.
    Page(u32),
    /// Continuation token handed out by the provider.
    Token(String),
}

/// One page of raw records. `next` is `None` once the provider reports exhaustion.
#[derive(Debug)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub next: Option<Cursor>,
}

#[async_trait]
pub trait PageSource: Send + Sync {
    type Record: Send;

    fn page_size(&self) -> usize;
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<Self::Record>>;
}

/// Walks a [`PageSource`] one page at a time. Not restartable: once it
/// returns `None` or an error, build a new one.
pub struct Paginator<S: PageSource> {
    source: S,
    cursor: Option<Cursor>,
    requests: usize,
    max_pages: usize,
    truncated: bool,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S, max_pages: usize) -> Self {
        Self {
            source,
            cursor: Some(Cursor::Start),
            requests: 0,
            max_pages,
            truncated: false,
        }
    }

    /// Number of page requests issued so far.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// True when the walk stopped while the provider still offered more pages.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub async fn next_page(&mut self) -> Result<Option<Vec<S::Record>>> {
        let Some(cursor) = self.cursor.take() else {
            return Ok(None);
        };
        if self.requests >= self.max_pages {
            self.truncated = true;
            warn!(
                max_pages = self.max_pages,
                "Stopping pagination at the page limit; results may be incomplete"
            );
            return Ok(None);
        }

        let page = self.source.fetch_page(&cursor).await?;
        self.requests += 1;

        let short = page.records.len() < self.source.page_size();
        debug!(?cursor, records = page.records.len(), short, "Fetched page");
        // A short page ends the walk even if the provider offered a cursor.
        if short && page.next.is_some() {
            warn!(
                records = page.records.len(),
                page_size = self.source.page_size(),
                "Short page came with a continuation cursor; stopping, results may be incomplete"
            );
            self.truncated = true;
        }
        self.cursor = if short { None } else { page.next };

        Ok(Some(page.records))
    }

    pub async fn collect_all(mut self) -> Result<Vec<S::Record>> {
        let mut all = Vec::new();
        while let Some(records) = self.next_page().await? {
            all.extend(records);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use reqwest::StatusCode;

    use super::*;
    use crate::error::RecapError;

    /// Serves canned pages and records every cursor it was asked for.
    struct MockSource {
        pages: Vec<Vec<u32>>,
        page_size: usize,
        tokens: bool,
        fail_at: Option<usize>,
        seen: Arc<Mutex<Vec<Cursor>>>,
    }

    impl MockSource {
        fn new(pages: Vec<Vec<u32>>, page_size: usize) -> Self {
            Self {
                pages,
                page_size,
                tokens: false,
                fail_at: None,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn with_tokens(mut self) -> Self {
            self.tokens = true;
            self
        }

        fn failing_at(mut self, index: usize) -> Self {
            self.fail_at = Some(index);
            self
        }

        fn index_of(cursor: &Cursor) -> usize {
            match cursor {
                Cursor::Start => 0,
                Cursor::Page(n) => *n as usize - 1,
                Cursor::Token(t) => t.trim_start_matches("tok-").parse().unwrap(),
            }
        }
    }

    #[async_trait]
    impl PageSource for MockSource {
        type Record = u32;

        fn page_size(&self) -> usize {
            self.page_size
        }

        async fn fetch_page(&self, cursor: &Cursor) -> Result<Page<u32>> {
            self.seen.lock().unwrap().push(cursor.clone());
            let index = Self::index_of(cursor);
            if self.fail_at == Some(index) {
                return Err(RecapError::Authentication {
                    provider: "Mock".into(),
                    status: StatusCode::UNAUTHORIZED,
                    body: String::new(),
                });
            }
            let records = self.pages.get(index).cloned().unwrap_or_default();
            let next = if index + 1 < self.pages.len() {
                Some(if self.tokens {
                    Cursor::Token(format!("tok-{}", index + 1))
                } else {
                    Cursor::Page(index as u32 + 2)
                })
            } else {
                None
            };
            Ok(Page { records, next })
        }
    }

    fn full_pages(n: usize, size: usize) -> Vec<Vec<u32>> {
        (0..n)
            .map(|p| (0..size).map(|i| (p * size + i) as u32).collect())
            .collect()
    }

    #[tokio::test]
    async fn full_pages_then_empty_page_takes_n_plus_one_requests() {
        let mut pages = full_pages(3, 4);
        pages.push(vec![]);
        let source = MockSource::new(pages, 4);
        let seen = source.seen.clone();

        let mut paginator = Paginator::new(source, 100);
        let mut all = Vec::new();
        while let Some(records) = paginator.next_page().await.unwrap() {
            all.extend(records);
        }

        assert_eq!(all, (0..12).collect::<Vec<u32>>());
        assert_eq!(paginator.requests(), 4);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Cursor::Start, Cursor::Page(2), Cursor::Page(3), Cursor::Page(4)]
        );
    }

    #[tokio::test]
    async fn short_page_stops_even_when_a_cursor_is_offered() {
        let pages = vec![vec![1, 2, 3], vec![4], vec![5, 6, 7]];
        let source = MockSource::new(pages, 3);
        let seen = source.seen.clone();

        let all = Paginator::new(source, 100).collect_all().await.unwrap();

        assert_eq!(all, vec![1, 2, 3, 4]);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn short_page_with_cursor_is_flagged_as_truncated() {
        let pages = vec![vec![1, 2, 3], vec![4], vec![5, 6, 7]];
        let mut paginator = Paginator::new(MockSource::new(pages, 3).with_tokens(), 100);

        while paginator.next_page().await.unwrap().is_some() {}

        assert!(paginator.truncated());
        assert_eq!(paginator.requests(), 2);
    }

    #[tokio::test]
    async fn natural_exhaustion_is_not_truncated() {
        let mut pages = full_pages(2, 2);
        pages.push(vec![]);
        let mut paginator = Paginator::new(MockSource::new(pages, 2), 100);

        while paginator.next_page().await.unwrap().is_some() {}

        assert!(!paginator.truncated());
        assert_eq!(paginator.requests(), 3);
    }

    #[tokio::test]
    async fn token_exhaustion_stops() {
        let source = MockSource::new(full_pages(2, 2), 2).with_tokens();
        let seen = source.seen.clone();

        let all = Paginator::new(source, 100).collect_all().await.unwrap();

        assert_eq!(all, vec![0, 1, 2, 3]);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[Cursor::Start, Cursor::Token("tok-1".into())]
        );
    }

    #[tokio::test]
    async fn page_limit_bounds_requests() {
        let source = MockSource::new(full_pages(10, 2), 2);
        let seen = source.seen.clone();

        let all = Paginator::new(source, 3).collect_all().await.unwrap();

        assert_eq!(all.len(), 6);
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn error_aborts_and_paginator_stays_exhausted() {
        let source = MockSource::new(full_pages(3, 2), 2).failing_at(1);
        let seen = source.seen.clone();
        let mut paginator = Paginator::new(source, 100);

        assert_eq!(paginator.next_page().await.unwrap(), Some(vec![0, 1]));
        let err = paginator.next_page().await.unwrap_err();
        assert!(matches!(err, RecapError::Authentication { .. }));
        assert_eq!(paginator.next_page().await.unwrap(), None);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
