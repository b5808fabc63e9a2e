#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use case_desk::{FetchOutcome, PageFetcher, PageRequest, PageResult};

pub const TOTAL_CASES: usize = 95;

#[derive(Clone, Debug, PartialEq)]
pub struct CaseRow {
    pub id: usize,
    pub title: String,
}

/// Rows a server would return for `page` of size `page_size`.
pub fn rows(page: usize, page_size: usize) -> Vec<CaseRow> {
    let start = (page - 1) * page_size + 1;
    let end = (start + page_size).min(TOTAL_CASES + 1);
    (start..end)
        .map(|id| CaseRow {
            id,
            title: format!("Case #{id}"),
        })
        .collect()
}

pub fn page(page: usize, page_size: usize) -> PageResult<CaseRow> {
    PageResult::new(rows(page, page_size), page, page_size, TOTAL_CASES)
}

/// Fetcher that records every request and replays queued outcomes.
///
/// With nothing queued it answers with the requested page.
#[derive(Default)]
pub struct ScriptedFetcher {
    calls: Mutex<Vec<PageRequest>>,
    queued: Mutex<VecDeque<FetchOutcome<CaseRow>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, outcome: FetchOutcome<CaseRow>) {
        self.queued.lock().unwrap().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<PageRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    type Item = CaseRow;

    async fn fetch_page(&self, request: &PageRequest) -> FetchOutcome<CaseRow> {
        self.calls.lock().unwrap().push(request.clone());
        let queued = self.queued.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| page(request.page_number, request.page_size).into())
    }
}
