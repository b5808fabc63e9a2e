//! Page requests, page results and the single-column sort state.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque filter values keyed by name.
///
/// Kept ordered so that two equal filter sets always serialize identically.
pub type Filters = BTreeMap<String, Value>;

/// Direction of the active sort column.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Wire token used inside an `orderBy` entry.
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Parses `asc` / `desc` (and the long grid spellings), case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascend" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descend" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-column sort. Active only when both parts are present.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SortState {
    pub field: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: Some(field.into()),
            direction: Some(direction),
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// No active sort column.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active().is_some()
    }

    fn active(&self) -> Option<(&str, SortDirection)> {
        match (self.field.as_deref(), self.direction) {
            (Some(field), Some(direction)) if !field.is_empty() => Some((field, direction)),
            _ => None,
        }
    }

    /// Renders the sort as an `orderBy` entry, e.g. `"title asc"`.
    pub fn encode(&self) -> Option<String> {
        self.active()
            .map(|(field, direction)| format!("{field} {direction}"))
    }

    /// Parses an `orderBy` entry such as `"createdAt desc"`.
    pub fn parse(entry: &str) -> Option<Self> {
        let (field, direction) = entry.trim().rsplit_once(' ')?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self::new(field, SortDirection::parse(direction)?))
    }
}

/// Normalized description of which page, sort and filters to fetch.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_number: usize,
    pub page_size: usize,
    #[serde(default)]
    pub order_by: Vec<String>,
    #[serde(default)]
    pub extra_filters: Filters,
}

impl PageRequest {
    /// Builds a request, lifting a zero page number or size to 1.
    pub fn new(
        page_number: usize,
        page_size: usize,
        order_by: Vec<String>,
        extra_filters: Filters,
    ) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.max(1),
            order_by,
            extra_filters,
        }
    }

    /// Canonical serialization used to compare requests.
    pub fn key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }

    /// URL query pairs for the remote list endpoint.
    ///
    /// `orderBy` repeats once per entry. String filters are sent bare, other
    /// values as JSON and `null` filters are skipped.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("pageNumber".to_string(), self.page_number.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        pairs.extend(
            self.order_by
                .iter()
                .map(|entry| ("orderBy".to_string(), entry.clone())),
        );
        for (name, value) in &self.extra_filters {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pairs.push((name.clone(), rendered));
        }
        pairs
    }
}

/// A fetched page of items plus pagination metadata.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    #[serde(default)]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
}

impl<T> PageResult<T> {
    /// Builds a page and derives the page count and neighbour flags.
    pub fn new(items: Vec<T>, current_page: usize, page_size: usize, total_count: usize) -> Self {
        let current_page = current_page.max(1);
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size);

        Self {
            items,
            current_page,
            page_size,
            total_count,
            total_pages,
            has_previous_page: current_page > 1,
            has_next_page: current_page < total_pages,
        }
    }

    /// An empty first page.
    pub fn empty(page_size: usize) -> Self {
        Self::new(Vec::new(), 1, page_size, 0)
    }
}
