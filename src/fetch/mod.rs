//! Seams between the list controller and the outside world.
//!
//! A [`PageFetcher`] turns a [`PageRequest`] into a [`FetchOutcome`]; an
//! [`ErrorSink`] receives the messages of failed fetches.

use async_trait::async_trait;
use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::page::{PageRequest, PageResult};

#[cfg(feature = "client")]
pub mod rest;

/// Failure body returned by the remote API. It never carries `items`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub is_success: bool,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ErrorResponse {
    pub fn new(messages: Vec<String>) -> Self {
        Self {
            is_success: false,
            messages,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(vec![message.into()])
    }
}

/// Result of one fetch, told apart by the presence of `items`.
///
/// A body with `items` must decode as a full page; it never falls back to a
/// failure.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FetchOutcome<T> {
    Page(PageResult<T>),
    Failure(ErrorResponse),
}

impl<'de, T> Deserialize<'de> for FetchOutcome<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let body = Value::deserialize(deserializer)?;
        let has_items = match &body {
            Value::Object(fields) => fields.contains_key("items"),
            other => {
                return Err(D::Error::custom(format!(
                    "expected a page or an error object, found {other}"
                )));
            }
        };

        if has_items {
            serde_json::from_value(body)
                .map(FetchOutcome::Page)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(body)
                .map(FetchOutcome::Failure)
                .map_err(D::Error::custom)
        }
    }
}

impl<T> FetchOutcome<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        FetchOutcome::Failure(ErrorResponse::message(message))
    }

    pub fn is_page(&self) -> bool {
        matches!(self, FetchOutcome::Page(_))
    }
}

impl<T> From<PageResult<T>> for FetchOutcome<T> {
    fn from(page: PageResult<T>) -> Self {
        FetchOutcome::Page(page)
    }
}

impl<T> From<ErrorResponse> for FetchOutcome<T> {
    fn from(error: ErrorResponse) -> Self {
        FetchOutcome::Failure(error)
    }
}

/// Asynchronous source of list pages.
///
/// Retries, if any, belong to the implementation; the controller calls it once
/// per dispatched request.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, request: &PageRequest) -> FetchOutcome<Self::Item>;
}

/// Receives user-visible messages of failed fetches.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorSink {
    fn notify(&self, messages: &[String]);
}

impl<F> ErrorSink for F
where
    F: Fn(&[String]),
{
    fn notify(&self, messages: &[String]) {
        self(messages)
    }
}

/// Sink that writes every message to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn notify(&self, messages: &[String]) {
        for message in messages {
            log::warn!("List fetch failed: {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_page_when_items_present() {
        let body = json!({
            "items": ["a", "b"],
            "currentPage": 1,
            "pageSize": 2,
            "totalCount": 4,
            "totalPages": 2,
            "hasPreviousPage": false,
            "hasNextPage": true
        });

        let outcome: FetchOutcome<String> = serde_json::from_value(body).unwrap();

        match outcome {
            FetchOutcome::Page(page) => {
                assert_eq!(page.items, vec!["a", "b"]);
                assert!(page.has_next_page);
            }
            FetchOutcome::Failure(_) => panic!("expected a page"),
        }
    }

    #[test]
    fn decodes_failure_when_items_absent() {
        let body = json!({"isSuccess": false, "messages": ["Case not found"]});

        let outcome: FetchOutcome<String> = serde_json::from_value(body).unwrap();

        assert_eq!(
            outcome,
            FetchOutcome::Failure(ErrorResponse::message("Case not found"))
        );
    }

    #[test]
    fn malformed_page_is_a_decode_error() {
        let body = json!({"items": [1, 2], "currentPage": 1});

        let result = serde_json::from_value::<FetchOutcome<u32>>(body);

        assert!(result.is_err());
    }

    #[test]
    fn items_of_the_wrong_type_are_a_decode_error() {
        let body = json!({
            "items": [{"id": 1}],
            "currentPage": 1,
            "pageSize": 1,
            "totalCount": 1,
            "totalPages": 1
        });

        assert!(serde_json::from_value::<FetchOutcome<u32>>(body).is_err());
    }

    #[test]
    fn empty_object_is_a_failure_without_messages() {
        let outcome: FetchOutcome<u32> = serde_json::from_value(json!({})).unwrap();

        assert_eq!(outcome, FetchOutcome::Failure(ErrorResponse::new(vec![])));
    }

    #[test]
    fn non_object_body_is_a_decode_error() {
        assert!(serde_json::from_value::<FetchOutcome<u32>>(json!([1, 2])).is_err());
        assert!(serde_json::from_value::<FetchOutcome<u32>>(json!("oops")).is_err());
    }

    #[test]
    fn closures_are_sinks() {
        let seen = RefCell::new(Vec::new());
        let sink = |messages: &[String]| seen.borrow_mut().extend_from_slice(messages);

        sink.notify(&["boom".to_string()]);

        assert_eq!(seen.into_inner(), vec!["boom".to_string()]);
    }
}
