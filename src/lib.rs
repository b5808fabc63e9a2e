//! Reusable state controllers for the case management screens.
//!
//! [`controller::PaginatedListController`] owns the fetch lifecycle of a
//! server-paginated list, and [`forms::errors::FormErrorStore`] owns the nested
//! validation errors of a form.

pub mod controller;
pub mod domain;
pub mod fetch;
pub mod forms;
#[cfg(feature = "client")]
pub mod models;
pub mod pagination;

pub use controller::{
    FetchTicket, ListOptions, PaginatedListController, Resolution, TableChange,
};
pub use domain::page::{Filters, PageRequest, PageResult, SortDirection, SortState};
pub use fetch::{ErrorResponse, ErrorSink, FetchOutcome, LogErrorSink, PageFetcher};
pub use forms::errors::{ErrorTree, FormErrorStore};
