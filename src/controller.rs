//! Fetch lifecycle of a server-paginated, sortable, filterable list view.
//!
//! The controller is seeded with a server-rendered first page and only fetches
//! when the computed [`PageRequest`] changes or the reload token is bumped.
//! Each dispatched request is tagged with a sequence number and only the
//! response to the latest dispatch is applied.

use crate::domain::page::{Filters, PageRequest, PageResult, SortState};
use crate::fetch::{ErrorSink, FetchOutcome, PageFetcher};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, PaginationView};

/// Shown when a failure response carries no messages of its own.
pub const FALLBACK_FAILURE_MESSAGE: &str = "The list could not be loaded.";

/// Construction options for [`PaginatedListController`].
#[derive(Clone, Debug, PartialEq)]
pub struct ListOptions {
    /// Page size used when the seed page does not carry one.
    pub page_size: usize,
    /// Order sent while no sort column is active.
    pub initial_order_by: Vec<String>,
    /// Filters the seed page was rendered with.
    pub default_filters: Filters,
    /// Filters the view starts with.
    pub filters: Filters,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_ITEMS_PER_PAGE,
            initial_order_by: Vec::new(),
            default_filters: Filters::new(),
            filters: Filters::new(),
        }
    }
}

impl ListOptions {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn order_by<I, S>(mut self, order_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.initial_order_by = order_by.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the filters of the seed page and starts the view with them.
    pub fn default_filters(mut self, filters: Filters) -> Self {
        self.filters = filters.clone();
        self.default_filters = filters;
        self
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }
}

#[cfg(feature = "client")]
impl From<&crate::models::config::ClientConfig> for ListOptions {
    fn from(config: &crate::models::config::ClientConfig) -> Self {
        Self::new(config.default_page_size)
    }
}

/// Page, size and sort reported together by a table widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableChange {
    pub page: usize,
    pub page_size: usize,
    pub sort: SortState,
}

/// A dispatched request awaiting its response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    sequence: u64,
    request: PageRequest,
}

impl FetchTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }
}

/// What happened to a resolved response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Items and pagination were replaced.
    Applied,
    /// The failure messages went to the error sink; state is unchanged.
    Failed,
    /// A newer request was dispatched since; the response was dropped.
    Stale,
    /// The view was unmounted; the response was dropped.
    Detached,
}

pub struct PaginatedListController<T> {
    items: Vec<T>,
    pagination: PaginationView,
    sort: SortState,
    page_number: usize,
    page_size: usize,
    initial_order_by: Vec<String>,
    filters: Filters,
    last_issued_key: Option<String>,
    reload_token: u64,
    last_reload_token: u64,
    last_sequence: u64,
    pending: Option<u64>,
    mounted: bool,
}

impl<T> PaginatedListController<T> {
    /// Seeds the controller with a pre-fetched page without fetching.
    ///
    /// When `options.filters` differ from `options.default_filters` the page
    /// is reset to 1 and the next [`refresh`](Self::refresh) dispatches.
    ///
    /// A single initial order entry such as `"openedAt desc"` also seeds
    /// [`sort`](Self::sort), so the grid shows the column the seed page is
    /// ordered by.
    pub fn new(seed: PageResult<T>, options: ListOptions) -> Self {
        let ListOptions {
            page_size,
            initial_order_by,
            default_filters,
            filters,
        } = options;

        let page_size = if seed.page_size == 0 {
            page_size.max(1)
        } else {
            seed.page_size
        };
        let seed_request = PageRequest::new(
            seed.current_page,
            page_size,
            initial_order_by.clone(),
            default_filters,
        );
        let page_number = if filters == seed_request.extra_filters {
            seed_request.page_number
        } else {
            1
        };
        let pagination = PaginationView::from(&seed);

        Self {
            items: seed.items,
            pagination,
            sort: seed_sort(&initial_order_by),
            page_number,
            page_size,
            initial_order_by,
            filters,
            last_issued_key: Some(seed_request.key()),
            reload_token: 0,
            last_reload_token: 0,
            last_sequence: 0,
            pending: None,
            mounted: true,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pagination(&self) -> &PaginationView {
        &self.pagination
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn reload_token(&self) -> u64 {
        self.reload_token
    }

    /// True while the latest dispatched request is unresolved.
    pub fn loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The request the current page, size, sort and filters describe.
    pub fn current_request(&self) -> PageRequest {
        let order_by = match self.sort.encode() {
            Some(entry) => vec![entry],
            None => self.initial_order_by.clone(),
        };
        PageRequest::new(
            self.page_number,
            self.page_size,
            order_by,
            self.filters.clone(),
        )
    }

    pub fn set_page(&mut self, page: usize) -> Option<FetchTicket> {
        self.page_number = page.max(1);
        self.dispatch()
    }

    /// Changes the page size. The current page is kept.
    pub fn set_page_size(&mut self, page_size: usize) -> Option<FetchTicket> {
        self.page_size = page_size.max(1);
        self.dispatch()
    }

    /// Replaces the active sort column.
    pub fn set_sort(&mut self, sort: SortState) -> Option<FetchTicket> {
        self.sort = sort;
        self.dispatch()
    }

    /// Replaces the filters, going back to page 1 when they changed.
    pub fn set_filters(&mut self, filters: Filters) -> Option<FetchTicket> {
        if filters != self.filters {
            self.filters = filters;
            self.page_number = 1;
        }
        self.dispatch()
    }

    /// Applies page, size and sort together, then dispatches at most once.
    pub fn handle_table_change(&mut self, change: TableChange) -> Option<FetchTicket> {
        self.page_number = change.page.max(1);
        self.page_size = change.page_size.max(1);
        self.sort = change.sort;
        self.dispatch()
    }

    /// Adopts an externally owned reload counter.
    pub fn set_reload_token(&mut self, token: u64) -> Option<FetchTicket> {
        self.reload_token = token;
        self.dispatch()
    }

    /// Forces a refetch of the current request.
    pub fn reload(&mut self) -> Option<FetchTicket> {
        self.reload_token = self.reload_token.wrapping_add(1);
        self.dispatch()
    }

    /// Dispatches the current request unless it was the last one issued.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.dispatch()
    }

    /// Stops applying responses. Later resolutions are no-ops.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending = None;
    }

    fn dispatch(&mut self) -> Option<FetchTicket> {
        if !self.mounted {
            return None;
        }

        let request = self.current_request();
        let key = request.key();
        if self.last_issued_key.as_deref() == Some(key.as_str())
            && self.reload_token == self.last_reload_token
        {
            log::debug!("Skipping list request identical to the last one: {key}");
            return None;
        }

        self.last_issued_key = Some(key);
        self.last_reload_token = self.reload_token;
        self.last_sequence += 1;
        self.pending = Some(self.last_sequence);

        Some(FetchTicket {
            sequence: self.last_sequence,
            request,
        })
    }

    /// Reconciles the response to the request tagged `sequence`.
    pub fn resolve<S>(&mut self, sequence: u64, outcome: FetchOutcome<T>, sink: &S) -> Resolution
    where
        S: ErrorSink + ?Sized,
    {
        if !self.mounted {
            return Resolution::Detached;
        }

        if self.pending != Some(sequence) {
            log::debug!(
                "Dropping stale list response #{sequence} (latest #{})",
                self.last_sequence
            );
            return Resolution::Stale;
        }
        self.pending = None;

        match outcome {
            FetchOutcome::Page(page) => {
                self.pagination = PaginationView::from(&page);
                self.items = page.items;
                Resolution::Applied
            }
            FetchOutcome::Failure(error) if error.messages.is_empty() => {
                log::error!("List request failed without messages");
                sink.notify(&[FALLBACK_FAILURE_MESSAGE.to_string()]);
                Resolution::Failed
            }
            FetchOutcome::Failure(error) => {
                log::error!("List request failed: {}", error.messages.join("; "));
                sink.notify(&error.messages);
                Resolution::Failed
            }
        }
    }

    /// Awaits the fetch for `ticket` and resolves it.
    ///
    /// The controller stays mutably borrowed until the response arrives, so no
    /// other request can be dispatched meanwhile. Views that let the user keep
    /// paging while a fetch is in flight call the triggering operations,
    /// await [`PageFetcher::fetch_page`] for each ticket outside the borrow and
    /// hand every outcome to [`resolve`](Self::resolve); late responses then
    /// come back as [`Resolution::Stale`].
    pub async fn run<F, S>(&mut self, ticket: FetchTicket, fetcher: &F, sink: &S) -> Resolution
    where
        F: PageFetcher<Item = T> + ?Sized,
        S: ErrorSink + ?Sized,
    {
        let outcome = fetcher.fetch_page(&ticket.request).await;
        self.resolve(ticket.sequence, outcome, sink)
    }

    /// [`run`](Self::run) for the result of a triggering operation.
    pub async fn run_if<F, S>(
        &mut self,
        ticket: Option<FetchTicket>,
        fetcher: &F,
        sink: &S,
    ) -> Option<Resolution>
    where
        F: PageFetcher<Item = T> + ?Sized,
        S: ErrorSink + ?Sized,
    {
        match ticket {
            Some(ticket) => Some(self.run(ticket, fetcher, sink).await),
            None => None,
        }
    }
}

/// Sort state matching a lone initial order entry.
///
/// Only seeded when it renders back to the same entry, so the seed request
/// and the first computed request stay identical.
fn seed_sort(initial_order_by: &[String]) -> SortState {
    match initial_order_by {
        [entry] => SortState::parse(entry)
            .filter(|sort| sort.encode().as_deref() == Some(entry.as_str()))
            .unwrap_or_default(),
        _ => SortState::none(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fetch::{ErrorResponse, LogErrorSink, MockErrorSink};

    fn seeded() -> PaginatedListController<&'static str> {
        PaginatedListController::new(
            PageResult::new(vec!["a", "b"], 1, 2, 10),
            ListOptions::new(2).order_by(["openedAt desc"]),
        )
    }

    fn status(value: &str) -> Filters {
        let mut filters = Filters::new();
        filters.insert("status".into(), json!(value));
        filters
    }

    #[test]
    fn construction_does_not_dispatch() {
        let mut controller = seeded();

        assert!(!controller.loading());
        assert!(controller.refresh().is_none());
        assert_eq!(controller.items(), ["a", "b"]);
        assert_eq!(controller.pagination().total_pages, 5);
    }

    #[test]
    fn lone_initial_order_seeds_the_sort() {
        let mut controller = seeded();

        assert_eq!(controller.sort(), &SortState::descending("openedAt"));
        assert!(controller.refresh().is_none());
        assert!(!controller.loading());
    }

    #[test]
    fn ambiguous_initial_order_leaves_sort_inactive() {
        let seed = || PageResult::new(vec!["a"], 1, 2, 10);

        let several: PaginatedListController<&str> = PaginatedListController::new(
            seed(),
            ListOptions::new(2).order_by(["openedAt desc", "title asc"]),
        );
        let mut uppercase: PaginatedListController<&str> = PaginatedListController::new(
            seed(),
            ListOptions::new(2).order_by(["openedAt DESC"]),
        );

        assert!(!several.sort().is_active());
        assert!(!uppercase.sort().is_active());
        assert!(uppercase.refresh().is_none());
    }

    #[test]
    fn inactive_sort_falls_back_to_initial_order() {
        let mut controller = seeded();
        assert!(controller.set_sort(SortState::none()).is_none());
        let ticket = controller.set_page(2).expect("dispatch");

        assert_eq!(ticket.request().order_by, vec!["openedAt desc"]);
    }

    #[test]
    fn non_default_initial_filters_fetch_page_one() {
        let mut controller: PaginatedListController<&str> = PaginatedListController::new(
            PageResult::new(vec!["a"], 3, 2, 10),
            ListOptions::new(2).filters(status("open")),
        );

        let ticket = controller.refresh().expect("dispatch");

        assert_eq!(ticket.request().page_number, 1);
        assert_eq!(ticket.request().extra_filters, status("open"));
    }

    #[test]
    fn page_size_change_keeps_page() {
        let mut controller = seeded();
        controller.set_page(3);

        let ticket = controller.set_page_size(5).expect("dispatch");

        assert_eq!(ticket.request().page_number, 3);
        assert_eq!(ticket.request().page_size, 5);
    }

    #[test]
    fn table_change_dispatches_once() {
        let mut controller = seeded();

        let ticket = controller
            .handle_table_change(TableChange {
                page: 2,
                page_size: 4,
                sort: SortState::ascending("title"),
            })
            .expect("dispatch");

        assert_eq!(ticket.sequence(), 1);
        assert_eq!(ticket.request().page_number, 2);
        assert_eq!(ticket.request().page_size, 4);
        assert_eq!(ticket.request().order_by, vec!["title asc"]);
        assert!(controller.loading());
    }

    #[test]
    fn identical_filters_do_not_reset_page() {
        let mut controller = seeded();
        controller.set_page(3);

        assert!(controller.set_filters(Filters::new()).is_none());
        assert_eq!(controller.page_number(), 3);
    }

    #[test]
    fn failed_request_is_not_retried() {
        let mut controller = seeded();
        let ticket = controller.set_page(2).expect("dispatch");
        controller.resolve(
            ticket.sequence(),
            FetchOutcome::failure("boom"),
            &LogErrorSink,
        );

        assert!(controller.set_page(2).is_none());
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut controller = seeded();
        let first = controller.set_page(2).expect("dispatch");
        let second = controller.set_page(3).expect("dispatch");
        let sink = MockErrorSink::new();

        let applied = controller.resolve(
            second.sequence(),
            PageResult::new(vec!["e", "f"], 3, 2, 10).into(),
            &sink,
        );
        let stale = controller.resolve(
            first.sequence(),
            PageResult::new(vec!["c", "d"], 2, 2, 10).into(),
            &sink,
        );

        assert_eq!(applied, Resolution::Applied);
        assert_eq!(stale, Resolution::Stale);
        assert_eq!(controller.items(), ["e", "f"]);
        assert_eq!(controller.pagination().current, 3);
        assert!(!controller.loading());
    }

    #[test]
    fn stale_response_keeps_loading_for_latest() {
        let mut controller = seeded();
        let first = controller.set_page(2).expect("dispatch");
        controller.set_page(3).expect("dispatch");

        let resolution = controller.resolve(
            first.sequence(),
            PageResult::new(vec!["c", "d"], 2, 2, 10).into(),
            &LogErrorSink,
        );

        assert_eq!(resolution, Resolution::Stale);
        assert!(controller.loading());
        assert_eq!(controller.items(), ["a", "b"]);
    }

    #[test]
    fn stale_failure_is_not_reported() {
        let mut controller = seeded();
        let first = controller.set_page(2).expect("dispatch");
        controller.set_page(3).expect("dispatch");
        let mut sink = MockErrorSink::new();
        sink.expect_notify().times(0);

        let resolution = controller.resolve(
            first.sequence(),
            FetchOutcome::failure("late"),
            &sink,
        );

        assert_eq!(resolution, Resolution::Stale);
    }

    #[test]
    fn failure_goes_to_sink_unchanged() {
        let mut controller = seeded();
        let ticket = controller.set_page(2).expect("dispatch");
        let mut sink = MockErrorSink::new();
        sink.expect_notify()
            .withf(|messages: &[String]| {
                messages == ["Access denied".to_string(), "Try again".to_string()]
            })
            .times(1)
            .return_const(());

        let resolution = controller.resolve(
            ticket.sequence(),
            ErrorResponse::new(vec!["Access denied".into(), "Try again".into()]).into(),
            &sink,
        );

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(controller.items(), ["a", "b"]);
        assert!(!controller.loading());
    }

    #[test]
    fn failure_without_messages_still_notifies() {
        let mut controller = seeded();
        let ticket = controller.set_page(2).expect("dispatch");
        let mut sink = MockErrorSink::new();
        sink.expect_notify()
            .withf(|messages: &[String]| messages == [FALLBACK_FAILURE_MESSAGE.to_string()])
            .times(1)
            .return_const(());
        let outcome: FetchOutcome<&str> = ErrorResponse::new(Vec::new()).into();

        let resolution = controller.resolve(ticket.sequence(), outcome, &sink);

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(controller.items(), ["a", "b"]);
    }

    #[test]
    fn huge_server_page_number_does_not_panic() {
        let mut controller: PaginatedListController<u32> = PaginatedListController::new(
            PageResult::new(vec![1, 2], 1, 2, 10),
            ListOptions::new(2),
        );
        let ticket = controller.set_page(2).expect("dispatch");
        let page: PageResult<u32> = serde_json::from_value(json!({
            "items": [3],
            "currentPage": usize::MAX,
            "pageSize": 2,
            "totalCount": 1,
            "totalPages": 1
        }))
        .unwrap();

        let resolution = controller.resolve(ticket.sequence(), page.into(), &LogErrorSink);

        assert_eq!(resolution, Resolution::Applied);
        assert_eq!(controller.pagination().current, 1);
        assert_eq!(controller.pagination().pages, vec![Some(1)]);
    }

    #[test]
    fn response_after_unmount_is_ignored() {
        let mut controller = seeded();
        let ticket = controller.set_page(2).expect("dispatch");
        controller.unmount();

        let resolution = controller.resolve(
            ticket.sequence(),
            PageResult::new(vec!["c"], 2, 2, 10).into(),
            &LogErrorSink,
        );

        assert_eq!(resolution, Resolution::Detached);
        assert_eq!(controller.items(), ["a", "b"]);
        assert!(controller.set_page(4).is_none());
    }

    #[test]
    fn duplicate_resolution_is_stale() {
        let mut controller = seeded();
        let ticket = controller.set_page(2).expect("dispatch");

        controller.resolve(
            ticket.sequence(),
            PageResult::new(vec!["c"], 2, 2, 10).into(),
            &LogErrorSink,
        );
        let again = controller.resolve(
            ticket.sequence(),
            PageResult::new(vec!["z"], 2, 2, 10).into(),
            &LogErrorSink,
        );

        assert_eq!(again, Resolution::Stale);
        assert_eq!(controller.items(), ["c"]);
    }
}
