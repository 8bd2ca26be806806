// SPDX-License-Identifier: MPL-2.0

//! State management for the multiselect widget.

use super::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use super::message::{MultiselectEvent, MultiselectMessage, SearchRequest};
use super::option::{self, DEFAULT_DISPLAY_KEY, MultiselectError, SelectOption};
use cosmic::iced::Rectangle;
use std::time::Duration;

/// Relative scroll offset past which the next page is requested.
pub const LOAD_MORE_THRESHOLD: f32 = 0.9;

/// Natural height of the results panel.
pub const DEFAULT_PANEL_HEIGHT: f32 = 240.0;

/// Progress of the result buffer while the dropdown is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingStatus {
    /// No search performed yet.
    #[default]
    Idle,
    /// A page fetch is in flight.
    Loading,
    /// The last page returned results; more may exist.
    HasMore,
    /// The last page was empty, or results were filtered locally.
    NoMore,
}

/// Where the results panel is drawn relative to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Below,
    Above,
}

impl Placement {
    /// Picks a side given the free space around the anchor.
    pub fn choose(space_above: f32, space_below: f32, panel_height: f32) -> Self {
        if space_below >= panel_height {
            Placement::Below
        } else if space_above > space_below {
            Placement::Above
        } else {
            Placement::Below
        }
    }

    /// Picks a side from measured bounds.
    pub fn measure(anchor: Rectangle, viewport: Rectangle, panel_height: f32) -> Self {
        let space_above = anchor.y - viewport.y;
        let space_below = (viewport.y + viewport.height) - (anchor.y + anchor.height);
        Self::choose(space_above, space_below, panel_height)
    }
}

/// Dropdown state. The loading status only exists while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Closed,
    Open {
        loading: LoadingStatus,
        placement: Placement,
    },
}

/// State for one multiselect input.
///
/// Owned by the parent and passed to the [`LazyMultiselect`](super::LazyMultiselect) view.
#[derive(Debug)]
pub struct MultiselectState {
    name: String,
    display_key: String,
    placeholder: String,
    selection_limit: Option<usize>,
    options: Vec<SelectOption>,
    remote: bool,
    creatable: bool,
    disabled: bool,
    panel_height: f32,

    selected: Vec<SelectOption>,
    query: String,
    /// The last query change removed the final character. The Backspace
    /// that did it must not also pop a chip.
    query_erased: bool,
    results: Vec<SelectOption>,
    page: usize,
    dropdown: DropdownState,
    debouncer: Debouncer,
    search_seq: u64,
    reset: bool,
}

impl MultiselectState {
    /// Creates a client-side multiselect with no options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_key: DEFAULT_DISPLAY_KEY.to_string(),
            placeholder: String::new(),
            selection_limit: None,
            options: Vec::new(),
            remote: false,
            creatable: false,
            disabled: false,
            panel_height: DEFAULT_PANEL_HEIGHT,
            selected: Vec::new(),
            query: String::new(),
            query_erased: false,
            results: Vec::new(),
            page: 0,
            dropdown: DropdownState::Closed,
            debouncer: Debouncer::new(DEFAULT_DEBOUNCE),
            search_seq: 0,
            reset: false,
        }
    }

    /// Sets the record field used as the label.
    pub fn display_key(mut self, key: impl Into<String>) -> Self {
        self.display_key = key.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Caps the number of concurrent selections.
    pub fn selection_limit(mut self, limit: usize) -> Self {
        self.selection_limit = Some(limit);
        self
    }

    /// Searches through the host instead of filtering static options.
    ///
    /// Takes precedence over [`with_options`](Self::with_options).
    pub fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Offers a "create new" entry when a search finds nothing.
    pub fn creatable(mut self, creatable: bool) -> Self {
        self.creatable = creatable;
        self
    }

    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debouncer.set_delay(delay);
        self
    }

    pub fn panel_height(mut self, height: f32) -> Self {
        self.panel_height = height;
        self
    }

    /// Sets the static option pool for client-side filtering.
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Result<Self, MultiselectError> {
        option::validate_all(&options, &self.name, &self.display_key)?;
        self.options = options;
        Ok(self)
    }

    /// Sets the initial selection.
    pub fn with_value(mut self, value: Vec<SelectOption>) -> Result<Self, MultiselectError> {
        self.replace_value(value)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_key(&self) -> &str {
        &self.display_key
    }

    pub fn placeholder_text(&self) -> &str {
        &self.placeholder
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> &[SelectOption] {
        &self.selected
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn height_of_panel(&self) -> f32 {
        self.panel_height
    }

    pub fn dropdown(&self) -> DropdownState {
        self.dropdown
    }

    pub fn is_open(&self) -> bool {
        matches!(self.dropdown, DropdownState::Open { .. })
    }

    /// Loading status, or `None` while closed.
    pub fn loading_status(&self) -> Option<LoadingStatus> {
        match self.dropdown {
            DropdownState::Open { loading, .. } => Some(loading),
            DropdownState::Closed => None,
        }
    }

    pub fn placement(&self) -> Option<Placement> {
        match self.dropdown {
            DropdownState::Open { placement, .. } => Some(placement),
            DropdownState::Closed => None,
        }
    }

    /// The last requested page (1-indexed, 0 before any search).
    pub fn page(&self) -> usize {
        self.page
    }

    /// Returns true once the selection limit is reached.
    pub fn limit_reached(&self) -> bool {
        self.selection_limit
            .is_some_and(|limit| self.selected.len() >= limit)
    }

    /// Results without the options that are already selected.
    pub fn visible_options(&self) -> Vec<&SelectOption> {
        self.results
            .iter()
            .filter(|o| !option::contains(&self.selected, o, &self.display_key))
            .collect()
    }

    /// Returns true if the "create new" entry should be shown.
    pub fn offers_create(&self) -> bool {
        self.creatable && self.results.is_empty() && !self.query.is_empty()
    }

    /// Label text for an option; fails if a record lacks the display key.
    pub fn display_text(&self, option: &SelectOption) -> Result<String, MultiselectError> {
        option.display_text(&self.name, &self.display_key)
    }

    /// Changes the search delay. A pending timer keeps its old delay.
    pub fn set_debounce(&mut self, delay: Duration) {
        self.debouncer.set_delay(delay);
    }

    /// Enables or disables interaction. Disabling closes the dropdown.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.close();
        }
    }

    /// Handles a message and returns the resulting events.
    pub fn update(
        &mut self,
        message: MultiselectMessage,
    ) -> Result<Vec<MultiselectEvent>, MultiselectError> {
        match message {
            MultiselectMessage::SetValue(value) => {
                self.replace_value(value)?;
                return Ok(Vec::new());
            }
            MultiselectMessage::SetReset(flag) => return Ok(self.set_reset(flag)),
            MultiselectMessage::SetOptions(options) => return self.set_options(options),
            MultiselectMessage::Results { seq, page, result } => {
                return self.apply_results(seq, page, result);
            }
            MultiselectMessage::Measured { anchor, viewport } => {
                if let DropdownState::Open { loading, .. } = self.dropdown {
                    self.dropdown = DropdownState::Open {
                        loading,
                        placement: Placement::measure(anchor, viewport, self.panel_height),
                    };
                }
                return Ok(Vec::new());
            }
            _ => {}
        }

        if self.disabled {
            return Ok(Vec::new());
        }

        let events = match message {
            MultiselectMessage::Open => self.open(),
            MultiselectMessage::Dismiss | MultiselectMessage::Escape => {
                self.close();
                Vec::new()
            }
            MultiselectMessage::Backspace => {
                let erased = std::mem::take(&mut self.query_erased);
                if self.query.is_empty() && !erased && self.selected.pop().is_some() {
                    vec![self.changed()]
                } else {
                    Vec::new()
                }
            }
            MultiselectMessage::QueryChanged(query) => {
                let mut events = Vec::new();
                if !self.is_open() {
                    self.dropdown = DropdownState::Open {
                        loading: LoadingStatus::Idle,
                        placement: Placement::Below,
                    };
                    events.push(MultiselectEvent::Measure);
                }
                self.query_erased = !self.query.is_empty() && query.is_empty();
                self.query = query;
                events.push(MultiselectEvent::Debounce(self.debouncer.arm()));
                events
            }
            MultiselectMessage::DebounceElapsed(ticket) => {
                if self.debouncer.fire(ticket) && self.is_open() {
                    self.search_first_page()
                } else {
                    Vec::new()
                }
            }
            MultiselectMessage::Scrolled(offset) => {
                if offset >= LOAD_MORE_THRESHOLD {
                    self.load_more()
                } else {
                    Vec::new()
                }
            }
            MultiselectMessage::LoadMore => self.load_more(),
            MultiselectMessage::Select(option) => self.select(option)?,
            MultiselectMessage::Remove(index) => {
                if index < self.selected.len() {
                    self.selected.remove(index);
                    vec![self.changed()]
                } else {
                    Vec::new()
                }
            }
            MultiselectMessage::CreateNew => {
                if self.offers_create() {
                    let query = std::mem::take(&mut self.query);
                    self.results.clear();
                    self.close();
                    vec![MultiselectEvent::CreateRequested {
                        name: self.name.clone(),
                        query,
                    }]
                } else {
                    Vec::new()
                }
            }
            MultiselectMessage::SetValue(_)
            | MultiselectMessage::SetReset(_)
            | MultiselectMessage::SetOptions(_)
            | MultiselectMessage::Results { .. }
            | MultiselectMessage::Measured { .. } => Vec::new(),
        };

        Ok(events)
    }

    fn open(&mut self) -> Vec<MultiselectEvent> {
        if self.is_open() {
            return Vec::new();
        }
        self.dropdown = DropdownState::Open {
            loading: LoadingStatus::Idle,
            placement: Placement::Below,
        };
        let mut events = vec![MultiselectEvent::Measure];
        events.extend(self.search_first_page());
        events
    }

    fn close(&mut self) {
        self.debouncer.cancel();
        self.dropdown = DropdownState::Closed;
    }

    fn set_loading(&mut self, status: LoadingStatus) {
        if let DropdownState::Open { placement, .. } = self.dropdown {
            self.dropdown = DropdownState::Open {
                loading: status,
                placement,
            };
        }
    }

    /// Starts a fresh search for the current query.
    fn search_first_page(&mut self) -> Vec<MultiselectEvent> {
        self.debouncer.cancel();
        self.page = 1;
        if self.remote {
            self.set_loading(LoadingStatus::Loading);
            vec![MultiselectEvent::Search(self.next_request())]
        } else {
            self.results = self.filter_local();
            self.set_loading(LoadingStatus::NoMore);
            Vec::new()
        }
    }

    fn load_more(&mut self) -> Vec<MultiselectEvent> {
        if self.loading_status() != Some(LoadingStatus::HasMore) {
            return Vec::new();
        }
        self.page += 1;
        self.set_loading(LoadingStatus::Loading);
        vec![MultiselectEvent::Search(self.next_request())]
    }

    fn next_request(&mut self) -> SearchRequest {
        self.search_seq += 1;
        SearchRequest {
            seq: self.search_seq,
            query: self.query.clone(),
            page: self.page,
        }
    }

    fn filter_local(&self) -> Vec<SelectOption> {
        let needle = self.query.to_lowercase();
        self.options
            .iter()
            .filter(|o| {
                o.label(&self.display_key)
                    .is_some_and(|label| label.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    fn apply_results(
        &mut self,
        seq: u64,
        page: usize,
        result: Result<Vec<SelectOption>, String>,
    ) -> Result<Vec<MultiselectEvent>, MultiselectError> {
        if seq != self.search_seq || !self.is_open() {
            log::debug!("{}: discarding stale search response #{}", self.name, seq);
            return Ok(Vec::new());
        }

        match result {
            Ok(options) => {
                if let Err(err) = option::validate_all(&options, &self.name, &self.display_key) {
                    self.set_loading(LoadingStatus::NoMore);
                    return Err(err);
                }
                let status = if options.is_empty() {
                    LoadingStatus::NoMore
                } else {
                    LoadingStatus::HasMore
                };
                if page <= 1 {
                    self.results = options;
                } else {
                    self.results.extend(options);
                }
                self.set_loading(status);
                Ok(Vec::new())
            }
            Err(error) => {
                self.set_loading(LoadingStatus::NoMore);
                Ok(vec![MultiselectEvent::SearchFailed {
                    name: self.name.clone(),
                    error,
                }])
            }
        }
    }

    fn select(&mut self, option: SelectOption) -> Result<Vec<MultiselectEvent>, MultiselectError> {
        self.display_text(&option)?;
        if self.limit_reached() || option::contains(&self.selected, &option, &self.display_key) {
            return Ok(Vec::new());
        }
        self.selected.push(option);
        if self.limit_reached() {
            self.close();
        }
        Ok(vec![self.changed()])
    }

    fn replace_value(&mut self, value: Vec<SelectOption>) -> Result<(), MultiselectError> {
        option::validate_all(&value, &self.name, &self.display_key)?;
        let mut value = option::dedup(value, &self.display_key);
        if let Some(limit) = self.selection_limit {
            value.truncate(limit);
        }
        self.selected = value;
        Ok(())
    }

    fn set_options(
        &mut self,
        options: Vec<SelectOption>,
    ) -> Result<Vec<MultiselectEvent>, MultiselectError> {
        option::validate_all(&options, &self.name, &self.display_key)?;
        self.options = options;
        if !self.remote && self.is_open() {
            self.results = self.filter_local();
        }
        Ok(Vec::new())
    }

    fn set_reset(&mut self, flag: bool) -> Vec<MultiselectEvent> {
        let rising = flag && !self.reset;
        self.reset = flag;
        if !rising {
            return Vec::new();
        }
        self.close();
        self.selected.clear();
        self.query.clear();
        self.query_erased = false;
        self.results.clear();
        self.page = 0;
        vec![self.changed()]
    }

    fn changed(&self) -> MultiselectEvent {
        MultiselectEvent::Changed {
            name: self.name.clone(),
            value: self.selected.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fruits() -> MultiselectState {
        MultiselectState::new("fruit")
            .with_options(vec!["Apple".into(), "Banana".into(), "Cherry".into()])
            .unwrap()
    }

    fn author(name: &str) -> SelectOption {
        SelectOption::record([("fullName", json!(name))])
    }

    fn remote_authors() -> MultiselectState {
        MultiselectState::new("author")
            .display_key("fullName")
            .remote()
            .creatable(true)
    }

    fn changed_value(events: &[MultiselectEvent]) -> Option<&Vec<SelectOption>> {
        events.iter().find_map(|e| match e {
            MultiselectEvent::Changed { value, .. } => Some(value),
            _ => None,
        })
    }

    fn search_request(events: &[MultiselectEvent]) -> Option<SearchRequest> {
        events.iter().find_map(|e| match e {
            MultiselectEvent::Search(request) => Some(request.clone()),
            _ => None,
        })
    }

    /// Types a query and lets its debounce timer fire immediately.
    fn type_query(state: &mut MultiselectState, query: &str) -> Vec<MultiselectEvent> {
        let events = state
            .update(MultiselectMessage::QueryChanged(query.to_string()))
            .unwrap();
        let ticket = events
            .iter()
            .find_map(|e| match e {
                MultiselectEvent::Debounce(timer) => Some(timer.ticket),
                _ => None,
            })
            .expect("debounce armed");
        state
            .update(MultiselectMessage::DebounceElapsed(ticket))
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_filter_excludes_selected() {
        let mut state = fruits();
        state.update(MultiselectMessage::Open).unwrap();
        state
            .update(MultiselectMessage::Select("Apple".into()))
            .unwrap();

        type_query(&mut state, "an");

        let visible: Vec<_> = state.visible_options().into_iter().cloned().collect();
        assert_eq!(visible, vec![SelectOption::text("Banana")]);
        assert_eq!(state.loading_status(), Some(LoadingStatus::NoMore));
    }

    #[tokio::test]
    async fn test_local_filter_is_case_insensitive() {
        let mut state = fruits();
        type_query(&mut state, "CHE");
        let visible: Vec<_> = state.visible_options().into_iter().cloned().collect();
        assert_eq!(visible, vec![SelectOption::text("Cherry")]);
    }

    #[tokio::test]
    async fn test_only_latest_query_searches() {
        let mut state = remote_authors();
        let mut tickets = Vec::new();
        for query in ["a", "ab", "abc"] {
            for event in state
                .update(MultiselectMessage::QueryChanged(query.to_string()))
                .unwrap()
            {
                if let MultiselectEvent::Debounce(timer) = event {
                    tickets.push(timer.ticket);
                }
            }
        }

        let mut searches = Vec::new();
        for ticket in tickets {
            let events = state
                .update(MultiselectMessage::DebounceElapsed(ticket))
                .unwrap();
            searches.extend(search_request(&events));
        }

        assert_eq!(searches.len(), 1);
        assert_eq!(searches[0].query, "abc");
        assert_eq!(searches[0].page, 1);
    }

    #[test]
    fn test_open_searches_empty_query() {
        let mut state = remote_authors();
        let events = state.update(MultiselectMessage::Open).unwrap();
        assert!(matches!(events[0], MultiselectEvent::Measure));
        let request = search_request(&events).unwrap();
        assert_eq!(request.query, "");
        assert_eq!(request.page, 1);
        assert_eq!(state.loading_status(), Some(LoadingStatus::Loading));

        // Opening again is a no-op.
        assert!(state.update(MultiselectMessage::Open).unwrap().is_empty());
    }

    #[test]
    fn test_pagination_until_empty_page() {
        let mut state = remote_authors();
        let first = search_request(&state.update(MultiselectMessage::Open).unwrap()).unwrap();
        state
            .update(MultiselectMessage::Results {
                seq: first.seq,
                page: 1,
                result: Ok(vec![author("Ján Botto"), author("Ján Kollár")]),
            })
            .unwrap();
        assert_eq!(state.loading_status(), Some(LoadingStatus::HasMore));

        // Not near the bottom yet.
        assert!(state.update(MultiselectMessage::Scrolled(0.5)).unwrap().is_empty());

        let second =
            search_request(&state.update(MultiselectMessage::Scrolled(0.95)).unwrap()).unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(state.loading_status(), Some(LoadingStatus::Loading));

        // A second trigger while loading does nothing.
        assert!(state.update(MultiselectMessage::LoadMore).unwrap().is_empty());

        state
            .update(MultiselectMessage::Results {
                seq: second.seq,
                page: 2,
                result: Ok(vec![author("Pavol Országh")]),
            })
            .unwrap();
        assert_eq!(state.visible_options().len(), 3);

        let third = search_request(&state.update(MultiselectMessage::LoadMore).unwrap()).unwrap();
        assert_eq!(third.page, 3);
        state
            .update(MultiselectMessage::Results {
                seq: third.seq,
                page: 3,
                result: Ok(Vec::new()),
            })
            .unwrap();
        assert_eq!(state.loading_status(), Some(LoadingStatus::NoMore));
        assert!(state.update(MultiselectMessage::LoadMore).unwrap().is_empty());
        assert_eq!(state.visible_options().len(), 3);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let mut state = remote_authors();
        let slow = search_request(&type_query(&mut state, "ko")).unwrap();
        let fresh = search_request(&type_query(&mut state, "kol")).unwrap();

        state
            .update(MultiselectMessage::Results {
                seq: fresh.seq,
                page: 1,
                result: Ok(vec![author("Ján Kollár")]),
            })
            .unwrap();
        state
            .update(MultiselectMessage::Results {
                seq: slow.seq,
                page: 1,
                result: Ok(vec![author("Koloman Sokol"), author("Ján Kollár")]),
            })
            .unwrap();

        let visible: Vec<_> = state.visible_options().into_iter().cloned().collect();
        assert_eq!(visible, vec![author("Ján Kollár")]);
        assert_eq!(state.loading_status(), Some(LoadingStatus::HasMore));
    }

    #[tokio::test]
    async fn test_empty_first_page_offers_create() {
        let mut state = remote_authors();
        let request = search_request(&type_query(&mut state, "Rúfus")).unwrap();
        state
            .update(MultiselectMessage::Results {
                seq: request.seq,
                page: 1,
                result: Ok(Vec::new()),
            })
            .unwrap();

        assert_eq!(state.loading_status(), Some(LoadingStatus::NoMore));
        assert!(state.offers_create());

        let events = state.update(MultiselectMessage::CreateNew).unwrap();
        assert!(matches!(
            &events[..],
            [MultiselectEvent::CreateRequested { query, .. }] if query == "Rúfus"
        ));
        assert!(!state.is_open());
        assert_eq!(state.query(), "");
        assert!(state.selected().is_empty());
    }

    #[test]
    fn test_create_requires_handler_and_query() {
        let mut state = remote_authors().creatable(false);
        state.update(MultiselectMessage::Open).unwrap();
        assert!(!state.offers_create());
        assert!(state.update(MultiselectMessage::CreateNew).unwrap().is_empty());

        let mut state = remote_authors();
        state.update(MultiselectMessage::Open).unwrap();
        // Empty query.
        assert!(!state.offers_create());
    }

    #[test]
    fn test_search_failure_does_not_stick_in_loading() {
        let mut state = remote_authors();
        let request = search_request(&state.update(MultiselectMessage::Open).unwrap()).unwrap();
        let events = state
            .update(MultiselectMessage::Results {
                seq: request.seq,
                page: 1,
                result: Err("connection refused".to_string()),
            })
            .unwrap();
        assert_eq!(state.loading_status(), Some(LoadingStatus::NoMore));
        assert!(matches!(
            &events[..],
            [MultiselectEvent::SearchFailed { error, .. }] if error == "connection refused"
        ));
    }

    #[test]
    fn test_results_missing_display_key_fail() {
        let mut state = remote_authors();
        let request = search_request(&state.update(MultiselectMessage::Open).unwrap()).unwrap();
        let err = state
            .update(MultiselectMessage::Results {
                seq: request.seq,
                page: 1,
                result: Ok(vec![SelectOption::record([("name", json!("Botto"))])]),
            })
            .unwrap_err();
        assert!(matches!(err, MultiselectError::MissingDisplayKey { .. }));
        assert_eq!(state.loading_status(), Some(LoadingStatus::NoMore));

        assert!(
            MultiselectState::new("author")
                .display_key("fullName")
                .with_options(vec![SelectOption::record([("name", json!("x"))])])
                .is_err()
        );
    }

    #[test]
    fn test_selection_has_no_duplicates() {
        let mut state = fruits();
        let first = state.update(MultiselectMessage::Select("Apple".into())).unwrap();
        assert_eq!(changed_value(&first).unwrap().len(), 1);
        assert!(state.update(MultiselectMessage::Select("Apple".into())).unwrap().is_empty());
        state.update(MultiselectMessage::Select("Cherry".into())).unwrap();
        assert!(state.update(MultiselectMessage::Select("Apple".into())).unwrap().is_empty());
        assert_eq!(state.selected().len(), 2);

        state
            .update(MultiselectMessage::SetValue(vec![
                "Kiwi".into(),
                "Kiwi".into(),
                "Plum".into(),
            ]))
            .unwrap();
        let expected: Vec<SelectOption> = vec!["Kiwi".into(), "Plum".into()];
        assert_eq!(state.selected(), &expected[..]);
    }

    #[test]
    fn test_selection_limit() {
        let mut state = fruits().selection_limit(2);
        state.update(MultiselectMessage::Open).unwrap();
        state.update(MultiselectMessage::Select("Apple".into())).unwrap();
        assert!(state.is_open());
        state.update(MultiselectMessage::Select("Banana".into())).unwrap();
        // Reaching the limit closes the dropdown.
        assert!(!state.is_open());
        assert!(state.update(MultiselectMessage::Select("Cherry".into())).unwrap().is_empty());
        assert_eq!(state.selected().len(), 2);

        state
            .update(MultiselectMessage::SetValue(vec![
                "Apple".into(),
                "Banana".into(),
                "Cherry".into(),
            ]))
            .unwrap();
        assert_eq!(state.selected().len(), 2);
    }

    #[test]
    fn test_remove_and_backspace() {
        let mut state = fruits();
        for fruit in ["Apple", "Banana", "Cherry"] {
            state.update(MultiselectMessage::Select(fruit.into())).unwrap();
        }

        let events = state.update(MultiselectMessage::Remove(0)).unwrap();
        let expected: Vec<SelectOption> = vec!["Banana".into(), "Cherry".into()];
        assert_eq!(changed_value(&events), Some(&expected));
        assert!(state.update(MultiselectMessage::Remove(7)).unwrap().is_empty());

        let events = state.update(MultiselectMessage::Backspace).unwrap();
        let expected: Vec<SelectOption> = vec!["Banana".into()];
        assert_eq!(changed_value(&events), Some(&expected));
    }

    #[tokio::test]
    async fn test_backspace_with_query_keeps_selection() {
        let mut state = fruits();
        state.update(MultiselectMessage::Select("Apple".into())).unwrap();
        type_query(&mut state, "b");
        assert!(state.update(MultiselectMessage::Backspace).unwrap().is_empty());
        assert_eq!(state.selected().len(), 1);
    }

    #[tokio::test]
    async fn test_backspace_erasing_query_keeps_selection() {
        let mut state = fruits();
        state.update(MultiselectMessage::Select("Apple".into())).unwrap();
        type_query(&mut state, "a");

        // The input clears the query before the key itself arrives.
        type_query(&mut state, "");
        assert!(state.update(MultiselectMessage::Backspace).unwrap().is_empty());
        assert_eq!(state.selected().len(), 1);

        // The next press on the empty input removes the chip.
        type_query(&mut state, "");
        let events = state.update(MultiselectMessage::Backspace).unwrap();
        assert_eq!(changed_value(&events), Some(&Vec::new()));
    }

    #[test]
    fn test_escape_and_dismiss_keep_selection() {
        let mut state = fruits();
        state.update(MultiselectMessage::Open).unwrap();
        state.update(MultiselectMessage::Select("Cherry".into())).unwrap();
        state.update(MultiselectMessage::Escape).unwrap();
        assert_eq!(state.dropdown(), DropdownState::Closed);
        assert_eq!(state.selected().len(), 1);

        state.update(MultiselectMessage::Open).unwrap();
        state.update(MultiselectMessage::Dismiss).unwrap();
        assert!(!state.is_open());
        assert_eq!(state.loading_status(), None);
    }

    #[tokio::test]
    async fn test_reset_emits_once_per_transition() {
        let mut state = fruits();
        state.update(MultiselectMessage::Select("Apple".into())).unwrap();
        state
            .update(MultiselectMessage::QueryChanged("ch".to_string()))
            .unwrap();

        let events = state.update(MultiselectMessage::SetReset(true)).unwrap();
        assert_eq!(changed_value(&events), Some(&Vec::new()));
        assert!(state.selected().is_empty());
        assert_eq!(state.query(), "");
        assert!(!state.is_open());

        // Staying true does not emit again.
        assert!(state.update(MultiselectMessage::SetReset(true)).unwrap().is_empty());
        assert!(state.update(MultiselectMessage::SetReset(false)).unwrap().is_empty());
        let events = state.update(MultiselectMessage::SetReset(true)).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_disabled_ignores_interaction() {
        let mut state = fruits();
        state.set_disabled(true);
        assert!(state.update(MultiselectMessage::Open).unwrap().is_empty());
        assert!(state.update(MultiselectMessage::Select("Apple".into())).unwrap().is_empty());
        assert!(!state.is_open());
        assert!(state.selected().is_empty());
    }

    #[test]
    fn test_placement() {
        assert_eq!(Placement::choose(100.0, 300.0, 240.0), Placement::Below);
        assert_eq!(Placement::choose(500.0, 100.0, 240.0), Placement::Above);
        assert_eq!(Placement::choose(50.0, 100.0, 240.0), Placement::Below);

        let mut state = fruits();
        state.update(MultiselectMessage::Open).unwrap();
        let viewport = Rectangle {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        };
        let anchor = Rectangle {
            x: 10.0,
            y: 520.0,
            width: 200.0,
            height: 32.0,
        };
        state
            .update(MultiselectMessage::Measured { anchor, viewport })
            .unwrap();
        assert_eq!(state.placement(), Some(Placement::Above));
        // Placement survives loading changes.
        assert_eq!(state.loading_status(), Some(LoadingStatus::NoMore));
    }
}
