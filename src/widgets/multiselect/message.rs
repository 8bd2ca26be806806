// SPDX-License-Identifier: MPL-2.0

//! Messages consumed and events emitted by the multiselect widget.

use super::debounce::{DebounceTicket, DebounceTimer};
use super::option::SelectOption;
use cosmic::iced::Rectangle;

/// Input messages for [`MultiselectState::update`](super::MultiselectState::update).
///
/// The view emits most of these; the host feeds back `DebounceElapsed`,
/// `Results` and `Measured` once the corresponding work completes.
#[derive(Debug, Clone)]
pub enum MultiselectMessage {
    /// The input or the dropdown indicator was activated.
    Open,
    /// A click landed outside the dropdown.
    Dismiss,
    /// Escape was pressed while open.
    Escape,
    /// Backspace was pressed while open.
    Backspace,
    /// The query text changed.
    QueryChanged(String),
    /// A debounce timer expired.
    DebounceElapsed(DebounceTicket),
    /// A remote search completed.
    Results {
        seq: u64,
        page: usize,
        result: Result<Vec<SelectOption>, String>,
    },
    /// The results panel scrolled; relative offset in `0.0..=1.0`.
    Scrolled(f32),
    /// Request the next page explicitly.
    LoadMore,
    /// An option was picked from the dropdown.
    Select(SelectOption),
    /// A chip's remove button was pressed.
    Remove(usize),
    /// The "create new" entry was picked.
    CreateNew,
    /// Anchor and viewport bounds were measured.
    Measured { anchor: Rectangle, viewport: Rectangle },
    /// The caller replaced the selection.
    SetValue(Vec<SelectOption>),
    /// The caller's reset flag changed.
    SetReset(bool),
    /// The caller replaced the static option pool.
    SetOptions(Vec<SelectOption>),
}

/// A page fetch the host must perform with its search callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Sequence number; responses for older numbers are discarded.
    pub seq: u64,
    pub query: String,
    /// 1-indexed page.
    pub page: usize,
}

/// Outputs of the multiselect widget.
#[derive(Debug)]
pub enum MultiselectEvent {
    /// The selection changed.
    Changed {
        name: String,
        value: Vec<SelectOption>,
    },
    /// A debounce timer was armed; await it and send back `DebounceElapsed`.
    Debounce(DebounceTimer),
    /// Run the search callback and send back `Results`.
    Search(SearchRequest),
    /// The user asked to create an entry that does not exist yet.
    CreateRequested { name: String, query: String },
    /// The search callback failed.
    SearchFailed { name: String, error: String },
    /// The dropdown opened; measure its anchor and send back `Measured`.
    Measure,
}
