// SPDX-License-Identifier: MPL-2.0

//! Lazy-loading multiselect input.
//!
//! A chip-based picker backed either by a static option list filtered on the
//! client, or by a paginated search the host runs on its behalf. Typing is
//! debounced, out-of-order responses are discarded by sequence number, and
//! scrolling near the bottom of the results panel requests the next page.
//!
//! # Example
//!
//! ```ignore
//! use crate::widgets::multiselect::{
//!     LazyMultiselect, MultiselectEvent, MultiselectMessage, MultiselectState,
//! };
//!
//! struct AppModel {
//!     authors: MultiselectState,
//! }
//!
//! enum Message {
//!     Authors(MultiselectMessage),
//! }
//!
//! fn view(&self) -> Element<'_, Message> {
//!     LazyMultiselect::new(&self.authors, Message::Authors).into()
//! }
//!
//! fn update(&mut self, message: Message) -> Task<Message> {
//!     match message {
//!         Message::Authors(msg) => {
//!             for event in self.authors.update(msg)? {
//!                 match event {
//!                     MultiselectEvent::Debounce(timer) => {
//!                         // await timer.wait(), then send DebounceElapsed
//!                     }
//!                     MultiselectEvent::Search(request) => {
//!                         // fetch the page, then send Results
//!                     }
//!                     MultiselectEvent::Changed { value, .. } => { /* ... */ }
//!                     _ => {}
//!                 }
//!             }
//!         }
//!     }
//!     Task::none()
//! }
//! ```

mod debounce;
mod message;
mod option;
mod state;
mod widget;

pub use debounce::{DEFAULT_DEBOUNCE, DebounceTicket, DebounceTimer, Debouncer};
pub use message::{MultiselectEvent, MultiselectMessage, SearchRequest};
pub use option::{DEFAULT_DISPLAY_KEY, MultiselectError, SelectOption};
pub use state::{DropdownState, LoadingStatus, MultiselectState, Placement};
pub use widget::LazyMultiselect;
