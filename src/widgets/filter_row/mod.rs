// SPDX-License-Identifier: MPL-2.0

//! Filter row for the book table.
//!
//! One typed control per visible column: a multiselect for fields with a
//! closed set of values, a text input, an operator plus number for numeric
//! fields, and a three-way selector for boolean fields. Every change emits
//! the full consolidated [`FilterValue`]; input that leaves it unchanged
//! emits nothing.
//!
//! # Example
//!
//! ```ignore
//! use crate::widgets::filter_row::{FilterRow, FilterRowEvent, FilterRowState};
//!
//! let mut filters = FilterRowState::new(columns);
//! filters.begin_loading();
//! // ...once the aggregation endpoint answers. Selections are kept, and
//! // entries of fields that vanished are dropped:
//! if let Some(FilterRowEvent::FiltersChanged(value)) = filters.values_loaded(result)? {
//!     // reload the table from page 1
//! }
//!
//! // In view:
//! FilterRow::new(&filters, Message::Filters).into()
//!
//! // In update:
//! for event in filters.update(msg)? {
//!     if let FilterRowEvent::FiltersChanged(value) = event {
//!         // reload the table from page 1
//!     }
//! }
//! ```

mod field;
mod message;
mod state;
mod widget;

pub use field::{
    FieldKind, FieldValues, FilterEntry, FilterError, FilterField, FilterValue, NumericOperator,
    Ternary, display_key_for,
};
pub use message::{FilterRowEvent, FilterRowMessage};
pub use state::FilterRowState;
pub use widget::{FilterRow, anchor_id};
