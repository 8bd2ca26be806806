// SPDX-License-Identifier: MPL-2.0

//! Messages consumed and events emitted by the filter row.

use super::field::{FilterValue, NumericOperator, Ternary};
use crate::widgets::multiselect::{MultiselectEvent, MultiselectMessage};

#[derive(Debug, Clone)]
pub enum FilterRowMessage {
    /// Forwarded to the multiselect of a field.
    Multiselect {
        field: String,
        message: MultiselectMessage,
    },
    TextChanged {
        field: String,
        value: String,
    },
    OperatorChanged {
        field: String,
        operator: NumericOperator,
    },
    NumberChanged {
        field: String,
        value: String,
    },
    TernaryChanged {
        field: String,
        value: Ternary,
    },
    /// Clears every filter.
    Clear,
}

#[derive(Debug)]
pub enum FilterRowEvent {
    /// The consolidated filter mapping changed.
    FiltersChanged(FilterValue),
    /// A multiselect needs the host (timers, measuring, error reporting).
    Multiselect {
        field: String,
        event: MultiselectEvent,
    },
}
