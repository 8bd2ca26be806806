// SPDX-License-Identifier: MPL-2.0

//! Field kinds and filter value encoding.

use crate::widgets::multiselect::SelectOption;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

const MULTISELECT_FIELDS: &[&str] = &[
    "author",
    "editor",
    "translator",
    "illustrator",
    "owner",
    "readBy",
    "language",
];

const TEXT_FIELDS: &[&str] = &[
    "title",
    "subtitle",
    "content",
    "isbn",
    "note",
    "location",
    "publisher",
    "edition",
    "serie",
];

const NUMERIC_FIELDS: &[&str] = &[
    "height",
    "width",
    "depth",
    "weight",
    "numberOfPages",
    "publishedYear",
];

const BOOLEAN_FIELDS: &[&str] = &["exLibris"];

/// Fields whose options are people records labeled by full name.
const PERSON_FIELDS: &[&str] = &[
    "author",
    "editor",
    "translator",
    "illustrator",
    "owner",
    "readBy",
];

/// Distinct observed values per field, as returned by the aggregation endpoint.
pub type FieldValues = BTreeMap<String, Vec<SelectOption>>;

/// Consolidated filter state, keyed by field name.
pub type FilterValue = BTreeMap<String, FilterEntry>;

/// One field's filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterEntry {
    Options(Vec<SelectOption>),
    Text(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A field key matches none of the known kinds.
    #[error("filter field '{0}' has no known kind")]
    UnknownField(String),
}

/// Which control renders for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    MultiSelect,
    Text,
    Numeric,
    Boolean,
}

impl FieldKind {
    /// Classifies a field key.
    pub fn classify(field: &str) -> Result<Self, FilterError> {
        if MULTISELECT_FIELDS.contains(&field) {
            Ok(FieldKind::MultiSelect)
        } else if TEXT_FIELDS.contains(&field) {
            Ok(FieldKind::Text)
        } else if NUMERIC_FIELDS.contains(&field) {
            Ok(FieldKind::Numeric)
        } else if BOOLEAN_FIELDS.contains(&field) {
            Ok(FieldKind::Boolean)
        } else {
            Err(FilterError::UnknownField(field.to_string()))
        }
    }
}

/// Record key used to label a multiselect field's options.
pub fn display_key_for(field: &str) -> &'static str {
    if PERSON_FIELDS.contains(&field) {
        "fullName"
    } else {
        crate::widgets::multiselect::DEFAULT_DISPLAY_KEY
    }
}

/// A visible filter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
}

/// Comparison operator of a numeric filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericOperator {
    #[default]
    Equal,
    Greater,
    Less,
    NotEqual,
}

impl NumericOperator {
    pub const ALL: [NumericOperator; 4] = [
        NumericOperator::Equal,
        NumericOperator::Greater,
        NumericOperator::Less,
        NumericOperator::NotEqual,
    ];

    pub fn symbol(self) -> char {
        match self {
            NumericOperator::Equal => '=',
            NumericOperator::Greater => '>',
            NumericOperator::Less => '<',
            NumericOperator::NotEqual => '≠',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

/// Splits an encoded numeric filter into operator and number text.
///
/// A missing operator prefix yields `None` and the whole string as number.
pub fn decode_numeric(encoded: &str) -> (Option<NumericOperator>, &str) {
    let mut chars = encoded.chars();
    match chars.next().and_then(NumericOperator::from_symbol) {
        Some(op) => (Some(op), chars.as_str()),
        None => (None, encoded),
    }
}

/// Encodes a numeric filter as operator symbol followed by the number text.
pub fn encode_numeric(operator: NumericOperator, number: &str) -> String {
    format!("{}{}", operator.symbol(), number)
}

/// Three-way selector for boolean fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ternary {
    #[default]
    Unset,
    Yes,
    No,
}

impl Ternary {
    pub const ALL: [Ternary; 3] = [Ternary::Unset, Ternary::Yes, Ternary::No];

    /// Filter string; the empty string when unset.
    pub fn as_filter(self) -> &'static str {
        match self {
            Ternary::Unset => "",
            Ternary::Yes => "Áno",
            Ternary::No => "Nie",
        }
    }

    pub fn from_filter(value: &str) -> Self {
        match value {
            "Áno" => Ternary::Yes,
            "Nie" => Ternary::No,
            _ => Ternary::Unset,
        }
    }
}
