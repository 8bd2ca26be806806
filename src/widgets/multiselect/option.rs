// SPDX-License-Identifier: MPL-2.0

//! Option values for the multiselect widget.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use thiserror::Error;

/// Display key used when the caller does not configure one.
pub const DEFAULT_DISPLAY_KEY: &str = "name";

/// One selectable entity: either a bare string or a labeled record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectOption {
    Text(String),
    Record(Map<String, Value>),
}

/// Errors raised by the multiselect widget.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MultiselectError {
    /// A record option lacks the configured display field.
    ///
    /// This is a configuration bug in the caller.
    #[error("option for '{name}' has no '{display_key}' field: {option}")]
    MissingDisplayKey {
        name: String,
        display_key: String,
        option: String,
    },
}

impl SelectOption {
    /// Creates a text option.
    pub fn text(value: impl Into<String>) -> Self {
        SelectOption::Text(value.into())
    }

    /// Creates a record option from `(field, value)` pairs.
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        SelectOption::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the label for this option, or `None` if a record lacks the key.
    pub fn label(&self, display_key: &str) -> Option<Cow<'_, str>> {
        match self {
            SelectOption::Text(text) => Some(Cow::Borrowed(text.as_str())),
            SelectOption::Record(fields) => match fields.get(display_key)? {
                Value::String(s) => Some(Cow::Borrowed(s.as_str())),
                Value::Null => None,
                other => Some(Cow::Owned(other.to_string())),
            },
        }
    }

    /// Resolves the text shown to the user.
    ///
    /// Fails when a record option has no `display_key` field.
    pub fn display_text(&self, name: &str, display_key: &str) -> Result<String, MultiselectError> {
        self.label(display_key)
            .map(Cow::into_owned)
            .ok_or_else(|| MultiselectError::MissingDisplayKey {
                name: name.to_string(),
                display_key: display_key.to_string(),
                option: serde_json::to_string(self).unwrap_or_default(),
            })
    }

    /// Returns true if both options represent the same entity.
    ///
    /// Texts compare by string equality, records by their display field,
    /// and a text against a record by the record's label.
    pub fn same_as(&self, other: &SelectOption, display_key: &str) -> bool {
        match (self, other) {
            (SelectOption::Text(a), SelectOption::Text(b)) => a == b,
            _ => match (self.label(display_key), other.label(display_key)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl From<&str> for SelectOption {
    fn from(value: &str) -> Self {
        SelectOption::Text(value.to_string())
    }
}

impl From<String> for SelectOption {
    fn from(value: String) -> Self {
        SelectOption::Text(value)
    }
}

/// Checks every option for a display label.
pub fn validate_all(
    options: &[SelectOption],
    name: &str,
    display_key: &str,
) -> Result<(), MultiselectError> {
    for option in options {
        option.display_text(name, display_key)?;
    }
    Ok(())
}

/// Returns true if `options` contains an entry equal to `option`.
pub fn contains(options: &[SelectOption], option: &SelectOption, display_key: &str) -> bool {
    options.iter().any(|o| o.same_as(option, display_key))
}

/// Removes duplicates while keeping first-seen order.
pub fn dedup(options: Vec<SelectOption>, display_key: &str) -> Vec<SelectOption> {
    let mut unique: Vec<SelectOption> = Vec::with_capacity(options.len());
    for option in options {
        if !contains(&unique, &option, display_key) {
            unique.push(option);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author(name: &str, id: &str) -> SelectOption {
        SelectOption::record([("fullName", json!(name)), ("_id", json!(id))])
    }

    #[test]
    fn test_display_text_for_text_and_record() {
        assert_eq!(
            SelectOption::text("Slovak").display_text("language", "name").unwrap(),
            "Slovak"
        );
        assert_eq!(
            author("Dobšinský", "1").display_text("author", "fullName").unwrap(),
            "Dobšinský"
        );
        let year = SelectOption::record([("name", json!(1984))]);
        assert_eq!(year.display_text("year", "name").unwrap(), "1984");
    }

    #[test]
    fn test_missing_display_key_fails() {
        let err = author("Hviezdoslav", "2")
            .display_text("author", "name")
            .unwrap_err();
        assert!(matches!(
            err,
            MultiselectError::MissingDisplayKey { ref display_key, .. } if display_key == "name"
        ));
        assert!(validate_all(&[author("A", "1")], "author", "name").is_err());
        assert!(validate_all(&[author("A", "1")], "author", "fullName").is_ok());
    }

    #[test]
    fn test_same_as() {
        assert!(SelectOption::text("a").same_as(&SelectOption::text("a"), "name"));
        assert!(!SelectOption::text("a").same_as(&SelectOption::text("A"), "name"));
        // Records match on the display field only.
        assert!(author("Kukučín", "1").same_as(&author("Kukučín", "9"), "fullName"));
        assert!(!author("Kukučín", "1").same_as(&author("Timrava", "1"), "fullName"));
        assert!(SelectOption::text("Timrava").same_as(&author("Timrava", "3"), "fullName"));
    }

    #[test]
    fn test_dedup_keeps_first_seen_order() {
        let unique = dedup(
            vec!["b".into(), "a".into(), "b".into(), "c".into(), "a".into()],
            "name",
        );
        let expected: Vec<SelectOption> = vec!["b".into(), "a".into(), "c".into()];
        assert_eq!(unique, expected);
    }

    #[test]
    fn test_untagged_deserialize() {
        let options: Vec<SelectOption> =
            serde_json::from_value(json!(["sk", {"name": "English"}])).unwrap();
        assert_eq!(options[0], SelectOption::text("sk"));
        assert_eq!(options[1].label("name").as_deref(), Some("English"));
    }
}
