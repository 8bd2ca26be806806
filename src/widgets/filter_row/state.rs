// SPDX-License-Identifier: MPL-2.0

//! State management for the filter row.

use super::field::{
    FieldKind, FieldValues, FilterEntry, FilterField, FilterValue, NumericOperator, Ternary,
    decode_numeric, display_key_for, encode_numeric,
};
use super::message::{FilterRowEvent, FilterRowMessage};
use crate::widgets::multiselect::{
    DEFAULT_DEBOUNCE, MultiselectError, MultiselectEvent, MultiselectMessage, MultiselectState,
    SelectOption,
};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// State for the filter row above the book table.
///
/// Owned by the page and passed to the [`FilterRow`](super::FilterRow) view.
#[derive(Debug)]
pub struct FilterRowState {
    show: bool,
    loading: bool,
    /// Table columns in display order: (key, label).
    columns: Vec<(String, String)>,
    visibility: HashMap<String, bool>,
    values: FieldValues,
    fields: Vec<FilterField>,
    unknown: Vec<String>,
    multiselects: BTreeMap<String, MultiselectState>,
    texts: BTreeMap<String, String>,
    operators: BTreeMap<String, NumericOperator>,
    ternaries: BTreeMap<String, Ternary>,
    filters: FilterValue,
    debounce: Duration,
}

impl FilterRowState {
    /// Creates an empty filter row for the given table columns.
    pub fn new(columns: Vec<(String, String)>) -> Self {
        Self {
            show: false,
            loading: false,
            columns,
            visibility: HashMap::new(),
            values: FieldValues::new(),
            fields: Vec::new(),
            unknown: Vec::new(),
            multiselects: BTreeMap::new(),
            texts: BTreeMap::new(),
            operators: BTreeMap::new(),
            ternaries: BTreeMap::new(),
            filters: FilterValue::new(),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Sets the search delay used by the multiselect fields.
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    /// Changes the search delay of every multiselect field.
    pub fn set_debounce(&mut self, delay: Duration) {
        self.debounce = delay;
        for state in self.multiselects.values_mut() {
            state.set_debounce(delay);
        }
    }

    pub fn is_shown(&self) -> bool {
        self.show
    }

    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Visible filter fields in table column order.
    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    /// Field keys that matched no known kind.
    pub fn unknown_fields(&self) -> &[String] {
        &self.unknown
    }

    pub fn filters(&self) -> &FilterValue {
        &self.filters
    }

    pub fn multiselect(&self, field: &str) -> Option<&MultiselectState> {
        self.multiselects.get(field)
    }

    /// Returns any multiselect whose dropdown is open.
    pub fn open_multiselect(&self) -> Option<&str> {
        self.multiselects
            .iter()
            .find(|(_, state)| state.is_open())
            .map(|(field, _)| field.as_str())
    }

    pub fn text(&self, field: &str) -> &str {
        self.texts.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn operator(&self, field: &str) -> NumericOperator {
        self.operators.get(field).copied().unwrap_or_default()
    }

    /// Number text of a numeric field, without the operator.
    pub fn number(&self, field: &str) -> &str {
        match self.filters.get(field) {
            Some(FilterEntry::Text(encoded)) => decode_numeric(encoded).1,
            _ => "",
        }
    }

    pub fn ternary(&self, field: &str) -> Ternary {
        self.ternaries.get(field).copied().unwrap_or_default()
    }

    /// Marks the aggregation fetch as in flight.
    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Stores the aggregation result and rebuilds the fields.
    ///
    /// Selections survive a refetch. Entries whose field disappeared are
    /// dropped, and the new mapping is returned when that happens. A failed
    /// fetch is logged and leaves no filters.
    pub fn values_loaded(
        &mut self,
        result: Result<FieldValues, String>,
    ) -> Result<Option<FilterRowEvent>, MultiselectError> {
        self.loading = false;
        self.values = match result {
            Ok(values) => values,
            Err(err) => {
                log::error!("failed to load filter values: {err}");
                FieldValues::new()
            }
        };

        self.unknown.clear();
        self.multiselects.clear();
        let mut first_error = None;
        for (field, options) in &self.values {
            match FieldKind::classify(field) {
                Ok(FieldKind::MultiSelect) => {
                    let selected = match self.filters.get(field) {
                        Some(FilterEntry::Options(selected)) => selected.clone(),
                        _ => Vec::new(),
                    };
                    let state = MultiselectState::new(field.clone())
                        .display_key(display_key_for(field))
                        .debounce(self.debounce)
                        .with_options(options.clone())
                        .and_then(|state| state.with_value(selected));
                    match state {
                        Ok(state) => {
                            self.multiselects.insert(field.clone(), state);
                        }
                        Err(err) => {
                            log::error!("{err}");
                            first_error.get_or_insert(err);
                        }
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    log::error!("{err}");
                    self.unknown.push(field.clone());
                }
            }
        }

        self.rebuild_fields();
        let event = self.prune();
        match first_error {
            Some(err) => Err(err),
            None => Ok(event),
        }
    }

    /// Applies column visibility. Hidden fields lose their entry and the
    /// value shown in their control.
    ///
    /// A column missing from `visibility` counts as visible.
    pub fn set_column_visibility(
        &mut self,
        visibility: HashMap<String, bool>,
    ) -> Option<FilterRowEvent> {
        self.visibility = visibility;
        self.rebuild_fields();
        self.prune()
    }

    fn has_field(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// Clears the controls of fields without a visible filter and drops
    /// their entries. Returns the new mapping when an entry was dropped.
    fn prune(&mut self) -> Option<FilterRowEvent> {
        let gone: Vec<String> = self
            .multiselects
            .keys()
            .chain(self.texts.keys())
            .chain(self.ternaries.keys())
            .filter(|key| !self.has_field(key))
            .cloned()
            .collect();
        for key in &gone {
            if let Some(state) = self.multiselects.get_mut(key) {
                if !state.selected().is_empty() {
                    for flag in [true, false] {
                        if let Err(err) = state.update(MultiselectMessage::SetReset(flag)) {
                            log::error!("{err}");
                        }
                    }
                }
            }
            self.texts.remove(key);
            self.ternaries.remove(key);
        }

        // Multiselect fields whose picker could not be built keep no entry.
        let filters: FilterValue = self
            .filters
            .iter()
            .filter(|(key, entry)| {
                self.has_field(key)
                    && (!matches!(entry, FilterEntry::Options(_))
                        || self.multiselects.contains_key(key.as_str()))
            })
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();

        if filters.len() == self.filters.len() {
            return None;
        }
        self.filters = filters;
        Some(FilterRowEvent::FiltersChanged(self.filters.clone()))
    }

    fn is_visible(&self, key: &str) -> bool {
        self.visibility.get(key).copied().unwrap_or(true)
    }

    fn rebuild_fields(&mut self) {
        let position = |key: &str| self.columns.iter().position(|(k, _)| k == key);
        let label = |key: &str| {
            self.columns
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, label)| label.clone())
                .unwrap_or_else(|| key.to_string())
        };

        let mut fields: Vec<FilterField> = self
            .values
            .keys()
            .filter(|key| self.is_visible(key))
            .filter_map(|key| {
                let kind = FieldKind::classify(key).ok()?;
                Some(FilterField {
                    key: key.clone(),
                    label: label(key),
                    kind,
                })
            })
            .collect();

        // Fields the table does not know about go last, alphabetically.
        fields.sort_by(|a, b| {
            let order = |f: &FilterField| (position(&f.key).unwrap_or(usize::MAX), f.key.clone());
            order(a).cmp(&order(b))
        });
        self.fields = fields;
    }

    /// Handles a message and returns the resulting events.
    pub fn update(
        &mut self,
        message: FilterRowMessage,
    ) -> Result<Vec<FilterRowEvent>, MultiselectError> {
        match message {
            FilterRowMessage::Multiselect { field, message } => {
                let Some(state) = self.multiselects.get_mut(&field) else {
                    return Ok(Vec::new());
                };
                let mut events = Vec::new();
                for event in state.update(message)? {
                    match event {
                        MultiselectEvent::Changed { value, .. } => {
                            let entry = (!value.is_empty()).then_some(FilterEntry::Options(value));
                            events.extend(self.set_entry(&field, entry));
                        }
                        event => events.push(FilterRowEvent::Multiselect {
                            field: field.clone(),
                            event,
                        }),
                    }
                }
                Ok(events)
            }
            FilterRowMessage::TextChanged { field, .. }
            | FilterRowMessage::OperatorChanged { field, .. }
            | FilterRowMessage::NumberChanged { field, .. }
            | FilterRowMessage::TernaryChanged { field, .. }
                if !self.has_field(&field) =>
            {
                log::debug!("ignoring input for hidden filter {field}");
                Ok(Vec::new())
            }
            FilterRowMessage::TextChanged { field, value } => {
                let entry = (!value.is_empty()).then(|| FilterEntry::Text(value.clone()));
                self.texts.insert(field.clone(), value);
                Ok(self.set_entry(&field, entry).into_iter().collect())
            }
            FilterRowMessage::OperatorChanged { field, operator } => {
                self.operators.insert(field.clone(), operator);
                let number = self.number(&field).to_string();
                let entry =
                    (!number.is_empty()).then(|| FilterEntry::Text(encode_numeric(operator, &number)));
                Ok(self.set_entry(&field, entry).into_iter().collect())
            }
            FilterRowMessage::NumberChanged { field, value } => {
                let operator = self.operator(&field);
                let entry =
                    (!value.is_empty()).then(|| FilterEntry::Text(encode_numeric(operator, &value)));
                Ok(self.set_entry(&field, entry).into_iter().collect())
            }
            FilterRowMessage::TernaryChanged { field, value } => {
                self.ternaries.insert(field.clone(), value);
                let entry = match value {
                    Ternary::Unset => None,
                    value => Some(FilterEntry::Text(value.as_filter().to_string())),
                };
                Ok(self.set_entry(&field, entry).into_iter().collect())
            }
            FilterRowMessage::Clear => Ok(self.clear()),
        }
    }

    /// Replaces or removes one field's entry. Emits the new mapping only
    /// when it differs from the old one.
    ///
    /// Hidden fields never get an entry.
    fn set_entry(&mut self, field: &str, entry: Option<FilterEntry>) -> Option<FilterRowEvent> {
        let mut filters = self.filters.clone();
        match entry {
            Some(entry) if self.has_field(field) => {
                filters.insert(field.to_string(), entry);
            }
            _ => {
                filters.remove(field);
            }
        }
        if filters == self.filters {
            return None;
        }
        self.filters = filters;
        Some(FilterRowEvent::FiltersChanged(self.filters.clone()))
    }

    fn clear(&mut self) -> Vec<FilterRowEvent> {
        for state in self.multiselects.values_mut() {
            // The Changed events are folded into the single emission below.
            for flag in [true, false] {
                if let Err(err) = state.update(MultiselectMessage::SetReset(flag)) {
                    log::error!("{err}");
                }
            }
        }
        self.texts.clear();
        self.operators.clear();
        self.ternaries.clear();
        self.filters = FilterValue::new();
        vec![FilterRowEvent::FiltersChanged(FilterValue::new())]
    }

    /// Options of a multiselect field as observed by the aggregation endpoint.
    pub fn options(&self, field: &str) -> &[SelectOption] {
        self.values.get(field).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> Vec<(String, String)> {
        ["title", "author", "numberOfPages", "language", "exLibris"]
            .into_iter()
            .map(|k| (k.to_string(), k.to_uppercase()))
            .collect()
    }

    fn values() -> FieldValues {
        let mut values = FieldValues::new();
        values.insert(
            "author".to_string(),
            vec![
                SelectOption::record([("fullName", json!("Janko Kráľ"))]),
                SelectOption::record([("fullName", json!("Ján Botto"))]),
            ],
        );
        values.insert(
            "language".to_string(),
            vec!["SK".into(), "CZ".into(), "EN".into()],
        );
        values.insert("title".to_string(), Vec::new());
        values.insert("numberOfPages".to_string(), Vec::new());
        values.insert("exLibris".to_string(), Vec::new());
        values.insert("publisher".to_string(), Vec::new());
        values
    }

    fn loaded() -> FilterRowState {
        let mut state = FilterRowState::new(columns());
        state.begin_loading();
        assert!(state.is_loading());
        assert!(state.values_loaded(Ok(values())).unwrap().is_none());
        assert!(!state.is_loading());
        state
    }

    fn pick_sk_marina_yes(state: &mut FilterRowState) {
        state
            .update(FilterRowMessage::Multiselect {
                field: "language".to_string(),
                message: MultiselectMessage::Select("SK".into()),
            })
            .unwrap();
        state
            .update(FilterRowMessage::TextChanged {
                field: "title".to_string(),
                value: "Marína".to_string(),
            })
            .unwrap();
        state
            .update(FilterRowMessage::TernaryChanged {
                field: "exLibris".to_string(),
                value: Ternary::Yes,
            })
            .unwrap();
        assert_eq!(state.filters().len(), 3);
    }

    fn last_filters(events: &[FilterRowEvent]) -> Option<&FilterValue> {
        events.iter().rev().find_map(|e| match e {
            FilterRowEvent::FiltersChanged(filters) => Some(filters),
            _ => None,
        })
    }

    fn text(value: &str) -> FilterEntry {
        FilterEntry::Text(value.to_string())
    }

    #[test]
    fn test_fields_follow_column_order() {
        let state = loaded();
        let keys: Vec<_> = state.fields().iter().map(|f| f.key.as_str()).collect();
        // publisher is not a table column, so it goes last.
        assert_eq!(
            keys,
            vec!["title", "author", "numberOfPages", "language", "exLibris", "publisher"]
        );
        assert_eq!(state.fields()[0].label, "TITLE");
        assert_eq!(state.fields()[5].label, "publisher");
        assert_eq!(state.fields()[1].kind, FieldKind::MultiSelect);
        assert!(state.multiselect("author").is_some());
        assert!(state.multiselect("title").is_none());
    }

    #[test]
    fn test_numeric_operator_and_value() {
        let mut state = loaded();
        let field = "numberOfPages".to_string();

        state
            .update(FilterRowMessage::OperatorChanged {
                field: field.clone(),
                operator: NumericOperator::Greater,
            })
            .unwrap();
        let events = state
            .update(FilterRowMessage::NumberChanged {
                field: field.clone(),
                value: "5".to_string(),
            })
            .unwrap();
        assert_eq!(last_filters(&events).unwrap().get("numberOfPages"), Some(&text(">5")));

        let events = state
            .update(FilterRowMessage::OperatorChanged {
                field: field.clone(),
                operator: NumericOperator::Less,
            })
            .unwrap();
        assert_eq!(last_filters(&events).unwrap().get("numberOfPages"), Some(&text("<5")));
        assert_eq!(state.number("numberOfPages"), "5");

        let events = state
            .update(FilterRowMessage::NumberChanged {
                field: field.clone(),
                value: "120".to_string(),
            })
            .unwrap();
        assert_eq!(last_filters(&events).unwrap().get("numberOfPages"), Some(&text("<120")));

        // Clearing the number removes the entry but keeps the operator.
        let events = state
            .update(FilterRowMessage::NumberChanged {
                field: field.clone(),
                value: String::new(),
            })
            .unwrap();
        assert!(last_filters(&events).unwrap().is_empty());
        assert_eq!(state.operator("numberOfPages"), NumericOperator::Less);
    }

    #[test]
    fn test_numeric_default_operator() {
        let mut state = loaded();
        let events = state
            .update(FilterRowMessage::NumberChanged {
                field: "numberOfPages".to_string(),
                value: "12".to_string(),
            })
            .unwrap();
        assert_eq!(last_filters(&events).unwrap().get("numberOfPages"), Some(&text("=12")));
    }

    #[test]
    fn test_text_and_ternary() {
        let mut state = loaded();
        let events = state
            .update(FilterRowMessage::TextChanged {
                field: "title".to_string(),
                value: "Marína".to_string(),
            })
            .unwrap();
        assert_eq!(last_filters(&events).unwrap().get("title"), Some(&text("Marína")));

        let events = state
            .update(FilterRowMessage::TernaryChanged {
                field: "exLibris".to_string(),
                value: Ternary::Yes,
            })
            .unwrap();
        let filters = last_filters(&events).unwrap();
        assert_eq!(filters.get("exLibris"), Some(&text("Áno")));
        assert_eq!(filters.get("title"), Some(&text("Marína")));

        let events = state
            .update(FilterRowMessage::TernaryChanged {
                field: "exLibris".to_string(),
                value: Ternary::Unset,
            })
            .unwrap();
        assert!(!last_filters(&events).unwrap().contains_key("exLibris"));

        let events = state
            .update(FilterRowMessage::TextChanged {
                field: "title".to_string(),
                value: String::new(),
            })
            .unwrap();
        assert!(last_filters(&events).unwrap().is_empty());
    }

    #[test]
    fn test_multiselect_selection_becomes_entry() {
        let mut state = loaded();
        let events = state
            .update(FilterRowMessage::Multiselect {
                field: "language".to_string(),
                message: MultiselectMessage::Select("SK".into()),
            })
            .unwrap();
        assert_eq!(
            last_filters(&events).unwrap().get("language"),
            Some(&FilterEntry::Options(vec!["SK".into()]))
        );

        let events = state
            .update(FilterRowMessage::Multiselect {
                field: "language".to_string(),
                message: MultiselectMessage::Remove(0),
            })
            .unwrap();
        assert!(last_filters(&events).unwrap().is_empty());
    }

    #[test]
    fn test_multiselect_events_are_forwarded() {
        let mut state = loaded();
        let events = state
            .update(FilterRowMessage::Multiselect {
                field: "author".to_string(),
                message: MultiselectMessage::Open,
            })
            .unwrap();
        assert!(matches!(
            &events[..],
            [FilterRowEvent::Multiselect { field, event: MultiselectEvent::Measure }] if field == "author"
        ));
        assert_eq!(state.open_multiselect(), Some("author"));
        assert_eq!(state.multiselect("author").unwrap().visible_options().len(), 2);
    }

    #[test]
    fn test_hidden_columns_drop_entries() {
        let mut state = loaded();
        state
            .update(FilterRowMessage::TextChanged {
                field: "title".to_string(),
                value: "Hájnikova".to_string(),
            })
            .unwrap();
        state
            .update(FilterRowMessage::NumberChanged {
                field: "numberOfPages".to_string(),
                value: "90".to_string(),
            })
            .unwrap();

        let event = state
            .set_column_visibility(HashMap::from([("title".to_string(), false)]))
            .unwrap();
        let FilterRowEvent::FiltersChanged(filters) = event else {
            panic!("expected FiltersChanged");
        };
        assert_eq!(filters.keys().collect::<Vec<_>>(), vec!["numberOfPages"]);
        assert!(state.fields().iter().all(|f| f.key != "title"));

        // Hidden fields never gain an entry.
        let events = state
            .update(FilterRowMessage::TextChanged {
                field: "title".to_string(),
                value: "x".to_string(),
            })
            .unwrap();
        assert!(events.is_empty());
        assert!(!state.filters().contains_key("title"));

        // Nothing to drop, nothing emitted.
        assert!(
            state
                .set_column_visibility(HashMap::from([("title".to_string(), false)]))
                .is_none()
        );
    }

    #[test]
    fn test_hidden_column_clears_its_control() {
        let mut state = loaded();
        pick_sk_marina_yes(&mut state);

        let hidden = ["language", "title", "exLibris"]
            .into_iter()
            .map(|k| (k.to_string(), false))
            .collect();
        let Some(FilterRowEvent::FiltersChanged(filters)) = state.set_column_visibility(hidden)
        else {
            panic!("expected FiltersChanged");
        };
        assert!(filters.is_empty());

        // Shown again, the controls are as empty as the mapping.
        assert!(state.set_column_visibility(HashMap::new()).is_none());
        assert!(state.multiselect("language").unwrap().selected().is_empty());
        assert_eq!(state.text("title"), "");
        assert_eq!(state.ternary("exLibris"), Ternary::Unset);
        assert!(state.filters().is_empty());
    }

    #[test]
    fn test_refetch_keeps_selection() {
        let mut state = loaded();
        pick_sk_marina_yes(&mut state);

        assert!(state.values_loaded(Ok(values())).unwrap().is_none());
        let expected: Vec<SelectOption> = vec!["SK".into()];
        assert_eq!(state.multiselect("language").unwrap().selected(), &expected[..]);
        assert_eq!(
            state.filters().get("language"),
            Some(&FilterEntry::Options(expected))
        );
        assert_eq!(state.text("title"), "Marína");
    }

    #[test]
    fn test_refetch_drops_vanished_fields() {
        let mut state = loaded();
        pick_sk_marina_yes(&mut state);

        let mut fewer = values();
        fewer.remove("language");
        fewer.remove("title");
        let Some(FilterRowEvent::FiltersChanged(filters)) =
            state.values_loaded(Ok(fewer)).unwrap()
        else {
            panic!("expected FiltersChanged");
        };
        assert_eq!(filters.keys().collect::<Vec<_>>(), vec!["exLibris"]);
        assert_eq!(state.text("title"), "");
        assert!(state.multiselect("language").is_none());
        assert!(
            state
                .filters()
                .keys()
                .all(|key| state.fields().iter().any(|f| &f.key == key))
        );
    }

    #[test]
    fn test_unchanged_input_emits_nothing() {
        let mut state = loaded();
        let title = || FilterRowMessage::TextChanged {
            field: "title".to_string(),
            value: "Marína".to_string(),
        };
        assert_eq!(state.update(title()).unwrap().len(), 1);
        assert!(state.update(title()).unwrap().is_empty());

        let events = state
            .update(FilterRowMessage::TernaryChanged {
                field: "exLibris".to_string(),
                value: Ternary::Unset,
            })
            .unwrap();
        assert!(events.is_empty());

        // An operator without a number changes nothing yet.
        let events = state
            .update(FilterRowMessage::OperatorChanged {
                field: "numberOfPages".to_string(),
                operator: NumericOperator::Greater,
            })
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_reported() {
        let mut state = FilterRowState::new(columns());
        let mut values = FieldValues::new();
        values.insert("coverColor".to_string(), Vec::new());
        values.insert("title".to_string(), Vec::new());
        assert!(state.values_loaded(Ok(values)).unwrap().is_none());
        assert_eq!(state.unknown_fields(), &["coverColor".to_string()]);
        assert_eq!(state.fields().len(), 1);
    }

    #[test]
    fn test_failed_fetch_yields_no_filters() {
        let mut state = FilterRowState::new(columns());
        state.begin_loading();
        state.values_loaded(Err("timeout".to_string())).unwrap();
        assert!(!state.is_loading());
        assert!(state.fields().is_empty());
    }

    #[test]
    fn test_bad_option_pool_is_reported() {
        let mut state = FilterRowState::new(columns());
        let mut values = FieldValues::new();
        values.insert(
            "author".to_string(),
            vec![SelectOption::record([("name", json!("no full name"))])],
        );
        assert!(state.values_loaded(Ok(values)).is_err());
        assert!(state.multiselect("author").is_none());
    }

    #[test]
    fn test_clear() {
        let mut state = loaded();
        state
            .update(FilterRowMessage::Multiselect {
                field: "language".to_string(),
                message: MultiselectMessage::Select("EN".into()),
            })
            .unwrap();
        state
            .update(FilterRowMessage::TernaryChanged {
                field: "exLibris".to_string(),
                value: Ternary::No,
            })
            .unwrap();

        let events = state.update(FilterRowMessage::Clear).unwrap();
        assert_eq!(events.len(), 1);
        assert!(last_filters(&events).unwrap().is_empty());
        assert!(state.multiselect("language").unwrap().selected().is_empty());
        assert_eq!(state.ternary("exLibris"), Ternary::Unset);
    }
}
