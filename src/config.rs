// SPDX-License-Identifier: MPL-2.0

use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, CosmicConfigEntry, Eq, PartialEq)]
#[version = 1]
pub struct Config {
    /// Library server URL (e.g., http://localhost:3000)
    pub server_url: String,
    /// Bearer token forwarded to the server; empty sends none
    pub auth_token: String,
    /// Books per table page
    pub page_size: usize,
    /// Delay between the last keystroke and a search, in milliseconds
    pub search_debounce_ms: u64,
    /// Table columns the user hid
    pub hidden_columns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: String::from("http://localhost:3000"),
            auth_token: String::new(),
            page_size: 25,
            search_debounce_ms: 300,
            hidden_columns: Vec::new(),
        }
    }
}

impl Config {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Visibility map for the filter row; only hidden columns are listed.
    pub fn column_visibility(&self) -> HashMap<String, bool> {
        self.hidden_columns
            .iter()
            .map(|column| (column.clone(), false))
            .collect()
    }

    pub fn is_hidden(&self, column: &str) -> bool {
        self.hidden_columns.iter().any(|c| c == column)
    }

    /// Flips a column's visibility.
    pub fn toggle_column(&mut self, column: &str) {
        if self.is_hidden(column) {
            self.hidden_columns.retain(|c| c != column);
        } else {
            self.hidden_columns.push(column.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_column() {
        let mut config = Config::default();
        assert!(!config.is_hidden("title"));
        config.toggle_column("title");
        assert!(config.is_hidden("title"));
        assert_eq!(config.column_visibility().get("title"), Some(&false));
        config.toggle_column("title");
        assert!(config.column_visibility().is_empty());
    }

    #[test]
    fn test_debounce() {
        assert_eq!(Config::default().search_debounce(), Duration::from_millis(300));
    }
}
