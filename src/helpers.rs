// SPDX-License-Identifier: MPL-2.0

//! Async helper functions for the Kniznica application.
//! These functions handle library API interactions and flatten errors to
//! strings for the application messages.

use crate::api::{Book, BookPage, LibraryClient, NewBook};
use crate::widgets::filter_row::{FieldValues, FilterValue};
use crate::widgets::multiselect::SelectOption;

/// Number of authors fetched per search page.
pub const AUTHOR_PAGE_SIZE: usize = 20;

fn client(url: &str, token: &str) -> Result<LibraryClient, String> {
    LibraryClient::new(url, token).map_err(|e| e.to_string())
}

/// Test connection to the library server
pub async fn test_connection(url: &str, token: &str) -> Result<(), String> {
    client(url, token)?.heartbeat().await.map_err(|e| e.to_string())
}

/// Fetch the distinct values of every filterable field
pub async fn fetch_filter_values(url: &str, token: &str) -> Result<FieldValues, String> {
    client(url, token)?
        .filter_values()
        .await
        .map_err(|e| e.to_string())
}

/// Fetch one page of books
pub async fn fetch_books(
    url: &str,
    token: &str,
    page: usize,
    page_size: usize,
    filters: &FilterValue,
) -> Result<BookPage, String> {
    client(url, token)?
        .list_books(page, page_size, filters)
        .await
        .map_err(|e| e.to_string())
}

/// Search authors for the author picker
pub async fn search_authors(
    url: &str,
    token: &str,
    query: &str,
    page: usize,
) -> Result<Vec<SelectOption>, String> {
    client(url, token)?
        .search_authors(query, page, AUTHOR_PAGE_SIZE)
        .await
        .map_err(|e| e.to_string())
}

/// Create an author from the picker's query
pub async fn create_author(url: &str, token: &str, full_name: &str) -> Result<SelectOption, String> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(String::from("Author name is empty"));
    }
    client(url, token)?
        .create_author(full_name)
        .await
        .map_err(|e| e.to_string())
}

/// Save a new book
pub async fn save_book(url: &str, token: &str, book: &NewBook) -> Result<Book, String> {
    client(url, token)?
        .create_book(book)
        .await
        .map_err(|e| e.to_string())
}
