// SPDX-License-Identifier: MPL-2.0

use crate::widgets::filter_row::{FieldValues, FilterValue};
use crate::widgets::multiselect::SelectOption;
use chrono::{DateTime, FixedOffset};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A book record. Everything but the id is kept as raw JSON fields so the
/// table can show any column the backend returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl Book {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Creation timestamp, if the backend sent a valid RFC 3339 one.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        self.field("createdAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

/// Body of a new book.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    pub author: Vec<SelectOption>,
    pub language: Vec<SelectOption>,
}

/// Request body for a page of books.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListRequest<'a> {
    pub page: usize,
    pub page_size: usize,
    pub filters: &'a FilterValue,
}

/// One page of books plus the total number of matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPage {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewAuthor<'a> {
    full_name: &'a str,
}

#[derive(Error, Debug, Clone)]
pub enum LibraryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct LibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl LibraryClient {
    /// Create a new client. An empty token sends no Authorization header.
    pub fn new(base_url: &str, auth_token: &str) -> Result<Self, LibraryError> {
        let mut headers = HeaderMap::new();

        if !auth_token.is_empty() {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", auth_token))
                .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    fn api_prefix(&self) -> String {
        format!("{}/api", self.base_url)
    }

    /// Turns a non-2xx response into `RequestFailed` with the body attached.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, LibraryError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(LibraryError::RequestFailed(format!("{} - {}", status, body)))
    }

    /// Check that the server answers.
    pub async fn heartbeat(&self) -> Result<(), LibraryError> {
        let url = format!("{}/heartbeat", self.api_prefix());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        Self::check(response).await.map(|_| ())
    }

    /// Distinct observed values of every filterable book field.
    pub async fn filter_values(&self) -> Result<FieldValues, LibraryError> {
        let url = format!("{}/books/filter-values", self.api_prefix());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<FieldValues>()
            .await
            .map_err(|e| LibraryError::InvalidResponse(e.to_string()))
    }

    /// Fetch one page of books matching `filters`. Pages start at 1.
    pub async fn list_books(
        &self,
        page: usize,
        page_size: usize,
        filters: &FilterValue,
    ) -> Result<BookPage, LibraryError> {
        let url = format!("{}/books/list", self.api_prefix());
        let body = BookListRequest {
            page,
            page_size,
            filters,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<BookPage>()
            .await
            .map_err(|e| LibraryError::InvalidResponse(e.to_string()))
    }

    /// Save a new book and return it as stored.
    pub async fn create_book(&self, book: &NewBook) -> Result<Book, LibraryError> {
        let url = format!("{}/books", self.api_prefix());

        let response = self
            .client
            .post(&url)
            .json(book)
            .send()
            .await
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<Book>()
            .await
            .map_err(|e| LibraryError::InvalidResponse(e.to_string()))
    }

    /// Search authors by name. An empty page ends the results.
    pub async fn search_authors(
        &self,
        search: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<SelectOption>, LibraryError> {
        let url = format!("{}/authors", self.api_prefix());
        let page = page.to_string();
        let page_size = page_size.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("search", search),
                ("page", page.as_str()),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<Vec<SelectOption>>()
            .await
            .map_err(|e| LibraryError::InvalidResponse(e.to_string()))
    }

    /// Create an author and return the stored record.
    pub async fn create_author(&self, full_name: &str) -> Result<SelectOption, LibraryError> {
        let url = format!("{}/authors", self.api_prefix());

        let response = self
            .client
            .post(&url)
            .json(&NewAuthor { full_name })
            .send()
            .await
            .map_err(|e| LibraryError::ConnectionFailed(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<SelectOption>()
            .await
            .map_err(|e| LibraryError::InvalidResponse(e.to_string()))
    }
}
