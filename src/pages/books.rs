// SPDX-License-Identifier: MPL-2.0

//! Books page: filter row plus a paged table of books.

use crate::api::{Book, BookPage};
use crate::app::Message;
use crate::config::Config;
use crate::fl;
use crate::widgets::filter_row::{
    FieldValues, FilterRow, FilterRowMessage, FilterRowState, display_key_for,
};
use crate::widgets::multiselect::SelectOption;
use cosmic::iced::alignment::{Horizontal, Vertical};
use cosmic::iced::{Alignment, Length};
use cosmic::prelude::*;
use cosmic::widget::{self, icon};
use serde_json::Value;
use std::time::Duration;

/// Table columns in display order.
pub const COLUMNS: &[&str] = &[
    "title",
    "subtitle",
    "author",
    "editor",
    "translator",
    "illustrator",
    "language",
    "publisher",
    "publishedYear",
    "edition",
    "serie",
    "numberOfPages",
    "isbn",
    "location",
    "owner",
    "readBy",
    "exLibris",
    "createdAt",
];

/// Localized header of a column.
pub fn column_label(key: &str) -> String {
    match key {
        "title" => fl!("column-title"),
        "subtitle" => fl!("column-subtitle"),
        "author" => fl!("column-author"),
        "editor" => fl!("column-editor"),
        "translator" => fl!("column-translator"),
        "illustrator" => fl!("column-illustrator"),
        "language" => fl!("column-language"),
        "publisher" => fl!("column-publisher"),
        "publishedYear" => fl!("column-published-year"),
        "edition" => fl!("column-edition"),
        "serie" => fl!("column-serie"),
        "numberOfPages" => fl!("column-number-of-pages"),
        "isbn" => fl!("column-isbn"),
        "location" => fl!("column-location"),
        "owner" => fl!("column-owner"),
        "readBy" => fl!("column-read-by"),
        "exLibris" => fl!("column-ex-libris"),
        "createdAt" => fl!("column-created-at"),
        other => other.to_string(),
    }
}

/// Column order handed to the filter row: (key, label).
pub fn columns() -> Vec<(String, String)> {
    COLUMNS
        .iter()
        .map(|key| (key.to_string(), column_label(key)))
        .collect()
}

/// Text shown in a table cell.
pub fn cell_text(book: &Book, key: &str) -> String {
    if key == "createdAt" {
        return book
            .created_at()
            .map(|date| date.format("%d.%m.%Y").to_string())
            .unwrap_or_default();
    }
    match book.field(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => fl!("ternary-yes"),
        Some(Value::Bool(false)) => fl!("ternary-no"),
        Some(Value::Array(items)) => {
            let display_key = display_key_for(key);
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<SelectOption>(item.clone()).ok())
                .filter_map(|option| option.label(display_key).map(|l| l.into_owned()))
                .collect::<Vec<_>>()
                .join(", ")
        }
        Some(other) => other.to_string(),
    }
}

/// Messages of the books page.
#[derive(Debug, Clone)]
pub enum BooksMsg {
    Refresh,
    ToggleFilters,
    ToggleColumn(String),
    Filters(FilterRowMessage),
    FilterValuesLoaded(Result<FieldValues, String>),
    Loaded {
        seq: u64,
        result: Result<BookPage, String>,
    },
    NextPage,
    PrevPage,
    ShowDetails(usize),
}

/// State of the books page.
#[derive(Debug)]
pub struct BooksState {
    pub filters: FilterRowState,
    pub books: Vec<Book>,
    pub total: usize,
    /// Current page, starting at 1.
    pub page: usize,
    pub loading: bool,
    pub error: Option<String>,
    request_seq: u64,
}

impl BooksState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            filters: FilterRowState::new(columns()).debounce(debounce),
            books: Vec::new(),
            total: 0,
            page: 1,
            loading: false,
            error: None,
            request_seq: 0,
        }
    }

    pub fn page_count(&self, page_size: usize) -> usize {
        self.total.div_ceil(page_size.max(1)).max(1)
    }

    /// Marks a book request as in flight and returns its sequence number.
    pub fn begin_request(&mut self) -> u64 {
        self.request_seq += 1;
        self.loading = true;
        self.request_seq
    }

    /// Applies a book page. Responses to superseded requests are ignored.
    ///
    /// Returns false when the response was stale.
    pub fn apply(&mut self, seq: u64, result: Result<BookPage, String>) -> bool {
        if seq != self.request_seq {
            log::debug!("discarding stale book page #{seq}");
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.books = page.books;
                self.total = page.count;
                self.error = None;
            }
            Err(err) => {
                self.books.clear();
                self.total = 0;
                self.error = Some(err);
            }
        }
        true
    }

    /// Moves to the next page; false when already on the last one.
    pub fn next_page(&mut self, page_size: usize) -> bool {
        if self.page < self.page_count(page_size) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the previous page; false when already on the first one.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}

fn column_toggles(config: &Config, space_s: u16) -> Element<'static, Message> {
    let buttons = COLUMNS.iter().map(|key| -> Element<'static, Message> {
        let class = if config.is_hidden(key) {
            cosmic::theme::Button::Standard
        } else {
            cosmic::theme::Button::Suggested
        };
        widget::button::text(column_label(key))
            .class(class)
            .on_press(Message::Books(BooksMsg::ToggleColumn(key.to_string())))
            .into()
    });
    widget::scrollable::horizontal(widget::row::with_children(buttons).spacing(space_s / 2))
        .width(Length::Fill)
        .into()
}

fn table<'a>(state: &'a BooksState, config: &Config, space_s: u16) -> Element<'a, Message> {
    let visible: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|key| !config.is_hidden(key))
        .collect();

    let header = widget::row::with_children(visible.iter().map(|key| -> Element<'a, Message> {
        widget::text::caption(column_label(key))
            .class(cosmic::style::Text::Accent)
            .width(Length::FillPortion(1))
            .into()
    }))
    .spacing(space_s)
    .padding([0, space_s]);

    let mut rows = widget::column::with_capacity(state.books.len()).spacing(space_s / 2);
    for (index, book) in state.books.iter().enumerate() {
        let cells = widget::row::with_children(visible.iter().map(|key| -> Element<'a, Message> {
            widget::text::body(cell_text(book, key))
                .width(Length::FillPortion(1))
                .into()
        }))
        .spacing(space_s);

        rows = rows.push(
            widget::mouse_area(
                widget::container(cells)
                    .padding(space_s)
                    .width(Length::Fill)
                    .class(cosmic::style::Container::Card),
            )
            .on_press(Message::Books(BooksMsg::ShowDetails(index))),
        );
    }

    widget::column::with_capacity(2)
        .push(header)
        .push(
            widget::scrollable(rows)
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .spacing(space_s)
        .height(Length::Fill)
        .into()
}

fn pagination(state: &BooksState, config: &Config, space_s: u16) -> Element<'static, Message> {
    let pages = state.page_count(config.page_size);

    let mut prev = widget::button::icon(icon::from_name("go-previous-symbolic"));
    if state.page > 1 {
        prev = prev.on_press(Message::Books(BooksMsg::PrevPage));
    }
    let mut next = widget::button::icon(icon::from_name("go-next-symbolic"));
    if state.page < pages {
        next = next.on_press(Message::Books(BooksMsg::NextPage));
    }

    widget::row::with_capacity(4)
        .push(prev)
        .push(widget::text::body(fl!(
            "page-of",
            page = state.page,
            pages = pages
        )))
        .push(next)
        .push(widget::text::caption(fl!("books-total", count = state.total)))
        .spacing(space_s)
        .align_y(Alignment::Center)
        .into()
}

/// View for the Books page
pub fn view<'a>(
    state: &'a BooksState,
    config: &Config,
    space_s: u16,
    space_m: u16,
) -> Element<'a, Message> {
    let header = widget::text::title1(fl!("books"));

    let filter_class = if state.filters.is_shown() {
        cosmic::theme::Button::Suggested
    } else {
        cosmic::theme::Button::Standard
    };
    let toolbar = widget::row::with_capacity(3)
        .push(widget::button::standard(fl!("refresh")).on_press(Message::Books(BooksMsg::Refresh)))
        .push(
            widget::button::text(fl!("filters"))
                .class(filter_class)
                .on_press(Message::Books(BooksMsg::ToggleFilters)),
        )
        .push_maybe(
            state
                .loading
                .then(|| widget::text::caption(fl!("loading"))),
        )
        .spacing(space_s)
        .align_y(Alignment::Center);

    let content: Element<'a, Message> = if let Some(ref error) = state.error {
        widget::container(widget::text::body(format!("{}: {}", fl!("error"), error)))
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Center)
            .align_y(Vertical::Center)
            .into()
    } else if state.books.is_empty() && !state.loading {
        widget::container(widget::text::body(fl!("no-books")))
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Center)
            .align_y(Vertical::Center)
            .into()
    } else {
        table(state, config, space_s)
    };

    let mut column = widget::column::with_capacity(6)
        .push(header)
        .push(toolbar);
    if state.filters.is_shown() {
        column = column
            .push(column_toggles(config, space_s))
            .push(FilterRow::new(&state.filters, |msg| {
                Message::Books(BooksMsg::Filters(msg))
            }));
    }

    column
        .push(content)
        .push(pagination(state, config, space_s))
        .spacing(space_m)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
