// SPDX-License-Identifier: MPL-2.0

//! REST client for the library backend.

mod library;

pub use library::{Book, BookListRequest, BookPage, LibraryClient, LibraryError, NewBook};
