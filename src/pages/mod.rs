// SPDX-License-Identifier: MPL-2.0

//! Page view modules for the Kniznica application.
//! Each module contains the state and view logic for a specific page.

pub mod books;
pub mod editor;
pub mod settings;
pub mod widgets;
