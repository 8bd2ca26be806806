// SPDX-License-Identifier: MPL-2.0

//! Custom widgets for the Kniznica application.

pub mod filter_row;
pub mod multiselect;
