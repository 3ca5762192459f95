//! Output formatting module

pub mod formatter;
