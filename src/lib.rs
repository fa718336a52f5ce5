//! ReadFocus: a reading focus mode for web pages.
//!
//! Applies reading themes and a focus marker to pages, hides ad-like
//! elements and exports the readable text of an article as Markdown.
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod dom;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
