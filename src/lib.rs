//! Terminal front end for a JSON mail API.
//!
//! The reusable parts live in their own modules: [`cache::RangeCache`] for
//! partially loaded listings, [`html`] for sanitizing and linkifying message
//! bodies and [`lazylist::LazyList`] for the virtualized message list.

pub mod actor;
pub mod app;
pub mod cache;
pub mod config;
pub mod constants;
pub mod html;
pub mod input;
pub mod lazylist;
pub mod mail;
pub mod ui;
