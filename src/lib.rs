//! Flick library
//!
//! Search-as-you-type movie lookup: the search controller, the TMDB provider
//! and the terminal front end built on them.

pub mod cli;
pub mod config;
pub mod controller;
pub mod event;
pub mod logging;
pub mod presenter;
pub mod search;
pub mod tui;
