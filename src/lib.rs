//! docdash - terminal dashboard for the document-processing service
//!
//! The binary in `main.rs` is a thin shell over these modules; integration
//! tests drive the wizards and the HTTP client through the same API.

pub mod api;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod flows;
pub mod logging;
pub mod models;
pub mod routes;
pub mod toast;
pub mod ui;
pub mod wizard;
