//! Bookstore catalog server
//!
//! REST JSON API over a book catalog where users like, bookmark and rate
//! books. Every read returns books together with their `likes_count` and
//! average `rating`, computed fresh by [`reader::BookReader`].

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reader;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}
