//! Data models for the bookstore

pub mod book;
pub mod relation;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookFilter, BookQuery, BookRecord, BookRow};
pub use relation::{UpdateRelation, UserBookRelation};
pub use user::{User, UserClaims, UserInfo};
