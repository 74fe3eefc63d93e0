//! Catalog management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookFilter, BookRecord, CreateBook, UpdateBook},
        user::UserClaims,
    },
    reader::BookReader,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    reader: Arc<dyn BookReader>,
}

impl CatalogService {
    /// Catalog reading through the grouped SQL query
    pub fn new(repository: Repository) -> Self {
        let reader = Arc::new(repository.books.clone());
        Self::with_reader(repository, reader)
    }

    pub fn with_reader(repository: Repository, reader: Arc<dyn BookReader>) -> Self {
        Self { repository, reader }
    }

    /// List books with their likes count and rating
    pub async fn list_books(&self, filter: &BookFilter) -> AppResult<Vec<BookRecord>> {
        self.reader.list(filter).await
    }

    /// Get one book with its likes count and rating
    pub async fn get_book(&self, id: i32) -> AppResult<BookRecord> {
        self.reader.get(id).await
    }

    /// Create a book owned by the acting user
    pub async fn create_book(&self, actor: &UserClaims, book: CreateBook) -> AppResult<BookRecord> {
        book.validate()?;

        let id = self.repository.books.create(&book, actor.user_id).await?;
        tracing::info!(book_id = id, owner_id = actor.user_id, "Book created");

        self.reader.get(id).await
    }

    /// Update a book; only its owner or staff may do so
    pub async fn update_book(
        &self,
        actor: &UserClaims,
        id: i32,
        update: UpdateBook,
    ) -> AppResult<BookRecord> {
        update.validate()?;
        self.authorize(actor, id).await?;

        self.repository.books.update(id, &update).await?;
        tracing::info!(book_id = id, user_id = actor.user_id, "Book updated");

        self.reader.get(id).await
    }

    /// Delete a book; only its owner or staff may do so
    pub async fn delete_book(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        self.authorize(actor, id).await?;

        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, user_id = actor.user_id, "Book deleted");
        Ok(())
    }

    async fn authorize(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        let owner = self
            .repository
            .books
            .get_owner(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        actor.require_owner_or_staff(owner).map_err(|e| {
            tracing::warn!(book_id = id, user_id = actor.user_id, "Book change denied");
            e
        })
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
