//! Likes, bookmarks and rates of the acting user

use crate::{
    error::{AppError, AppResult},
    models::{
        relation::{UpdateRelation, UserBookRelation},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RelationsService {
    repository: Repository,
}

impl RelationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn ensure_book(&self, book_id: i32) -> AppResult<()> {
        if self.repository.books.exists(book_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Book with id {} not found", book_id)))
        }
    }

    /// Relation of the acting user to a book, defaults when never written
    pub async fn get_relation(
        &self,
        actor: &UserClaims,
        book_id: i32,
    ) -> AppResult<UserBookRelation> {
        self.ensure_book(book_id).await?;

        Ok(self
            .repository
            .relations
            .get(actor.user_id, book_id)
            .await?
            .unwrap_or_else(|| UserBookRelation::unset(actor.user_id, book_id)))
    }

    /// Like, bookmark or rate a book as the acting user
    pub async fn update_relation(
        &self,
        actor: &UserClaims,
        book_id: i32,
        update: UpdateRelation,
    ) -> AppResult<UserBookRelation> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::Validation(
                "At least one of like, in_bookmarks, rate is required".to_string(),
            ));
        }
        self.ensure_book(book_id).await?;

        let relation = self
            .repository
            .relations
            .upsert(actor.user_id, book_id, &update)
            .await?;

        tracing::info!(
            book_id,
            user_id = actor.user_id,
            like = relation.like,
            in_bookmarks = relation.in_bookmarks,
            rate = ?relation.rate,
            "Book relation updated"
        );
        Ok(relation)
    }
}
