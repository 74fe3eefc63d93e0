//! User/book relations repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::relation::{UpdateRelation, UserBookRelation},
};

#[derive(Clone)]
pub struct RelationsRepository {
    pool: Pool<Postgres>,
}

impl RelationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Relation of a user to a book, if one was ever written
    pub async fn get(&self, user_id: i32, book_id: i32) -> AppResult<Option<UserBookRelation>> {
        let relation = sqlx::query_as::<_, UserBookRelation>(
            r#"
            SELECT id, user_id, book_id, liked, in_bookmarks, rate
            FROM user_book_relations
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(relation)
    }

    /// Insert or update the single (user, book) row.
    ///
    /// Only the fields present in `update` are written; the unique constraint
    /// on (user_id, book_id) makes concurrent first writes converge.
    pub async fn upsert(
        &self,
        user_id: i32,
        book_id: i32,
        update: &UpdateRelation,
    ) -> AppResult<UserBookRelation> {
        let rate_present = update.rate.is_some();
        let rate = update.rate.flatten();

        let relation = sqlx::query_as::<_, UserBookRelation>(
            r#"
            INSERT INTO user_book_relations (user_id, book_id, liked, in_bookmarks, rate)
            VALUES ($1, $2, COALESCE($3, FALSE), COALESCE($4, FALSE), $5)
            ON CONFLICT (user_id, book_id) DO UPDATE SET
                liked = COALESCE($3, user_book_relations.liked),
                in_bookmarks = COALESCE($4, user_book_relations.in_bookmarks),
                rate = CASE WHEN $6 THEN EXCLUDED.rate ELSE user_book_relations.rate END
            RETURNING id, user_id, book_id, liked, in_bookmarks, rate
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(update.like)
        .bind(update.in_bookmarks)
        .bind(rate)
        .bind(rate_present)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::missing_reference(e, format!("Book with id {} not found", book_id))
        })?;

        Ok(relation)
    }
}
