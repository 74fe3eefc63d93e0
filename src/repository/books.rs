//! Books repository for database operations.
//!
//! Listings are a single grouped query: books are left-joined to their
//! relations and `likes_count` / `rating` are computed by Postgres in the same
//! statement, so the cost does not grow with one query per book.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookFilter, BookRecord, BookRow, CreateBook, UpdateBook},
    reader::BookReader,
};

const AGGREGATED_SELECT: &str = r#"
    SELECT b.id, b.name, b.price, b.author_name, b.owner_id,
           COUNT(CASE WHEN r.liked THEN 1 END) AS likes_count,
           ROUND(AVG(r.rate), 2) AS rating
    FROM books b
    LEFT JOIN user_book_relations r ON r.book_id = b.id
"#;

/// Escape LIKE wildcards so search terms match literally
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Build the grouped listing query for a filter
    fn listing_query(filter: &BookFilter) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new(AGGREGATED_SELECT);
        qb.push(" WHERE 1=1");

        if let Some(price) = filter.price {
            qb.push(" AND b.price = ").push_bind(price);
        }

        for term in &filter.search_terms {
            let pattern = like_pattern(term);
            qb.push(" AND (b.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR b.author_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(" GROUP BY b.id ORDER BY ");
        for key in &filter.ordering {
            qb.push(key.field.sort_expression())
                .push(if key.descending { " DESC, " } else { " ASC, " });
        }
        qb.push("b.id ASC");

        if let Some(page) = filter.page {
            qb.push(" LIMIT ")
                .push_bind(page.limit)
                .push(" OFFSET ")
                .push_bind(page.offset);
        }

        qb
    }

    /// Owner of a book, `None` if the book does not exist
    pub async fn get_owner(&self, id: i32) -> AppResult<Option<Option<i32>>> {
        let owner = sqlx::query_scalar::<_, Option<i32>>("SELECT owner_id FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    // =========================================================================
    // CREATE / UPDATE / DELETE
    // =========================================================================

    /// Insert a book and return its id
    pub async fn create(&self, book: &CreateBook, owner_id: i32) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (name, price, author_name, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&book.name)
        .bind(book.price)
        .bind(&book.author_name)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::missing_reference(e, format!("User with id {} not found", owner_id))
        })?;

        Ok(id)
    }

    /// Apply the present fields of `update`
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                author_name = COALESCE($4, author_name),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.price)
        .bind(&update.author_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a book; its relations go with it
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl BookReader for BooksRepository {
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<BookRecord>> {
        let mut qb = Self::listing_query(filter);
        let rows = qb.build_query_as::<BookRow>().fetch_all(&self.pool).await?;

        tracing::debug!(count = rows.len(), "Listed books with aggregates");
        Ok(rows.into_iter().map(BookRecord::from).collect())
    }

    async fn get(&self, id: i32) -> AppResult<BookRecord> {
        let query = format!("{} WHERE b.id = $1 GROUP BY b.id", AGGREGATED_SELECT);
        let row = sqlx::query_as::<_, BookRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(BookRecord::from(row))
    }
}
