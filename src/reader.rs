//! Aggregated book reader.
//!
//! Every read of the catalog goes through [`BookReader`], which returns books
//! together with two aggregates computed from `user_book_relations`:
//!
//! * `likes_count`: number of relations with `like = true`,
//! * `rating`: mean of the non-null rates, rounded to two fraction digits.
//!
//! Aggregates are computed in one grouped pass per call and never stored.
//! [`crate::repository::books::BooksRepository`] does it with a single SQL
//! `GROUP BY`; [`SnapshotReader`] folds an in-memory snapshot.

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookFilter, BookRecord, BookRow, SortField},
        relation::UserBookRelation,
    },
};

#[async_trait]
pub trait BookReader: Send + Sync {
    /// Books passing `filter`, in the requested order, with their aggregates
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<BookRecord>>;

    /// One book with its aggregates
    async fn get(&self, id: i32) -> AppResult<BookRecord>;
}

/// Per-book aggregate over the relation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookAggregate {
    pub likes_count: i64,
    pub rating: Option<Decimal>,
}

#[derive(Default)]
struct Accumulator {
    likes: i64,
    rate_sum: i64,
    rate_count: i64,
}

/// Group relations by book and compute the aggregates in one pass.
///
/// Books without any relation are absent from the map; callers use
/// [`BookAggregate::default`] for them.
pub fn aggregate(relations: &[UserBookRelation]) -> HashMap<i32, BookAggregate> {
    let mut groups: HashMap<i32, Accumulator> = HashMap::new();
    for relation in relations {
        let acc = groups.entry(relation.book_id).or_default();
        if relation.like {
            acc.likes += 1;
        }
        if let Some(rate) = relation.rate {
            acc.rate_sum += i64::from(rate);
            acc.rate_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(book_id, acc)| {
            let rating = (acc.rate_count > 0).then(|| {
                (Decimal::from(acc.rate_sum) / Decimal::from(acc.rate_count))
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            });
            (
                book_id,
                BookAggregate {
                    likes_count: acc.likes,
                    rating,
                },
            )
        })
        .collect()
}

/// Join a book with its aggregate into a row ready for formatting
pub fn join(book: &Book, aggregate: BookAggregate) -> BookRow {
    BookRow {
        id: book.id,
        name: book.name.clone(),
        price: book.price,
        author_name: book.author_name.clone(),
        owner_id: book.owner_id,
        likes_count: aggregate.likes_count,
        rating: aggregate.rating,
    }
}

/// Case-insensitive code point order, matching `LOWER(..) COLLATE "C"`
fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Compare two books by the filter's ordering, falling back to id
pub fn compare(filter: &BookFilter, a: &Book, b: &Book) -> Ordering {
    filter
        .ordering
        .iter()
        .map(|key| {
            let ord = match key.field {
                SortField::Price => a.price.cmp(&b.price),
                SortField::AuthorName => text_order(&a.author_name, &b.author_name),
                SortField::Name => text_order(&a.name, &b.name),
            };
            if key.descending {
                ord.reverse()
            } else {
                ord
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| a.id.cmp(&b.id))
}

/// Reader over an in-memory snapshot of the book and relation tables
#[derive(Debug, Clone, Default)]
pub struct SnapshotReader {
    books: Vec<Book>,
    relations: Vec<UserBookRelation>,
}

impl SnapshotReader {
    pub fn new(books: Vec<Book>, relations: Vec<UserBookRelation>) -> Self {
        Self { books, relations }
    }
}

#[async_trait]
impl BookReader for SnapshotReader {
    async fn list(&self, filter: &BookFilter) -> AppResult<Vec<BookRecord>> {
        let aggregates = aggregate(&self.relations);

        let mut books: Vec<&Book> = self
            .books
            .iter()
            .filter(|b| filter.matches(&b.name, &b.author_name, b.price))
            .collect();
        books.sort_by(|a, b| compare(filter, a, b));

        let (offset, limit) = filter
            .page
            .map(|p| (p.offset as usize, p.limit as usize))
            .unwrap_or((0, usize::MAX));

        Ok(books
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|book| {
                let agg = aggregates.get(&book.id).copied().unwrap_or_default();
                BookRecord::from(join(book, agg))
            })
            .collect())
    }

    async fn get(&self, id: i32) -> AppResult<BookRecord> {
        let book = self
            .books
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let relations: Vec<UserBookRelation> = self
            .relations
            .iter()
            .filter(|r| r.book_id == id)
            .cloned()
            .collect();
        let agg = aggregate(&relations).remove(&id).unwrap_or_default();

        Ok(BookRecord::from(join(book, agg)))
    }
}
