//! Book model, its aggregated read record and listing query types.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Largest value a NUMERIC(10, 2) column holds
fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Maximum page size accepted on listings
pub const MAX_PER_PAGE: i64 = 100;

/// Stored book as read from the `books` table
#[derive(Debug, Clone, FromRow)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub author_name: String,
    pub owner_id: Option<i32>,
}

/// Book row joined with its relation aggregates.
///
/// Produced both by the grouped SQL query and by the in-memory fold, so
/// that the serialized [`BookRecord`] is formatted in exactly one place.
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub author_name: String,
    pub owner_id: Option<i32>,
    pub likes_count: i64,
    pub rating: Option<Decimal>,
}

/// Materialized book record returned to API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookRecord {
    pub id: i32,
    pub name: String,
    /// Price with exactly two fraction digits
    #[schema(example = "25.00")]
    pub price: String,
    pub author_name: String,
    /// Owner user id, null when the owner was removed
    pub owner: Option<i32>,
    /// Number of users who like the book
    pub likes_count: i64,
    /// Mean rate with exactly two fraction digits, null when nobody rated the book
    #[schema(example = "4.50")]
    pub rating: Option<String>,
}

impl From<BookRow> for BookRecord {
    fn from(row: BookRow) -> Self {
        BookRecord {
            id: row.id,
            name: row.name,
            price: format_decimal_2dp(row.price),
            author_name: row.author_name,
            owner: row.owner_id,
            likes_count: row.likes_count,
            rating: row.rating.map(format_decimal_2dp),
        }
    }
}

/// Render a decimal as a fixed-point string with exactly two fraction digits.
///
/// Values with more precision are rounded half away from zero, the same way
/// Postgres `ROUND(numeric, 2)` does.
pub fn format_decimal_2dp(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("price_negative"));
    }
    if price.normalize().scale() > 2 {
        return Err(ValidationError::new("price_too_precise"));
    }
    if *price > max_price() {
        return Err(ValidationError::new("price_too_large"));
    }
    Ok(())
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = String, example = "25.00")]
    pub price: Decimal,
    #[validate(length(min = 1, max = 255, message = "Author name must be 1-255 characters"))]
    pub author_name: String,
}

/// Update book request, absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<String>, example = "25.00")]
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 255, message = "Author name must be 1-255 characters"))]
    pub author_name: Option<String>,
}

/// Column a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    AuthorName,
    Name,
}

impl SortField {
    /// SQL sort expression over the `b` alias.
    ///
    /// Text columns sort case-insensitively by code point, the same order
    /// [`str::to_lowercase`] plus [`str::cmp`] gives in memory.
    pub fn sort_expression(&self) -> &'static str {
        match self {
            SortField::Price => "b.price",
            SortField::AuthorName => r#"LOWER(b.author_name) COLLATE "C""#,
            SortField::Name => r#"LOWER(b.name) COLLATE "C""#,
        }
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortField::Price),
            "author_name" => Ok(SortField::AuthorName),
            "name" => Ok(SortField::Name),
            _ => Err(AppError::BadRequest(format!("Invalid ordering field: {}", s))),
        }
    }
}

/// One `[-]field` ordering term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_prefix('-') {
            Some(field) => Ok(SortKey {
                field: field.parse()?,
                descending: true,
            }),
            None => Ok(SortKey {
                field: s.parse()?,
                descending: false,
            }),
        }
    }
}

/// Offset/limit window derived from `page` and `per_page`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

/// Parsed and validated listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    /// Exact price match
    pub price: Option<Decimal>,
    /// Lower-cased search terms; every term must occur in name or author name
    pub search_terms: Vec<String>,
    pub ordering: Vec<SortKey>,
    pub page: Option<Page>,
}

impl BookFilter {
    /// Whether a book passes the price and search filters
    pub fn matches(&self, name: &str, author_name: &str, price: Decimal) -> bool {
        if let Some(wanted) = self.price {
            if wanted != price {
                return false;
            }
        }
        let name = name.to_lowercase();
        let author_name = author_name.to_lowercase();
        self.search_terms
            .iter()
            .all(|term| name.contains(term.as_str()) || author_name.contains(term.as_str()))
    }
}

/// Raw listing query parameters, validated by [`BookQuery::into_filter`]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Exact price, e.g. `25.00`
    pub price: Option<String>,
    /// Terms searched in name and author name
    pub search: Option<String>,
    /// Comma-separated `[-]field` list, fields: price, author_name, name
    pub ordering: Option<String>,
    /// Page number (starts at 1)
    pub page: Option<String>,
    /// Items per page (1-100)
    pub per_page: Option<String>,
}

impl BookQuery {
    pub fn into_filter(self) -> AppResult<BookFilter> {
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Decimal::from_str(raw)
                    .map_err(|_| AppError::BadRequest(format!("Invalid price: {}", raw)))?,
            ),
        };

        let search_terms = self
            .search
            .as_deref()
            .map(|s| {
                s.split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|t| !t.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        let ordering = self
            .ordering
            .as_deref()
            .map(|o| {
                o.split(',')
                    .filter(|t| !t.trim().is_empty())
                    .map(str::parse)
                    .collect::<AppResult<Vec<SortKey>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let page_number = parse_positive("page", self.page.as_deref())?;
        let per_page = parse_positive("per_page", self.per_page.as_deref())?;
        if let Some(per_page) = per_page {
            if per_page > MAX_PER_PAGE {
                return Err(AppError::BadRequest(format!(
                    "per_page must not exceed {}",
                    MAX_PER_PAGE
                )));
            }
        }
        let page = match (page_number, per_page) {
            (None, None) => None,
            (page, per_page) => {
                let limit = per_page.unwrap_or(MAX_PER_PAGE);
                let page = page.unwrap_or(1);
                Some(Page {
                    offset: (page - 1).saturating_mul(limit),
                    limit,
                })
            }
        };

        Ok(BookFilter {
            price,
            search_terms,
            ordering,
            page,
        })
    }
}

fn parse_positive(name: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(v) if v >= 1 => Ok(Some(v)),
            _ => Err(AppError::BadRequest(format!(
                "{} must be a positive integer, got {}",
                name, raw
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_decimal_2dp() {
        assert_eq!(format_decimal_2dp(Decimal::from(25)), "25.00");
        assert_eq!(format_decimal_2dp(dec("4.5")), "4.50");
        assert_eq!(format_decimal_2dp(dec("4.333333")), "4.33");
        assert_eq!(format_decimal_2dp(dec("4.665")), "4.67");
        assert_eq!(format_decimal_2dp(dec("0")), "0.00");
        assert_eq!(format_decimal_2dp(Decimal::from_f64(52.0).unwrap()), "52.00");
    }

    #[test]
    fn test_record_from_row() {
        let record = BookRecord::from(BookRow {
            id: 1,
            name: "Test Book 1".into(),
            price: Decimal::from(25),
            author_name: "Test Author".into(),
            owner_id: None,
            likes_count: 2,
            rating: Some(dec("4.5")),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Test Book 1",
                "price": "25.00",
                "author_name": "Test Author",
                "owner": null,
                "likes_count": 2,
                "rating": "4.50",
            })
        );
    }

    #[test]
    fn test_parse_ordering() {
        let filter = BookQuery {
            ordering: Some("-price, author_name".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(
            filter.ordering,
            vec![
                SortKey {
                    field: SortField::Price,
                    descending: true
                },
                SortKey {
                    field: SortField::AuthorName,
                    descending: false
                },
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_input() {
        let bad = [
            BookQuery {
                ordering: Some("owner".into()),
                ..Default::default()
            },
            BookQuery {
                ordering: Some("--price".into()),
                ..Default::default()
            },
            BookQuery {
                price: Some("cheap".into()),
                ..Default::default()
            },
            BookQuery {
                page: Some("0".into()),
                ..Default::default()
            },
            BookQuery {
                per_page: Some("500".into()),
                ..Default::default()
            },
        ];

        for query in bad {
            assert!(matches!(query.into_filter(), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_pagination_window() {
        let filter = BookQuery {
            page: Some("3".into()),
            per_page: Some("10".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(
            filter.page,
            Some(Page {
                offset: 20,
                limit: 10
            })
        );

        let filter = BookQuery::default().into_filter().unwrap();
        assert_eq!(filter.page, None);
    }

    #[test]
    fn test_search_requires_every_term() {
        let filter = BookQuery {
            search: Some("Author 2".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        let price = Decimal::from(25);

        assert!(filter.matches("Test Book 2 from Author 2", "Author 1", price));
        assert!(filter.matches("Test Book 3", "Author 2", price));
        assert!(!filter.matches("Test Book 1", "Author 1", price));
    }

    #[test]
    fn test_price_filter_is_exact() {
        let filter = BookQuery {
            price: Some("25".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert!(filter.matches("a", "b", dec("25.00")));
        assert!(!filter.matches("a", "b", dec("25.01")));
    }

    #[test]
    fn test_price_validation() {
        let book = CreateBook {
            name: "Book".into(),
            price: dec("-1"),
            author_name: "Author".into(),
        };
        assert!(book.validate().is_err());

        let book = CreateBook {
            name: "Book".into(),
            price: dec("10.005"),
            author_name: "Author".into(),
        };
        assert!(book.validate().is_err());

        let book = CreateBook {
            name: "Book".into(),
            price: dec("10.50"),
            author_name: "Author".into(),
        };
        assert!(book.validate().is_ok());
    }
}
