//! Like / bookmark / rate endpoints, always for the calling user

use axum::{
    extract::State,
    Json,
};

use crate::{
    error::AppResult,
    models::relation::{UpdateRelation, UserBookRelation},
};

use super::{ApiJson, ApiPath, AuthenticatedUser};

/// Get the caller's relation to a book
#[utoipa::path(
    get,
    path = "/book_relations/{book_id}",
    tag = "relations",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Relation (defaults if never set)", body = UserBookRelation),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_relation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(book_id): ApiPath<i32>,
) -> AppResult<Json<UserBookRelation>> {
    let relation = state.services.relations.get_relation(&claims, book_id).await?;
    Ok(Json(relation))
}

/// Like, bookmark or rate a book
#[utoipa::path(
    patch,
    path = "/book_relations/{book_id}",
    tag = "relations",
    security(("bearer_auth" = [])),
    params(
        ("book_id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateRelation,
    responses(
        (status = 200, description = "Relation updated", body = UserBookRelation),
        (status = 400, description = "Rate out of range or empty update", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_relation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(book_id): ApiPath<i32>,
    ApiJson(update): ApiJson<UpdateRelation>,
) -> AppResult<Json<UserBookRelation>> {
    let relation = state
        .services
        .relations
        .update_relation(&claims, book_id, update)
        .await?;
    Ok(Json(relation))
}
