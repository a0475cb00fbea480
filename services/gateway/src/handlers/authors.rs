use crate::auth::{parse_address, CallerAddress};
use crate::error::AppError;
use crate::models::{AmountResponse, AuthorBooksResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn get_author_books(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> Result<Json<AuthorBooksResponse>, AppError> {
    let author = parse_address(&author)?;
    let book_ids = state
        .ledger({
            let author = author.clone();
            move |m| m.get_author_books(&author)
        })
        .await?;
    Ok(Json(AuthorBooksResponse {
        author,
        count: book_ids.len(),
        book_ids,
    }))
}

pub async fn get_author_royalties(
    State(state): State<AppState>,
    Path(author): Path<String>,
) -> Result<Json<AmountResponse>, AppError> {
    let author = parse_address(&author)?;
    let amount = state
        .ledger({
            let author = author.clone();
            move |m| m.get_author_royalties(&author)
        })
        .await?;
    Ok(Json(AmountResponse {
        address: author,
        amount,
    }))
}

pub async fn withdraw_royalties(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
) -> Result<Json<AmountResponse>, AppError> {
    let now = state.now();
    let amount = state
        .ledger({
            let caller = caller.clone();
            move |m| m.withdraw_royalties(&caller, now)
        })
        .await?;
    Ok(Json(AmountResponse {
        address: caller,
        amount,
    }))
}
