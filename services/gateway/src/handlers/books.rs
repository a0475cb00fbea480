use crate::auth::{parse_address, CallerAddress};
use crate::error::AppError;
use crate::models::{
    BookResponse, ContentResponse, HasPurchasedResponse, ListBookRequest, ListBookResponse,
    PageQuery, PurchaseRequest, PurchaseResponse, RemoveBookResponse, SalesResponse,
    UpdatePriceRequest,
};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use types::ids::BookId;

pub async fn list_book(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Json(payload): Json<ListBookRequest>,
) -> Result<(StatusCode, Json<ListBookResponse>), AppError> {
    let now = state.now();
    let book_id = state
        .ledger(move |m| m.list_book(&caller, payload.into(), now))
        .await?;
    Ok((StatusCode::CREATED, Json(ListBookResponse { book_id })))
}

pub async fn list_available_books(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let books = state
        .ledger(move |m| m.list_available_books(page.offset(), page.limit()))
        .await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(book_id): Path<u64>,
) -> Result<Json<BookResponse>, AppError> {
    let book = state.ledger(move |m| m.get_book(BookId::new(book_id))).await?;
    Ok(Json(book.into()))
}

pub async fn update_price(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Path(book_id): Path<u64>,
    Json(payload): Json<UpdatePriceRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let book_id = BookId::new(book_id);
    let book = state
        .ledger(move |m| {
            m.update_book_price(&caller, book_id, payload.price)?;
            m.get_book(book_id)
        })
        .await?;
    Ok(Json(book.into()))
}

pub async fn remove_book(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Path(book_id): Path<u64>,
) -> Result<Json<RemoveBookResponse>, AppError> {
    let book_id = BookId::new(book_id);
    let removed = state
        .ledger(move |m| m.remove_book(&caller, book_id))
        .await?;
    Ok(Json(RemoveBookResponse { book_id, removed }))
}

pub async fn purchase_book(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Path(book_id): Path<u64>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let now = state.now();
    let receipt = state
        .ledger(move |m| m.purchase_book(&caller, BookId::new(book_id), payload.payment, now))
        .await?;
    Ok(Json(receipt.into()))
}

/// Content locator for the author or a buyer of the book.
pub async fn get_content(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Path(book_id): Path<u64>,
) -> Result<Json<ContentResponse>, AppError> {
    let book_id = BookId::new(book_id);
    let content_reference = state
        .ledger(move |m| m.content_for(&caller, book_id))
        .await?;
    Ok(Json(ContentResponse {
        book_id,
        content_reference,
    }))
}

pub async fn has_purchased(
    State(state): State<AppState>,
    Path((book_id, buyer)): Path<(u64, String)>,
) -> Result<Json<HasPurchasedResponse>, AppError> {
    let book_id = BookId::new(book_id);
    let buyer = parse_address(&buyer)?;
    let purchased = state
        .ledger({
            let buyer = buyer.clone();
            move |m| m.has_purchased(&buyer, book_id)
        })
        .await?;
    Ok(Json(HasPurchasedResponse {
        book_id,
        buyer,
        purchased,
    }))
}

pub async fn book_sales(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Path(book_id): Path<u64>,
) -> Result<Json<SalesResponse>, AppError> {
    let book_id = BookId::new(book_id);
    let summary = state
        .ledger(move |m| m.book_sales(&caller, book_id))
        .await?;
    Ok(Json(SalesResponse::new(book_id, summary)))
}
