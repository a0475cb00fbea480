use crate::auth::parse_address;
use crate::error::AppError;
use crate::models::{AmountResponse, SettlementResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn get_settlements(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<SettlementResponse>>, AppError> {
    let address = parse_address(&address)?;
    let records = state.ledger(move |m| m.settlements_for(&address)).await?;
    Ok(Json(records.into_iter().map(SettlementResponse::from).collect()))
}

/// Total the wallet layer has paid out to `address`.
pub async fn get_wallet_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AmountResponse>, AppError> {
    let address = parse_address(&address)?;
    let amount = state.rail.balance_of(&address);
    Ok(Json(AmountResponse { address, amount }))
}
