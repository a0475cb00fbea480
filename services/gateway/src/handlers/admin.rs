use crate::auth::{parse_address, CallerAddress};
use crate::error::AppError;
use crate::models::{AmountResponse, MarketStatusResponse, TransferOwnershipRequest};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};

pub async fn pause(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
) -> Result<StatusCode, AppError> {
    state.ledger(move |m| m.pause(&caller)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unpause(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
) -> Result<StatusCode, AppError> {
    state.ledger(move |m| m.unpause(&caller)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn withdraw_platform_fees(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
) -> Result<Json<AmountResponse>, AppError> {
    let now = state.now();
    let amount = state
        .ledger({
            let caller = caller.clone();
            move |m| m.withdraw_platform_fees(&caller, now)
        })
        .await?;
    Ok(Json(AmountResponse {
        address: caller,
        amount,
    }))
}

pub async fn transfer_ownership(
    State(state): State<AppState>,
    CallerAddress(caller): CallerAddress,
    Json(payload): Json<TransferOwnershipRequest>,
) -> Result<StatusCode, AppError> {
    let new_owner = parse_address(&payload.new_owner)?;
    state
        .ledger(move |m| m.transfer_ownership(&caller, new_owner))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(State(state): State<AppState>) -> Result<Json<MarketStatusResponse>, AppError> {
    let (owner, paused, balances) = state
        .ledger(|m| Ok((m.owner()?, m.is_paused()?, m.balances()?)))
        .await?;
    Ok(Json(MarketStatusResponse {
        owner,
        paused,
        retained: balances.retained,
        outstanding_royalties: balances.outstanding_royalties,
        platform_fees: balances.platform_fees,
    }))
}
