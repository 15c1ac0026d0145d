use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use super::state::AppState;
use crate::ledger::{LedgerStore, Memo, MemoPayload, Transaction, TransactionPayload};
use crate::types::Month;

/// Month-scoped transaction and memo collections.
pub(super) fn ledger_routes<L: LedgerStore>() -> Router<AppState<L>> {
    Router::new()
        .route(
            "/api/transactions",
            get(list_transactions::<L>).post(create_transaction::<L>),
        )
        .route("/api/memos", get(list_memos::<L>).post(create_memo::<L>))
}

#[derive(Deserialize)]
struct MonthQuery {
    month: Option<String>,
}

impl MonthQuery {
    fn month(self) -> Result<Month, ApiError> {
        let raw = self
            .month
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ApiError::Validation("month is required".into()))?;
        Ok(raw.parse::<Month>()?)
    }
}

async fn list_transactions<L: LedgerStore>(
    State(state): State<AppState<L>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let month = query.month()?;
    let transactions: Vec<Transaction> = state.ledger.query_by_month(&month).await?;
    Ok(Json(json!({ "transactions": transactions })))
}

async fn create_transaction<L: LedgerStore>(
    State(state): State<AppState<L>>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let transaction = Transaction::try_from(payload)?;
    state.ledger.put_item(&transaction).await?;
    tracing::info!(id = %transaction.id, date = %transaction.date, "Transaction recorded");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "transaction": transaction })),
    )
        .into_response())
}

async fn list_memos<L: LedgerStore>(
    State(state): State<AppState<L>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let month = query.month()?;
    let memos: Vec<Memo> = state.ledger.query_by_month(&month).await?;
    Ok(Json(json!({ "memos": memos })))
}

async fn create_memo<L: LedgerStore>(
    State(state): State<AppState<L>>,
    payload: Result<Json<MemoPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let memo = Memo::try_from(payload)?;
    state.ledger.put_item(&memo).await?;
    tracing::info!(id = %memo.id, date = %memo.date, "Memo recorded");
    Ok((StatusCode::CREATED, Json(json!({ "memo": memo }))).into_response())
}
