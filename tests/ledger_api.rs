//! Transaction and memo collections over HTTP.

mod common;

use axum::http::StatusCode;
use common::{Browser, app, body_json, config_for};
use kakeibo::ledger::LedgerTables;
use serde_json::json;

fn ledger_app() -> axum::Router {
    app(config_for("http://127.0.0.1:9/oauth2/token"))
}

#[tokio::test]
async fn month_is_required_and_validated() {
    let app = ledger_app();
    let mut browser = Browser::default();

    for uri in [
        "/api/transactions",
        "/api/transactions?month=",
        "/api/memos",
    ] {
        let response = browser.send(&app, browser.get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["error"], "month is required");
    }

    for uri in ["/api/transactions?month=2024-13", "/api/memos?month=May"] {
        let response = browser.send(&app, browser.get(uri)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["error"], "month must be YYYY-MM");
    }
}

#[tokio::test]
async fn recorded_transaction_is_listed_in_its_month() {
    let app = ledger_app();
    let mut browser = Browser::default();

    let response = browser
        .send(
            &app,
            browser.post_json(
                "/api/transactions",
                &json!({
                    "date": "2024-05-03",
                    "amount": 1200,
                    "type": "expense",
                    "category": "food",
                    "payer": "aki"
                }),
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await["transaction"].clone();
    assert_eq!(created["amount"], 1200);
    assert_eq!(created["type"], "expense");
    assert_eq!(created["note"], "");
    assert!(created["id"].is_string());

    let response = browser
        .send(&app, browser.get("/api/transactions?month=2024-05"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["transactions"], json!([created]));

    let response = browser
        .send(&app, browser.get("/api/transactions?month=2024-06"))
        .await;
    assert_eq!(body_json(response).await["transactions"], json!([]));
}

#[tokio::test]
async fn invalid_transaction_payloads_are_rejected() {
    let app = ledger_app();
    let mut browser = Browser::default();

    let bad_type = json!({
        "date": "2024-05-03", "amount": 1, "type": "transfer",
        "category": "x", "payer": "aki"
    });
    let missing_payer = json!({
        "date": "2024-05-03", "amount": 1, "type": "income", "category": "salary"
    });
    let bad_date = json!({
        "date": "2024-02-30", "amount": 1, "type": "income",
        "category": "salary", "payer": "aki"
    });

    for payload in [bad_type, missing_payer, bad_date] {
        let response = browser
            .send(&app, browser.post_json("/api/transactions", &payload))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        assert!(body_json(response).await["error"].is_string());
    }

    let response = browser
        .send(&app, browser.get("/api/transactions?month=2024-05"))
        .await;
    assert_eq!(body_json(response).await["transactions"], json!([]));
}

#[tokio::test]
async fn memos_do_not_appear_as_transactions() {
    let app = ledger_app();
    let mut browser = Browser::default();

    let response = browser
        .send(
            &app,
            browser.post_json(
                "/api/memos",
                &json!({
                    "date": "2024-05-10",
                    "title": "rent",
                    "body": "due on the 25th",
                    "tag": "alert"
                }),
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["memo"]["tag"], "alert");

    let response = browser.send(&app, browser.get("/api/memos?month=2024-05")).await;
    let memos = body_json(response).await["memos"].clone();
    assert_eq!(memos.as_array().map(Vec::len), Some(1));
    assert_eq!(memos[0]["title"], "rent");

    let response = browser
        .send(&app, browser.get("/api/transactions?month=2024-05"))
        .await;
    assert_eq!(body_json(response).await["transactions"], json!([]));
}

#[tokio::test]
async fn unconfigured_table_is_a_server_error() {
    let tables = LedgerTables {
        transactions: String::new(),
        memos: "memos".into(),
    };
    let app = app(config_for("http://127.0.0.1:9/oauth2/token").with_tables(tables));
    let mut browser = Browser::default();

    let response = browser
        .send(&app, browser.get("/api/transactions?month=2024-05"))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].is_string());

    let response = browser.send(&app, browser.get("/api/memos?month=2024-05")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
