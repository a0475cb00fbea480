use crate::handlers::{accounts, admin, authors, books, events};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/books",
            post(books::list_book).get(books::list_available_books),
        )
        .route("/books/{id}", get(books::get_book).delete(books::remove_book))
        .route("/books/{id}/price", put(books::update_price))
        .route("/books/{id}/purchase", post(books::purchase_book))
        .route("/books/{id}/content", get(books::get_content))
        .route("/books/{id}/buyers/{address}", get(books::has_purchased))
        .route("/books/{id}/sales", get(books::book_sales))
        .route("/authors/{address}/books", get(authors::get_author_books))
        .route("/authors/{address}/royalties", get(authors::get_author_royalties))
        .route("/royalties/withdraw", post(authors::withdraw_royalties))
        .route("/accounts/{address}/settlements", get(accounts::get_settlements))
        .route("/accounts/{address}/balance", get(accounts::get_wallet_balance))
        .route("/admin/status", get(admin::status))
        .route("/admin/pause", post(admin::pause))
        .route("/admin/unpause", post(admin::unpause))
        .route("/admin/fees/withdraw", post(admin::withdraw_platform_fees))
        .route("/admin/ownership", post(admin::transfer_ownership))
        .route("/admin/events/drain", post(events::drain_events))
        .route("/events", get(events::list_events));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CALLER_HEADER;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use contracts::config::MarketplaceConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use types::ids::Address;

    const OWNER: &str = "0x00000000000000000000000000000000000000aa";
    const AUTHOR: &str = "0x1111111111111111111111111111111111111111";
    const BUYER: &str = "0x2222222222222222222222222222222222222222";

    fn app() -> Router {
        let state = AppState::new(
            Address::parse(OWNER).unwrap(),
            MarketplaceConfig::default(),
        )
        .unwrap();
        create_router(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        caller: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn list_dune(app: &Router) -> u64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/v1/books",
            Some(AUTHOR),
            Some(json!({
                "title": "Dune",
                "content_reference": "bafy-dune",
                "price": "1000",
                "royalty_percentage": 10
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["book_id"].as_u64().unwrap()
    }

    async fn buy(app: &Router, buyer: &str, id: u64, payment: &str) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            &format!("/v1/books/{id}/purchase"),
            Some(buyer),
            Some(json!({ "payment": payment })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _) = send(&app(), Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_and_get_book() {
        let app = app();
        let id = list_dune(&app).await;
        assert_eq!(id, 1);

        let (status, book) = send(&app, Method::GET, "/v1/books/1", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(book["title"], "Dune");
        assert_eq!(book["price"], "1000");
        assert_eq!(book["author"], AUTHOR);
        assert_eq!(book["is_available"], true);
        assert_eq!(book["total_sales"], 0);
    }

    #[tokio::test]
    async fn test_missing_or_malformed_caller_is_unauthorized() {
        let app = app();
        let body = json!({
            "title": "Dune",
            "content_reference": "bafy",
            "price": "1000",
            "royalty_percentage": 10
        });
        let (status, err) = send(&app, Method::POST, "/v1/books", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["error"], "UNAUTHORIZED");

        let (status, _) = send(&app, Method::POST, "/v1/books", Some("alice"), Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_listing_is_bad_request() {
        let app = app();
        let (status, err) = send(
            &app,
            Method::POST,
            "/v1/books",
            Some(AUTHOR),
            Some(json!({
                "title": "Dune",
                "content_reference": "bafy",
                "price": "1000",
                "royalty_percentage": 30
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_purchase_flow() {
        let app = app();
        let id = list_dune(&app).await;

        let (status, receipt) = buy(&app, BUYER, id, "1000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["platform_fee"], "100");
        assert_eq!(receipt["royalty"], "100");
        assert_eq!(receipt["author_payout"], "800");
        assert_eq!(receipt["refund"], "0");

        let (status, err) = buy(&app, BUYER, id, "1000").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"], "ALREADY_PURCHASED");

        let uri = format!("/v1/books/{id}/buyers/{BUYER}");
        let (_, owned) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(owned["purchased"], true);

        let (_, balance) = send(
            &app,
            Method::GET,
            &format!("/v1/accounts/{AUTHOR}/balance"),
            None,
            None,
        )
        .await;
        assert_eq!(balance["amount"], "800");
    }

    #[tokio::test]
    async fn test_purchase_errors() {
        let app = app();
        let id = list_dune(&app).await;

        let (status, err) = buy(&app, BUYER, id, "999").await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(err["error"], "INSUFFICIENT_PAYMENT");

        let (status, _) = buy(&app, BUYER, 42, "1000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = buy(&app, BUYER, id, "not-a-number").await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_royalty_withdrawal() {
        let app = app();
        let id = list_dune(&app).await;
        buy(&app, BUYER, id, "1000").await;

        let uri = format!("/v1/authors/{AUTHOR}/royalties");
        let (_, royalties) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(royalties["amount"], "100");

        let (status, paid) =
            send(&app, Method::POST, "/v1/royalties/withdraw", Some(AUTHOR), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["amount"], "100");

        let (status, err) =
            send(&app, Method::POST, "/v1/royalties/withdraw", Some(AUTHOR), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["error"], "NOTHING_TO_WITHDRAW");

        let uri = format!("/v1/accounts/{AUTHOR}/settlements");
        let (_, records) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(records.as_array().unwrap().len(), 2);
        assert_eq!(records[1]["kind"], "ROYALTY_WITHDRAWAL");
    }

    #[tokio::test]
    async fn test_author_only_operations() {
        let app = app();
        let id = list_dune(&app).await;

        let uri = format!("/v1/books/{id}/sales");
        let (status, _) = send(&app, Method::GET, &uri, Some(BUYER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, sales) = send(&app, Method::GET, &uri, Some(AUTHOR), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sales["total_sales"], 0);

        let uri = format!("/v1/books/{id}/price");
        let (status, book) = send(
            &app,
            Method::PUT,
            &uri,
            Some(AUTHOR),
            Some(json!({ "price": "2000" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(book["price"], "2000");

        let uri = format!("/v1/books/{id}");
        let (status, _) = send(&app, Method::DELETE, &uri, Some(BUYER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (_, first) = send(&app, Method::DELETE, &uri, Some(AUTHOR), None).await;
        assert_eq!(first["removed"], true);
        let (status, second) = send(&app, Method::DELETE, &uri, Some(AUTHOR), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["removed"], false);

        let (status, err) = buy(&app, BUYER, id, "2000").await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(err["error"], "UNAVAILABLE");

        let (_, books) = send(&app, Method::GET, "/v1/books", None, None).await;
        assert!(books.as_array().unwrap().is_empty());

        let uri = format!("/v1/authors/{AUTHOR}/books");
        let (_, listed) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(listed["count"], 1);
    }

    #[tokio::test]
    async fn test_admin_pause_and_fees() {
        let app = app();
        let id = list_dune(&app).await;

        let (status, _) = send(&app, Method::POST, "/v1/admin/pause", Some(BUYER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::POST, "/v1/admin/pause", Some(OWNER), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, err) = buy(&app, BUYER, id, "1000").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err["error"], "PAUSED");

        send(&app, Method::POST, "/v1/admin/unpause", Some(OWNER), None).await;
        buy(&app, BUYER, id, "1000").await;

        let (_, market) = send(&app, Method::GET, "/v1/admin/status", None, None).await;
        assert_eq!(market["paused"], false);
        assert_eq!(market["platform_fees"], "100");
        assert_eq!(market["outstanding_royalties"], "100");

        let (status, swept) =
            send(&app, Method::POST, "/v1/admin/fees/withdraw", Some(OWNER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(swept["amount"], "100");
    }

    #[tokio::test]
    async fn test_transfer_ownership() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/admin/ownership",
            Some(OWNER),
            Some(json!({ "new_owner": BUYER })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, market) = send(&app, Method::GET, "/v1/admin/status", None, None).await;
        assert_eq!(market["owner"], BUYER);

        let (status, _) = send(&app, Method::POST, "/v1/admin/pause", Some(OWNER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_events_log() {
        let app = app();
        let id = list_dune(&app).await;
        buy(&app, BUYER, id, "1000").await;

        let (status, page) = send(&app, Method::GET, "/v1/events", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 2);
        let events = page["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["type"], "BookListed");
        assert_eq!(events[0]["data"]["price"], "1000");
        assert_eq!(events[1]["type"], "BookPurchased");
        assert_eq!(events[1]["data"]["amount"], "1000");
    }

    #[tokio::test]
    async fn test_events_paging() {
        let app = app();
        let id = list_dune(&app).await;
        buy(&app, BUYER, id, "1000").await;
        send(&app, Method::POST, "/v1/admin/pause", Some(OWNER), None).await;

        let (_, page) = send(&app, Method::GET, "/v1/events?offset=1&limit=1", None, None).await;
        assert_eq!(page["total"], 3);
        assert_eq!(page["offset"], 1);
        assert_eq!(page["events"].as_array().unwrap().len(), 1);
        assert_eq!(page["events"][0]["type"], "BookPurchased");

        let (_, past_end) = send(&app, Method::GET, "/v1/events?offset=10", None, None).await;
        assert!(past_end["events"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_events_drain_owner_only() {
        let app = app();
        list_dune(&app).await;

        let (status, _) =
            send(&app, Method::POST, "/v1/admin/events/drain", Some(BUYER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, drained) =
            send(&app, Method::POST, "/v1/admin/events/drain", Some(OWNER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(drained["drained"], 1);
        assert_eq!(drained["events"][0]["type"], "BookListed");

        let (_, page) = send(&app, Method::GET, "/v1/events", None, None).await;
        assert_eq!(page["total"], 0);
    }

    #[tokio::test]
    async fn test_content_gated_by_purchase() {
        let app = app();
        let id = list_dune(&app).await;
        let uri = format!("/v1/books/{id}/content");

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, err) = send(&app, Method::GET, &uri, Some(BUYER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(err["error"], "FORBIDDEN");

        let (status, own) = send(&app, Method::GET, &uri, Some(AUTHOR), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(own["content_reference"], "bafy-dune");

        buy(&app, BUYER, id, "1000").await;
        send(&app, Method::DELETE, &format!("/v1/books/{id}"), Some(AUTHOR), None).await;
        let (status, bought) = send(&app, Method::GET, &uri, Some(BUYER), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bought["content_reference"], "bafy-dune");

        let (status, _) = send(&app, Method::GET, "/v1/books/9/content", Some(BUYER), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_categories_and_tags() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/books",
            Some(AUTHOR),
            Some(json!({
                "title": "Dune",
                "content_reference": "bafy-dune",
                "price": "1000",
                "royalty_percentage": 10,
                "categories": ["fiction"],
                "tags": ["desert", "spice"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/v1/books/{}", body["book_id"]);
        let (_, book) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(book["categories"], json!(["fiction"]));
        assert_eq!(book["tags"], json!(["desert", "spice"]));
    }
}
