//! # Integration Tests for agency-api
//!
//! Drives the full router with `tower::ServiceExt::oneshot`: generic CRUD
//! over the catalog, soft and hard delete, uniqueness, the agent package
//! rollup, vendor / license / notification / expense routes, global
//! search, authentication, health probes, metrics and the OpenAPI document.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use agency_api::config::AppConfig;
use agency_api::state::AppState;

/// Helper: build the test app with auth disabled.
fn test_app() -> axum::Router {
    agency_api::app(AppState::new())
}

/// Helper: build the test app with auth enabled.
fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    agency_api::app(AppState::with_config(config))
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: send one request against `state` and decode the JSON response.
async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = agency_api::app(state.clone())
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let text = body_string(response).await;
    let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
    (status, value)
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    call(state, Method::GET, uri, None).await
}

async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    call(state, Method::POST, uri, Some(body)).await
}

async fn put(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    call(state, Method::PUT, uri, Some(body)).await
}

async fn delete(state: &AppState, uri: &str) -> (StatusCode, Value) {
    call(state, Method::DELETE, uri, None).await
}

/// Helper: create a document and return its id.
async fn create(state: &AppState, path: &str, body: Value) -> String {
    let (status, created) = post(state, &format!("/api/{path}"), body).await;
    assert_eq!(status, StatusCode::CREATED, "create {path}: {created}");
    created["id"].as_str().unwrap().to_string()
}

async fn create_agent(state: &AppState, trade_name: &str) -> String {
    create(
        state,
        "agents",
        json!({"tradeName": trade_name, "ownerName": "Karim", "contactNo": "01711000000"}),
    )
    .await
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health/liveness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_without_database() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health/readiness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- Create / Read / Update ---------------------------------------------------

#[tokio::test]
async fn test_create_then_get_returns_matching_fields() {
    let state = AppState::new();
    let (status, created) = post(
        &state,
        "/api/agents",
        json!({
            "trade_name": "  Al Noor Travels ",
            "ownerName": "Karim",
            "mobile": "01711000000",
            "tradeLocation": "Dhaka",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert_eq!(created["tradeName"], "Al Noor Travels");
    assert_eq!(created["contactNo"], "01711000000");
    assert_eq!(created["isActive"], true);
    assert_eq!(created["totalDue"], 0);
    assert!(created.get("_id").is_none());
    assert!(created.get("trade_name").is_none());

    let (status, fetched) = get(&state, &format!("/api/agents/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_put_leaves_omitted_fields_unchanged() {
    let state = AppState::new();
    let id = create(
        &state,
        "hotels",
        json!({"name": "Hilton Makkah", "city": "Makkah", "stars": 5}),
    )
    .await;

    let (status, updated) = put(&state, &format!("/api/hotels/{id}"), json!({"city": "Madinah"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Madinah");
    assert_eq!(updated["name"], "Hilton Makkah");
    assert_eq!(updated["stars"], 5);

    let (_, fetched) = get(&state, &format!("/api/hotels/{id}")).await;
    assert_eq!(fetched["name"], "Hilton Makkah");
    assert_eq!(fetched["createdAt"], updated["createdAt"]);
}

#[tokio::test]
async fn test_put_cannot_blank_required_field() {
    let state = AppState::new();
    let id = create(&state, "hotels", json!({"name": "Swissotel", "city": "Makkah"})).await;
    let (status, body) = put(&state, &format!("/api/hotels/{id}"), json!({"name": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_required_field_is_400() {
    let state = AppState::new();
    let (status, body) = post(&state, "/api/licenses", json!({"holderName": "X"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "licenseNumber is required");
}

#[tokio::test]
async fn test_non_numeric_amount_is_400() {
    let state = AppState::new();
    let (status, body) = post(
        &state,
        "/api/loans",
        json!({"partyName": "Rahim", "loanType": "given", "amount": "lots"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let state = AppState::new();
    let response = agency_api::app(state)
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/hotels")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_id_is_400_and_unknown_id_is_404() {
    let state = AppState::new();
    let (status, body) = get(&state, "/api/hotels/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (status, body) = get(&state, "/api/hotels/65a1b2c3d4e5f60718293a4b").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "hotel not found");
}

#[tokio::test]
async fn test_derived_fields_follow_partial_updates() {
    let state = AppState::new();
    let id = create(
        &state,
        "exchanges",
        json!({"currencyCode": "SAR", "exchangeType": "BUY", "amount": 1000, "rate": "31.25"}),
    )
    .await;
    let (_, fetched) = get(&state, &format!("/api/exchanges/{id}")).await;
    assert_eq!(fetched["exchangeType"], "buy");
    assert_eq!(fetched["totalAmount"], 31250);

    let (_, updated) = put(&state, &format!("/api/exchanges/{id}"), json!({"rate": 32})).await;
    assert_eq!(updated["totalAmount"], 32000);
}

// -- List ---------------------------------------------------------------------

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let state = AppState::new();
    for n in 1..=5 {
        create(&state, "contacts", json!({"name": format!("Contact {n}"), "phone": "1"})).await;
    }

    let (status, page) = get(&state, "/api/contacts?page=2&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"], json!({"page": 2, "limit": 2, "total": 5, "totalPages": 3}));
    let names: Vec<&str> = page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Contact 3", "Contact 2"]);
}

#[tokio::test]
async fn test_list_search_and_filters() {
    let state = AppState::new();
    create(&state, "hotels", json!({"name": "Hilton", "city": "Makkah"})).await;
    create(&state, "hotels", json!({"name": "Hilton Suites", "city": "Madinah"})).await;
    create(&state, "hotels", json!({"name": "Pullman", "city": "Makkah"})).await;

    let (_, found) = get(&state, "/api/hotels?search=hilton").await;
    assert_eq!(found["pagination"]["total"], 2);

    let (_, found) = get(&state, "/api/hotels?search=hilton&city=MAKKAH").await;
    assert_eq!(found["pagination"]["total"], 1);
    assert_eq!(found["data"][0]["name"], "Hilton");
}

// -- Delete -------------------------------------------------------------------

#[tokio::test]
async fn test_soft_delete_keeps_document_readable() {
    let state = AppState::new();
    let id = create_agent(&state, "Al Noor").await;

    let (status, body) = delete(&state, &format!("/api/agents/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], id.as_str());

    let (status, fetched) = get(&state, &format!("/api/agents/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["isActive"], false);
    assert_eq!(fetched["status"], "inactive");
    assert!(fetched["deletedAt"].is_string());

    let (_, listed) = get(&state, "/api/agents").await;
    assert_eq!(listed["pagination"]["total"], 0);

    let (_, listed) = get(&state, "/api/agents?includeInactive=true").await;
    assert_eq!(listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_hard_delete_then_get_is_404() {
    let state = AppState::new();
    let id = create(&state, "hotels", json!({"name": "Hilton", "city": "Makkah"})).await;

    let (status, _) = delete(&state, &format!("/api/hotels/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&state, &format!("/api/hotels/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = delete(&state, &format!("/api/hotels/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Uniqueness ---------------------------------------------------------------

#[tokio::test]
async fn test_duplicate_license_number_is_400() {
    let state = AppState::new();
    let license = json!({"licenseNumber": "RL-100", "holderName": "A", "expiryDate": "2030-01-01"});
    create(&state, "licenses", license).await;
    let (status, body) = post(
        &state,
        "/api/licenses",
        json!({"license_number": " rl-100 ", "holderName": "B", "expiryDate": "2030-01-01"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DUPLICATE");
}

#[tokio::test]
async fn test_duplicate_iata_code_is_400() {
    let state = AppState::new();
    let (_, created) = post(&state, "/api/airports", json!({"iataCode": "dac", "name": "Shahjalal"})).await;
    assert_eq!(created["iataCode"], "DAC");
    let (status, body) = post(&state, "/api/airports", json!({"iata": "DAC", "name": "Dhaka"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DUPLICATE");

    let (status, _) = post(&state, "/api/airports", json!({"iataCode": "DA1", "name": "Bad"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_branch_name_is_400_until_deactivated() {
    let state = AppState::new();
    let id = create(&state, "branches", json!({"branchName": "Sylhet"})).await;
    let (status, _) = post(&state, "/api/branches", json!({"branchName": "SYLHET"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    delete(&state, &format!("/api/branches/{id}")).await;
    let (status, _) = post(&state, "/api/branches", json!({"branchName": "SYLHET"})).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_duplicate_trade_name_on_update_is_400() {
    let state = AppState::new();
    create_agent(&state, "Al Noor").await;
    let other = create_agent(&state, "Zamzam").await;

    let (status, body) = put(&state, &format!("/api/agents/{other}"), json!({"tradeName": "al noor"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DUPLICATE");

    let (status, _) = put(&state, &format!("/api/agents/{other}"), json!({"tradeName": "Zamzam"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &state,
        "/api/vendors",
        json!({"tradeName": "Al Noor", "ownerName": "V", "contactNo": "1"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// -- Agent Rollup -------------------------------------------------------------

#[tokio::test]
async fn test_agent_rollup_tracks_package_writes() {
    let state = AppState::new();
    let agent = create_agent(&state, "Al Noor").await;

    let hajj = create(
        &state,
        "packages",
        json!({"packageName": "Hajj 2025", "packageType": "Hajj Premium", "agentId": agent,
               "totalPrice": 600000, "paidAmount": 100000, "costs": {"airFare": 150000, "hotel": "200,000"}}),
    )
    .await;
    let umrah = create(
        &state,
        "packages",
        json!({"packageName": "Ramadan Umrah", "type": "umrah", "agent_id": agent, "totalPrice": 180000}),
    )
    .await;
    create(
        &state,
        "packages",
        json!({"packageName": "Turkey Tour", "packageType": "tour", "agent": agent,
               "totalPrice": 90000, "paidAmount": 90000}),
    )
    .await;

    let (_, package) = get(&state, &format!("/api/packages/{hajj}")).await;
    assert_eq!(package["totalCost"], 350000);
    assert_eq!(package["profit"], 250000);
    assert_eq!(package["dueAmount"], 500000);

    for paid in [200000, 350000, 450000] {
        let (status, _) = put(&state, &format!("/api/packages/{hajj}"), json!({"paidAmount": paid})).await;
        assert_eq!(status, StatusCode::OK);
    }
    put(&state, &format!("/api/packages/{umrah}"), json!({"paid_amount": "30000"})).await;

    let (_, stored) = get(&state, &format!("/api/agents/{agent}")).await;
    assert_eq!(stored["hajjBill"], 600000);
    assert_eq!(stored["hajjPaid"], 450000);
    assert_eq!(stored["hajjDue"], 150000);
    assert_eq!(stored["umrahBill"], 180000);
    assert_eq!(stored["umrahPaid"], 30000);
    assert_eq!(stored["umrahDue"], 150000);
    assert_eq!(stored["totalBill"], 870000);
    assert_eq!(stored["totalPaid"], 570000);
    assert_eq!(stored["totalDue"], 300000);
    assert_eq!(stored["totalHajjPackages"], 1);
    assert_eq!(stored["totalUmrahPackages"], 1);
    assert_eq!(stored["totalPackages"], 3);

    let (status, summary) = get(&state, &format!("/api/agents/{agent}/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["summary"]["totalDue"], 300000);

    let (_, packages) = get(&state, &format!("/api/agents/{agent}/packages")).await;
    assert_eq!(packages["total"], 3);
}

#[tokio::test]
async fn test_moving_and_deleting_packages_refreshes_both_agents() {
    let state = AppState::new();
    let first = create_agent(&state, "First").await;
    let second = create_agent(&state, "Second").await;
    let package = create(
        &state,
        "packages",
        json!({"packageName": "Umrah", "packageType": "umrah", "agentId": first, "totalPrice": 1000}),
    )
    .await;

    put(&state, &format!("/api/packages/{package}"), json!({"agentId": second})).await;
    let (_, a) = get(&state, &format!("/api/agents/{first}")).await;
    let (_, b) = get(&state, &format!("/api/agents/{second}")).await;
    assert_eq!(a["umrahBill"], 0);
    assert_eq!(b["umrahBill"], 1000);

    delete(&state, &format!("/api/packages/{package}")).await;
    let (_, b) = get(&state, &format!("/api/agents/{second}")).await;
    assert_eq!(b["totalPackages"], 0);
}

#[tokio::test]
async fn test_package_write_survives_missing_agent() {
    let state = AppState::new();
    let (status, _) = post(
        &state,
        "/api/packages",
        json!({"packageName": "Orphan", "packageType": "hajj", "agentId": "65a1b2c3d4e5f60718293a4b"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_rollup_fields_are_not_client_writable() {
    let state = AppState::new();
    let agent = create_agent(&state, "Al Noor").await;
    let (_, updated) = put(&state, &format!("/api/agents/{agent}"), json!({"totalDue": 999})).await;
    assert_eq!(updated["totalDue"], 0);

    let (status, recalculated) = post(&state, &format!("/api/agents/{agent}/recalculate"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(recalculated["summaryUpdatedAt"].is_string());
}

// -- Package Assignment -------------------------------------------------------

#[tokio::test]
async fn test_assign_customers_deduplicates_and_checks_existence() {
    let state = AppState::new();
    let package = create(&state, "packages", json!({"packageName": "P", "packageType": "hajj"})).await;
    let haji = create(&state, "hajis", json!({"name": "Rahim", "mobile": "1"})).await;
    let umrah = create(&state, "umrahs", json!({"name": "Karima", "mobile": "2"})).await;

    let uri = format!("/api/packages/{package}/assign");
    let (status, body) = post(&state, &uri, json!({"customerIds": [haji, haji, umrah]})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assignedCustomers"], json!([haji, umrah]));

    let (status, _) = post(&state, &uri, json!({"customerIds": ["65a1b2c3d4e5f60718293a4b"]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&state, &uri, json!({"customerIds": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- Vendors ------------------------------------------------------------------

#[tokio::test]
async fn test_vendor_bank_accounts_and_bills() {
    let state = AppState::new();
    let vendor = create(
        &state,
        "vendors",
        json!({"tradeName": "Saudi Ground", "ownerName": "O", "contactNo": "1"}),
    )
    .await;

    let (status, _) = post(&state, &format!("/api/vendors/{vendor}/bank-accounts"), json!({"bankName": "Sonali"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, account) = post(
        &state,
        &format!("/api/vendors/{vendor}/bank-accounts"),
        json!({"bankName": "Sonali", "accountNumber": "0011"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let account_id = account["id"].as_str().unwrap().to_string();

    let (_, fetched) = get(&state, &format!("/api/vendors/{vendor}")).await;
    assert_eq!(fetched["bankAccounts"].as_array().unwrap().len(), 1);

    let (status, _) = delete(&state, &format!("/api/vendors/{vendor}/bank-accounts/{account_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = delete(&state, &format!("/api/vendors/{vendor}/bank-accounts/{account_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    create(&state, "vendor-bills", json!({"vendorId": vendor, "billType": "hotel", "amount": 5000, "paidAmount": 1000})).await;
    create(&state, "vendor-bills", json!({"vendor_id": vendor, "billType": "visa", "amount": 2500.5})).await;
    let (status, bills) = get(&state, &format!("/api/vendors/{vendor}/bills")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bills["count"], 2);
    assert_eq!(bills["totalAmount"], 7500.5);
    assert_eq!(bills["totalPaid"], 1000);
    assert_eq!(bills["totalDue"], 6500.5);
}

// -- Licenses -----------------------------------------------------------------

#[tokio::test]
async fn test_license_stats() {
    let state = AppState::new();
    let soon = (chrono::Utc::now().date_naive() + chrono::Days::new(10)).to_string();
    for (number, expiry) in [("L-1", "2020-01-01"), ("L-2", "2999-12-31"), ("L-3", soon.as_str())] {
        create(
            &state,
            "licenses",
            json!({"licenseNumber": number, "holderName": "H", "expiryDate": expiry}),
        )
        .await;
    }

    let (status, stats) = get(&state, "/api/licenses/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["expired"], 1);
    assert_eq!(stats["active"], 2);
    assert_eq!(stats["expiringSoon"], 1);
    assert_eq!(stats["byStatus"]["active"], 3);
}

// -- Notifications ------------------------------------------------------------

#[tokio::test]
async fn test_notification_read_state() {
    let state = AppState::new();
    let first = create(&state, "notifications", json!({"title": "A", "message": "m"})).await;
    create(&state, "notifications", json!({"title": "B", "message": "m"})).await;
    create(&state, "notifications", json!({"title": "C", "message": "m"})).await;

    let (_, count) = get(&state, "/api/notifications/unread-count").await;
    assert_eq!(count["count"], 3);

    let (status, read) = put(&state, &format!("/api/notifications/{first}/read"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["isRead"], true);

    let (status, all) = put(&state, "/api/notifications/read-all", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["updated"], 2);

    let (_, count) = get(&state, "/api/notifications/unread-count").await;
    assert_eq!(count["count"], 0);
}

// -- Personal Expenses --------------------------------------------------------

#[tokio::test]
async fn test_expense_summary_resolves_category_names() {
    let state = AppState::new();
    let food = create(&state, "expense-categories", json!({"name": "Food"})).await;
    let rent = create(&state, "expense-categories", json!({"name": "Rent"})).await;
    for (category, amount) in [(&food, 300), (&food, 200), (&rent, 1000)] {
        create(
            &state,
            "personal-expenses",
            json!({"categoryId": category, "amount": amount, "date": "2025-03-01"}),
        )
        .await;
    }

    let (status, summary) = get(&state, "/api/personal-expenses/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["grandTotal"], 1500);
    assert_eq!(summary["count"], 3);
    assert_eq!(summary["categories"][0]["categoryName"], "Rent");
    assert_eq!(summary["categories"][1]["total"], 500);
}

// -- Global Search ------------------------------------------------------------

#[tokio::test]
async fn test_empty_search_returns_empty_categories() {
    let state = AppState::new();
    create(&state, "hajis", json!({"name": "Rahim", "mobile": "1"})).await;

    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let (status, body) = get(&state, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        let results = body["results"].as_object().unwrap();
        assert_eq!(results.len(), 7);
        assert!(results.values().all(|v| v.as_array().unwrap().is_empty()));
    }
}

#[tokio::test]
async fn test_search_fans_out_and_respects_limit() {
    let state = AppState::new();
    create(&state, "hajis", json!({"name": "Rahim Uddin", "mobile": "1"})).await;
    create(&state, "umrahs", json!({"name": "Abdur Rahim", "mobile": "2"})).await;
    create(&state, "umrahs", json!({"name": "Rahima", "mobile": "3"})).await;
    create_agent(&state, "Rahim Travels").await;
    let hidden = create_agent(&state, "Rahim Hidden").await;
    delete(&state, &format!("/api/agents/{hidden}")).await;

    let (_, body) = get(&state, "/api/search?q=RAHIM").await;
    assert_eq!(body["query"], "RAHIM");
    assert_eq!(body["counts"]["hajis"], 1);
    assert_eq!(body["counts"]["umrahs"], 2);
    assert_eq!(body["counts"]["agents"], 1);
    assert_eq!(body["total"], 4);
    assert!(body.get("errors").is_none());

    let (_, body) = get(&state, "/api/search?q=rahim&limit=1").await;
    assert_eq!(body["counts"]["umrahs"], 1);
    assert_eq!(body["results"]["umrahs"][0]["name"], "Rahima");
}

// -- Authentication -----------------------------------------------------------

#[tokio::test]
async fn test_auth_required_when_token_configured() {
    let response = test_app_with_auth("s3cret")
        .oneshot(Request::builder().uri("/api/hotels").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = test_app_with_auth("s3cret")
        .oneshot(
            Request::builder()
                .uri("/api/hotels")
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_unauthenticated() {
    let response = test_app_with_auth("s3cret")
        .oneshot(Request::builder().uri("/health/liveness").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Metrics and OpenAPI ------------------------------------------------------

#[tokio::test]
async fn test_metrics_counts_requests_and_documents() {
    let state = AppState::new();
    let app = agency_api::app(state.clone());
    create(&state, "hotels", json!({"name": "Hilton", "city": "Makkah"})).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/hotels/bad-id").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["requests"], 1);
    assert_eq!(body["clientErrors"], 1);
    assert_eq!(body["documents"]["hotels"], 1);
}

#[tokio::test]
async fn test_openapi_spec_lists_generated_routes() {
    let response = test_app()
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["openapi"].as_str().unwrap().starts_with("3."));
    assert!(body["paths"]["/api/agents"].is_object());
    assert!(body["paths"]["/api/agents/{id}"]["delete"].is_object());
    assert!(body["paths"]["/api/search"]["get"].is_object());
}

// -- Amount Range -------------------------------------------------------------

#[tokio::test]
async fn test_out_of_range_amounts_are_rejected_with_error_body() {
    let state = AppState::new();
    let (status, body) = post(
        &state,
        "/api/exchanges",
        json!({"currencyCode": "USD", "exchangeType": "buy", "amount": 1e20, "rate": 1e10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("totalAmount"));

    let (status, body) = post(
        &state,
        "/api/loans",
        json!({"partyName": "Rahim", "loanType": "given", "amount": 1e30}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("amount"));

    let (_, listed) = get(&state, "/api/exchanges").await;
    assert_eq!(listed["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_rollup_overflow_does_not_fail_package_write() {
    let state = AppState::new();
    let agent = create_agent(&state, "Big Spender").await;
    for name in ["P1", "P2"] {
        create(
            &state,
            "packages",
            json!({"packageName": name, "packageType": "Hajj", "agentId": agent, "totalPrice": 5e28}),
        )
        .await;
    }

    let (_, packages) = get(&state, &format!("/api/agents/{agent}/packages")).await;
    assert_eq!(packages["total"], 2);
    let (_, stored) = get(&state, &format!("/api/agents/{agent}")).await;
    assert_eq!(stored["totalPackages"], 1);

    let (status, body) = get(&state, &format!("/api/agents/{agent}/summary")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INTERNAL_ERROR");
}

// -- Reactivation -------------------------------------------------------------

#[tokio::test]
async fn test_status_update_brings_soft_deleted_agent_back() {
    let state = AppState::new();
    let agent = create_agent(&state, "Returning Travels").await;
    let (status, _) = delete(&state, &format!("/api/agents/{agent}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listed) = get(&state, "/api/agents").await;
    assert_eq!(listed["pagination"]["total"], 0);

    let (status, revived) = put(&state, &format!("/api/agents/{agent}"), json!({"status": "active"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revived["isActive"], true);
    assert!(revived.get("deletedAt").is_none());

    let (_, listed) = get(&state, "/api/agents").await;
    assert_eq!(listed["pagination"]["total"], 1);
}
