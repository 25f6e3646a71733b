// Full client flow against a mocked upstream over real HTTP:
//  - login with fractional expires_in and a numeric merchant id
//  - balance with a dot-grouped amount
//  - disbursement create, then status lookup by transaction id

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use crate::client::{CallContext, PayaraClient};
use crate::config::RetryConfig;
use crate::services::{BalanceApi, TransferApi};
use crate::transport::RetryPolicy;
use crate::types::{AccountStatus, CreateDisbursementRequest, DisbursementStatus};
use crate::utils::constants::{BALANCE_PATH, CHECK_STATUS_PATH, DISBURSEMENT_PATH, LOGIN_PATH};

async fn mock_login(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(LOGIN_PATH)
                .json_body(json!({"username": "app-e2e", "password": "secret-e2e"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "success": true,
                    "message": "Login successful",
                    "data": {
                        "access_token": "tok-e2e",
                        "token_type": "Bearer",
                        "expires_in": 3599.4,
                        "merchant_id": 206,
                        "merchant_name": "Toko Maju"
                    },
                    "meta": {"timestamp": "2025-01-01T00:00:00Z", "version": "v1"}
                }));
        })
        .await
}

fn client(server: &MockServer) -> PayaraClient {
    PayaraClient::builder()
        .credentials("app-e2e", "secret-e2e")
        .base_url(server.base_url())
        .log_requests(true)
        .build()
        .unwrap()
}

#[tokio::test]
async fn login_balance_disburse_and_status() {
    let server = MockServer::start_async().await;
    let login = mock_login(&server).await;
    let balance = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(BALANCE_PATH)
                .header("Authorization", "Bearer tok-e2e");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "success": true,
                    "message": "ok",
                    "data": {
                        "merchant_id": "206",
                        "balance": "999.793.000",
                        "currency": "IDR",
                        "last_updated": "2025-01-01T00:00:00Z",
                        "status": "ACTIVE"
                    }
                }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(DISBURSEMENT_PATH)
                .header("Authorization", "Bearer tok-e2e")
                .json_body(json!({
                    "reference_id": "REF-E2E-1",
                    "amount": 50000,
                    "bank_code": "5",
                    "account_number": "12330922231",
                    "account_name": "Asep"
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "success": true,
                    "message": "Disbursement created",
                    "data": {
                        "transaction_id": 778899,
                        "reference_id": "REF-E2E-1",
                        "amount": "50.000",
                        "fee": 2500,
                        "total_amount": "52,500",
                        "status": "PROCESS",
                        "bank_code": 5,
                        "bank_name": "Bank Central Asia",
                        "account_number": "12330922231",
                        "account_name": "Asep",
                        "created_at": "2025-01-01T00:00:01Z"
                    }
                }));
        })
        .await;
    let status = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/778899", CHECK_STATUS_PATH));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "success": true,
                    "message": "ok",
                    "data": {
                        "transaction_id": "778899",
                        "reference_id": "REF-E2E-1",
                        "status": "SUCCESS",
                        "amount": 50000,
                        "fee": 2500,
                        "total_amount": 52500,
                        "processed_at": "2025-01-01T00:05:00Z"
                    }
                }));
        })
        .await;

    let client = client(&server);
    let ctx = CallContext::background();

    let data = client.balance().get_balance(&ctx).await.unwrap();
    assert_eq!(data.balance.value(), 999_793_000);
    assert_eq!(data.merchant_id, "206");
    assert_eq!(data.status, AccountStatus::Active);

    let token = client.executor().tokens().current().await.unwrap();
    assert_eq!(token.merchant_id, "206");
    assert_eq!(token.merchant_name, "Toko Maju");
    let ttl_ms = (token.expires_at - chrono::Utc::now()).num_milliseconds();
    assert!((3_590_000..=3_599_400).contains(&ttl_ms), "ttl {}ms", ttl_ms);

    let request = CreateDisbursementRequest {
        reference_id: "REF-E2E-1".into(),
        amount: 50_000,
        bank_code: "5".into(),
        account_number: "12330922231".into(),
        account_name: "Asep".into(),
        description: None,
    };
    let created = client.transfer().create_disbursement(&ctx, &request).await.unwrap();
    assert_eq!(created.transaction_id, "778899");
    assert_eq!(created.amount, 50_000);
    assert_eq!(created.total_amount, 52_500);
    assert_eq!(created.bank_code, "5");
    assert_eq!(created.status, DisbursementStatus::Process);

    let checked = client
        .transfer()
        .get_disbursement_status(&ctx, created.transaction_id.as_str())
        .await
        .unwrap();
    assert_eq!(checked.status, DisbursementStatus::Success);
    assert!(checked.status.is_final());
    assert_eq!(checked.processed_at.as_deref(), Some("2025-01-01T00:05:00Z"));

    assert_eq!(login.hits_async().await, 1);
    assert_eq!(balance.hits_async().await, 1);
    assert_eq!(create.hits_async().await, 1);
    assert_eq!(status.hits_async().await, 1);
}

#[tokio::test]
async fn business_error_carries_code_and_raw_body() {
    let server = MockServer::start_async().await;
    mock_login(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(DISBURSEMENT_PATH);
            then.status(400)
                .header("Content-Type", "application/json")
                .body(r#"{"success":false,"message":"Insufficient balance","error_code":"INSUFFICIENT_BALANCE"}"#);
        })
        .await;

    let client = client(&server);
    let request = CreateDisbursementRequest {
        reference_id: "REF-E2E-2".into(),
        amount: 10_000_000,
        bank_code: "281".into(),
        account_number: "081212239281".into(),
        account_name: "Rudi".into(),
        description: Some("payout".into()),
    };
    let err = client
        .transfer()
        .create_disbursement(&CallContext::background(), &request)
        .await
        .unwrap_err();
    let api = err.api().expect("structured error");
    assert_eq!(api.http_status.as_u16(), 400);
    assert_eq!(api.code.as_deref(), Some("INSUFFICIENT_BALANCE"));
    assert_eq!(api.message, "Insufficient balance");
    assert!(api.raw_body_lossy().contains("INSUFFICIENT_BALANCE"));
}

#[tokio::test]
async fn server_errors_are_retried_when_configured() {
    let server = MockServer::start_async().await;
    mock_login(&server).await;
    let balance = server
        .mock_async(|when, then| {
            when.method(GET).path(BALANCE_PATH);
            then.status(503).body("upstream unavailable");
        })
        .await;

    let policy = RetryPolicy::from(&RetryConfig {
        max_retries: Some(2),
        initial_backoff_ms: Some(1),
        max_backoff_ms: Some(2),
        multiplier: Some(2.0),
    });
    let client = PayaraClient::builder()
        .credentials("app-e2e", "secret-e2e")
        .base_url(server.base_url())
        .retry_policy(policy)
        .build()
        .unwrap();

    let err = client.balance().get_balance(&CallContext::background()).await.unwrap_err();
    let api = err.api().expect("structured error");
    assert_eq!(api.http_status.as_u16(), 503);
    assert_eq!(api.raw_body, b"upstream unavailable");
    assert_eq!(balance.hits_async().await, 3);
}
