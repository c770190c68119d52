//! Back-office flows against a mock payment API.

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use super::*;
use crate::client::YooPayClient;
use crate::editor::{BankField, UNLISTED_BANK};
use crate::fees::FeeState;
use crate::models::{BLOCKLISTED_MESSAGE, FeeType, PixKeyType, ValidationRequestId};

const PAYMENT_TOKEN: &str = "payment-token";
const API4_TOKEN: &str = "api4-token";

fn office(server: &MockServer) -> BackOffice {
    let client = YooPayClient::builder()
        .payment_url(server.uri())
        .api4_url(server.uri())
        .payment_token(PAYMENT_TOKEN)
        .api4_token(API4_TOKEN)
        .build()
        .unwrap();
    BackOffice::new(client)
}

fn merchant(drivers: &Value) -> Value {
    json!({
        "data": [{
            "id": 123,
            "originId": "9001",
            "tradeName": "Acme",
            "document": "12345678000199",
            "email": "contato@acme.com.br",
            "phone": "11999990000",
            "bank": {
                "bankName": "NUBANK",
                "bankNumber": "260",
                "agency": "0001",
                "account": "12345",
                "accountDigit": "6",
                "pixKey": "contato@acme.com.br",
                "pixKeyType": "EMAIL",
                "holderName": "Acme LTDA",
                "holderDocument": "12345678000199"
            },
            "drivers": drivers
        }]
    })
}

fn enabled_pix() -> Value {
    json!([{
        "name": "Celcoin",
        "enabled": true,
        "methods": [{"name": "PIX", "enabled": true, "feeValue": "1,5", "feeType": "PERCENTAGE"}]
    }])
}

async fn mount_list(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/marketplace/123/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_payout(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/marketplace/config/weekend-payout-blocklist/123"))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, http_method: &str, url_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.method.as_str() == http_method && request.url.path() == url_path)
        .collect()
}

fn json_of(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn lookup_finds_nested_record_and_normalizes_bank() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/123/list"))
        .and(header("authorization", "Bearer payment-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "123", "tradeName": "Acme", "bank": {"bankName": "NUBANK", "pixKey": "x"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = office(&server).lookup("123").await.unwrap();

    assert_eq!(profile.record.name, "Acme");
    assert_eq!(profile.bank_details.bank_name.as_deref(), Some("Nubank"));
    assert_eq!(profile.bank_details.pix_key, "x");
}

#[tokio::test]
async fn lookup_of_empty_list_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/999/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = office(&server).lookup("999").await.unwrap_err();
    assert!(matches!(err, YooPayError::NotFound(_)));
}

#[tokio::test]
async fn blank_identifier_makes_no_request() {
    let server = MockServer::start().await;

    let err = office(&server).lookup("   ").await.unwrap_err();

    assert!(matches!(err, YooPayError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn lookup_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/123/list"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = office(&server).lookup("123").await.unwrap_err();
    assert!(matches!(err, YooPayError::Api { status: 500, .. }));
}

#[tokio::test]
async fn lookup_matches_by_origin_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/9001/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "originId": "5", "tradeName": "Other"},
            {"id": 2, "originId": "9001", "tradeName": "Acme"}
        ])))
        .mount(&server)
        .await;

    let profile = office(&server).lookup("9001").await.unwrap();
    assert_eq!(profile.record.name, "Acme");
    assert_eq!(profile.record.id, "2");
}

#[tokio::test]
async fn missing_blocklist_entry_means_receives() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;

    let screen = office(&server).open_merchant("123").await.unwrap();

    assert_eq!(screen.weekend_payout, WeekendPayoutStatus::Receives);
    assert_eq!(screen.weekend_payout.label(), "Recebe");
}

#[tokio::test]
async fn blocklisted_merchant_does_not_receive() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"message": BLOCKLISTED_MESSAGE})),
    )
    .await;

    let screen = office(&server).open_merchant("123").await.unwrap();
    assert_eq!(screen.weekend_payout, WeekendPayoutStatus::DoesNotReceive);
}

#[tokio::test]
async fn failed_payout_check_is_unknown_but_lookup_succeeds() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(502)).await;

    let screen = office(&server).open_merchant("123").await.unwrap();

    assert_eq!(screen.weekend_payout, WeekendPayoutStatus::Unknown);
    assert_eq!(screen.profile.record.name, "Acme");
}

#[tokio::test]
async fn save_sends_phone_key_type_and_reloads() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/payments/banking"))
        .and(header("authorization", "Bearer api4-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    let editor = &mut screen.bank_editor;
    editor.set(BankField::PixKey, "+5511999990000").unwrap();
    editor.set_pix_key_type(Some(PixKeyType::Cpf));
    assert!(editor.is_dirty());

    let profile = office.save_bank_details(editor).await.unwrap();

    let saved = requests_to(&server, "POST", "/payments/banking").await;
    let body = json_of(saved.first().unwrap());
    assert_eq!(body["pixKey"], "+5511999990000");
    assert_eq!(body["pixKeyType"], "PHONE");
    assert_eq!(body["bankName"], "Nubank");
    assert_eq!(body["userIdi"], 123);
    assert_eq!(requests_to(&server, "GET", "/marketplace/123/list").await.len(), 2);
    assert_eq!(profile.record.name, "Acme");
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn unlisted_bank_is_sent_as_null() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/payments/banking"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    screen.bank_editor.select_bank(UNLISTED_BANK).unwrap();
    let _profile = office.save_bank_details(&mut screen.bank_editor).await.unwrap();

    let saved = requests_to(&server, "POST", "/payments/banking").await;
    let body = json_of(saved.first().unwrap());
    assert!(body["bankName"].is_null());
    assert!(body["bankNumber"].is_null());
}

#[tokio::test]
async fn rejected_save_is_save_failed_and_keeps_draft() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/payments/banking"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid agency"))
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    screen.bank_editor.set(BankField::Agency, "9999").unwrap();

    let err = office.save_bank_details(&mut screen.bank_editor).await.unwrap_err();

    assert!(matches!(
        err,
        YooPayError::SaveFailed(cause) if matches!(*cause, YooPayError::Api { status: 422, .. })
    ));
    assert_eq!(screen.bank_editor.draft().agency, "9999");
    assert!(screen.bank_editor.is_dirty());
    assert!(!office.is_busy(Action::SaveBankDetails));
}

#[tokio::test]
async fn failed_confirmation_lookup_is_not_save_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/123/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(merchant(&json!([]))))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/marketplace/123/list"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/payments/banking"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    screen.bank_editor.set(BankField::Account, "54321").unwrap();

    let err = office.save_bank_details(&mut screen.bank_editor).await.unwrap_err();

    assert!(matches!(err, YooPayError::Api { status: 503, .. }));
    assert_eq!(screen.bank_editor.draft().account, "54321");
}

#[tokio::test]
async fn enabling_fee_posts_pix_marketplace_fee() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/payments/marketplace/fees"))
        .and(header("authorization", "Bearer api4-token"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    assert_eq!(screen.fees.state(), FeeState::Disabled);
    screen.fees.set_value("2.5").unwrap();
    screen.fees.set_fee_type(FeeType::Percentage);

    office.enable_fee(&mut screen.fees).await.unwrap();

    let posted = requests_to(&server, "POST", "/payments/marketplace/fees").await;
    let body = json_of(posted.first().unwrap());
    assert_eq!(body["idi"], 123);
    let fee = &body["marketplaceFees"][0];
    assert_eq!(fee["method"], "PIX");
    assert_eq!(fee["feeType"], "PERCENTAGE");
    assert_eq!(fee["feeValue"], 2.5);
    assert_eq!(fee["transactionFeeValue"], 0.0);
    assert_eq!(screen.fees.state(), FeeState::Enabled);
    assert!(screen.fees.current().enabled);
}

#[tokio::test]
async fn rejected_enable_leaves_fee_disabled() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/payments/marketplace/fees"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    screen.fees.set_value("3").unwrap();

    assert!(office.enable_fee(&mut screen.fees).await.is_err());
    assert_eq!(screen.fees.state(), FeeState::Disabled);
    assert!(!office.is_busy(Action::Fee));
}

#[tokio::test]
async fn disabling_fee_targets_itau_driver() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&enabled_pix())).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/marketplace/123/drivers/itau/disable"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();
    assert_eq!(screen.fees.state(), FeeState::Enabled);
    assert_eq!(screen.fees.current().value, Some(1.5));

    office.disable_fee(&mut screen.fees).await.unwrap();

    let disabled: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.method.as_str() == "POST")
        .map(|request| request.url.path().to_owned())
        .collect();
    assert_eq!(disabled, ["/marketplace/123/drivers/itau/disable"]);
    assert_eq!(screen.fees.state(), FeeState::Disabled);
    assert!(!screen.fees.current().enabled);
}

#[tokio::test]
async fn failed_disable_stays_enabled() {
    let server = MockServer::start().await;
    mount_list(&server, merchant(&enabled_pix())).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    Mock::given(method("POST"))
        .and(path("/marketplace/123/drivers/itau/disable"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let office = office(&server);
    let mut screen = office.open_merchant("123").await.unwrap();

    assert!(office.disable_fee(&mut screen.fees).await.is_err());
    assert_eq!(screen.fees.state(), FeeState::Enabled);
}

fn pending_list(ids: &[i64]) -> Value {
    ids.iter()
        .map(|id| {
            json!({
                "id": id,
                "originId": "9001",
                "payload": "{\"tradeName\":\"Acme\",\"document\":\"12345678000199\"}",
                "createdAt": "2026-03-01T12:00:00Z",
                "updatedAt": "2026-03-01T12:00:00Z",
                "deletedAt": null,
                "switchPlan": false
            })
        })
        .collect()
}

#[tokio::test]
async fn approving_validation_refreshes_pending_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/validation/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_list(&[7, 8])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/marketplace/validation/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pending_list(&[8])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/marketplace/validation/approve/7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let office = office(&server);
    let pending = office.pending_pix_validations().await.unwrap();
    assert_eq!(pending.len(), 2);
    let payload = pending.first().unwrap().parse_payload().unwrap();
    assert_eq!(payload.trade_name, "Acme");

    let remaining = office
        .approve_pix_validation(ValidationRequestId::new(7))
        .await
        .unwrap();

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.first().unwrap().id, ValidationRequestId::new(8));
}

#[tokio::test]
async fn rejecting_validation_uses_delete_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/validation/pending/delete/8"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/marketplace/validation/pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let remaining = office(&server)
        .reject_pix_validation(ValidationRequestId::new(8))
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn failed_review_does_not_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/marketplace/validation/approve/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let office = office(&server);
    assert!(office.approve_pix_validation(ValidationRequestId::new(7)).await.is_err());
    assert!(requests_to(&server, "GET", "/marketplace/validation/pending").await.is_empty());
    assert!(!office.is_busy(Action::PixValidation));
}

#[cfg(feature = "blocking")]
#[tokio::test]
async fn blocking_back_office_looks_up_merchant() {
    use crate::client::YooPayBlockingClient;

    let server = MockServer::start().await;
    mount_list(&server, merchant(&json!([]))).await;
    mount_payout(&server, ResponseTemplate::new(404)).await;
    let uri = server.uri();

    let screen = tokio::task::spawn_blocking(move || {
        let client = YooPayBlockingClient::builder()
            .payment_url(uri.clone())
            .api4_url(uri)
            .payment_token(PAYMENT_TOKEN)
            .api4_token(API4_TOKEN)
            .build()
            .unwrap();
        BackOfficeBlocking::new(client).open_merchant("123")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(screen.profile.record.name, "Acme");
    assert_eq!(screen.weekend_payout, WeekendPayoutStatus::Receives);
}
