use crate::common::fake_service::LOGIN_PATH;
use crate::common::{FakeServiceOptions, TokenShape, spawn_api_with, spawn_bare_api};
use api_checks::api_client::RequestOptions;
use api_checks::authentication::{TokenError, acquire_token};
use api_checks::configuration::Endpoint;
use claims::{assert_err, assert_ok};
use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn every_token_envelope_yields_a_session() {
    for token_shape in [
        TokenShape::Token,
        TokenShape::AccessToken,
        TokenShape::DataTokenAccess,
    ] {
        // Arrange
        let app = spawn_api_with(FakeServiceOptions {
            token_shape,
            ..Default::default()
        })
        .await;

        // Act
        let session = assert_ok!(acquire_token(&app.client, &app.client.settings().admin).await);

        // Assert
        assert_eq!(
            session.token().expose_secret(),
            app.service.token(),
            "Wrong token for {:?}",
            token_shape
        );
    }
}

#[tokio::test]
async fn login_sends_the_admin_credentials_and_role() {
    // Arrange
    let app = spawn_bare_api().await;
    let admin = app.service.admin();
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({
            "email": admin.email,
            "password": admin.password,
            "role": admin.role
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .expect(1)
        .mount(&app.server)
        .await;

    // Act
    let outcome = acquire_token(&app.client, &app.client.settings().admin).await;

    // Assert
    assert_ok!(outcome);
}

#[tokio::test]
async fn a_response_without_a_token_is_reported_with_its_body() {
    // Arrange
    let app = spawn_bare_api().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foo": "bar"})))
        .mount(&app.server)
        .await;

    // Act
    let error = assert_err!(acquire_token(&app.client, &app.client.settings().admin).await);

    // Assert
    assert!(matches!(error, TokenError::MissingToken { .. }));
    let message = error.to_string();
    assert!(message.contains("token missing in response"), "{}", message);
    assert!(message.contains(r#""foo":"bar""#), "{}", message);
}

#[tokio::test]
async fn a_rejected_login_reports_status_and_body() {
    // Arrange
    let app = spawn_bare_api().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})))
        .mount(&app.server)
        .await;

    // Act
    let error = assert_err!(acquire_token(&app.client, &app.client.settings().admin).await);

    // Assert
    assert!(matches!(error, TokenError::Rejected { .. }));
    let message = error.to_string();
    assert!(message.contains("401"), "{}", message);
    assert!(message.contains("Invalid credentials"), "{}", message);
}

#[tokio::test]
async fn the_session_authenticates_later_requests() {
    // Arrange
    let app = spawn_bare_api().await;
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/protected"))
        .and(header("Authorization", "Bearer abc"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Welcome"})))
        .expect(1)
        .mount(&app.server)
        .await;
    let session = assert_ok!(acquire_token(&app.client, &app.client.settings().admin).await);

    // Act
    let response = app
        .client
        .call(
            Method::GET,
            Endpoint::ProtectedEndpoint,
            None,
            RequestOptions::new().session(&session),
        )
        .await;

    // Assert
    let response = assert_ok!(response);
    assert_eq!(response.status_code(), 200);
}
