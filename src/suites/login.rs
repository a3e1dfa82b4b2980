//! Login endpoint checks: positive, negative, edge, security and load.

use super::expectations::{
    CREDENTIALS_REJECTED, INJECTION_REJECTED, LOGIN_SUCCEEDED, METHOD_NOT_ALLOWED,
    OVERSIZED_INPUT_REJECTED, PROTECTED_ACCESS_GRANTED, SCRIPT_REJECTED, TOO_MANY_REQUESTS,
    UNAUTHENTICATED, VALIDATION_REJECTED, ensure_error_body,
};
use crate::api_client::{ApiClient, RequestOptions};
use crate::authentication::{Session, acquire_token, looks_like_jwt};
use crate::configuration::Endpoint;
use crate::domain::{Credentials, LoginPayload};
use crate::inspection::print_api_response;
use crate::runner::{CheckOutcome, Recorder};
use anyhow::{Context, anyhow};
use reqwest::Method;
use secrecy::ExposeSecret;
use serde_json::json;
use tokio::task::JoinSet;

pub const SUITE_NAME: &str = "login";

const PARALLEL_LOGINS: usize = 5;
const RATE_LIMIT_ATTEMPTS: usize = 15;
const LONG_INPUT_LENGTH: usize = 10_000;

/// Which parts of the admin credentials get replaced by the wrong ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialMix {
    WrongPassword,
    WrongEmail,
    WrongEmailAndPassword,
    WrongRole,
}

impl CredentialMix {
    pub const ALL: [CredentialMix; 4] = [
        CredentialMix::WrongPassword,
        CredentialMix::WrongEmail,
        CredentialMix::WrongEmailAndPassword,
        CredentialMix::WrongRole,
    ];

    fn label(&self) -> &'static str {
        match self {
            CredentialMix::WrongPassword => "wrong_password",
            CredentialMix::WrongEmail => "wrong_email",
            CredentialMix::WrongEmailAndPassword => "wrong_email_and_password",
            CredentialMix::WrongRole => "wrong_role",
        }
    }

    fn payload<'a>(&self, admin: &'a Credentials, wrong: &'a Credentials) -> LoginPayload<'a> {
        let mut payload = admin.payload();
        match self {
            CredentialMix::WrongPassword => {
                payload.password = Some(wrong.password.expose_secret().as_str());
            }
            CredentialMix::WrongEmail => payload.email = Some(wrong.email.as_str()),
            CredentialMix::WrongEmailAndPassword => {
                payload.email = Some(wrong.email.as_str());
                payload.password = Some(wrong.password.expose_secret().as_str());
            }
            CredentialMix::WrongRole => payload.role = Some(wrong.role.as_str()),
        }
        payload
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingField {
    Password,
    Email,
    Everything,
    NullValues,
}

impl MissingField {
    pub const ALL: [MissingField; 4] = [
        MissingField::Password,
        MissingField::Email,
        MissingField::Everything,
        MissingField::NullValues,
    ];

    fn label(&self) -> &'static str {
        match self {
            MissingField::Password => "missing_password",
            MissingField::Email => "missing_email",
            MissingField::Everything => "empty_object",
            MissingField::NullValues => "null_values",
        }
    }

    fn payload(&self, admin: &Credentials) -> serde_json::Value {
        match self {
            MissingField::Password => json!({"email": admin.email}),
            MissingField::Email => json!({"password": admin.password.expose_secret()}),
            MissingField::Everything => json!({}),
            MissingField::NullValues => json!({"email": null, "password": null}),
        }
    }
}

/// Methods the login endpoint must refuse.
pub const REFUSED_METHODS: [&str; 4] = ["GET", "PUT", "DELETE", "PATCH"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginCheck {
    SuccessToken,
    TokenAllowsAccessToProtectedEndpoint,
    InvalidCredentials(CredentialMix),
    MissingFields(MissingField),
    InvalidEmailFormat,
    EmptyBody,
    LongInput,
    InvalidMethod(Method),
    SqlInjectionAttempt,
    XssPayloadAttempt,
    ProtectedEndpointWithoutToken,
    ProtectedEndpointWithTamperedToken,
    MultipleParallelLogins,
    RateLimit,
}

impl LoginCheck {
    /// Every check, in execution order.
    pub fn all() -> Vec<LoginCheck> {
        let mut checks = vec![
            LoginCheck::SuccessToken,
            LoginCheck::TokenAllowsAccessToProtectedEndpoint,
        ];
        checks.extend(CredentialMix::ALL.map(LoginCheck::InvalidCredentials));
        checks.extend(MissingField::ALL.map(LoginCheck::MissingFields));
        checks.extend([
            LoginCheck::InvalidEmailFormat,
            LoginCheck::EmptyBody,
            LoginCheck::LongInput,
        ]);
        checks.extend(
            REFUSED_METHODS
                .iter()
                .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
                .map(LoginCheck::InvalidMethod),
        );
        checks.extend([
            LoginCheck::SqlInjectionAttempt,
            LoginCheck::XssPayloadAttempt,
            LoginCheck::ProtectedEndpointWithoutToken,
            LoginCheck::ProtectedEndpointWithTamperedToken,
            LoginCheck::MultipleParallelLogins,
            LoginCheck::RateLimit,
        ]);
        checks
    }

    pub fn name(&self) -> String {
        match self {
            LoginCheck::SuccessToken => "login_success_token".into(),
            LoginCheck::TokenAllowsAccessToProtectedEndpoint => {
                "token_allows_access_to_protected_endpoint".into()
            }
            LoginCheck::InvalidCredentials(mix) => {
                format!("login_invalid_credentials[{}]", mix.label())
            }
            LoginCheck::MissingFields(field) => format!("login_missing_fields[{}]", field.label()),
            LoginCheck::InvalidEmailFormat => "login_invalid_email_format".into(),
            LoginCheck::EmptyBody => "login_empty_body".into(),
            LoginCheck::LongInput => "login_long_input".into(),
            LoginCheck::InvalidMethod(method) => {
                format!("login_invalid_methods[{}]", method.as_str().to_lowercase())
            }
            LoginCheck::SqlInjectionAttempt => "sql_injection_attempt".into(),
            LoginCheck::XssPayloadAttempt => "xss_payload_attempt".into(),
            LoginCheck::ProtectedEndpointWithoutToken => "protected_endpoint_without_token".into(),
            LoginCheck::ProtectedEndpointWithTamperedToken => {
                "protected_endpoint_with_tampered_token".into()
            }
            LoginCheck::MultipleParallelLogins => "multiple_parallel_logins".into(),
            LoginCheck::RateLimit => "rate_limit".into(),
        }
    }

    pub async fn run(&self, client: &ApiClient, fixture: &LoginFixture) -> anyhow::Result<()> {
        let settings = client.settings();
        match self {
            LoginCheck::SuccessToken => {
                let session = fixture.session()?;
                let token = session.token().expose_secret();
                anyhow::ensure!(looks_like_jwt(token), "Invalid JWT format: {}", token);
            }
            LoginCheck::TokenAllowsAccessToProtectedEndpoint => {
                let session = fixture.session()?;
                let response = client
                    .call(
                        Method::GET,
                        Endpoint::ProtectedEndpoint,
                        None,
                        RequestOptions::new().session(session),
                    )
                    .await?;
                print_api_response(&self.name(), None, &response);
                PROTECTED_ACCESS_GRANTED.check(&response)?;
            }
            LoginCheck::InvalidCredentials(mix) => {
                let payload = mix.payload(&settings.admin, &settings.wrong).to_json();
                let response = login(client, RequestOptions::new().json(payload.clone())).await?;
                print_api_response(&self.name(), Some(&payload), &response);
                CREDENTIALS_REJECTED.check(&response)?;
                ensure_error_body(&response)?;
            }
            LoginCheck::MissingFields(field) => {
                let payload = field.payload(&settings.admin);
                let response = login(client, RequestOptions::new().json(payload)).await?;
                VALIDATION_REJECTED.check(&response)?;
                ensure_error_body(&response)?;
            }
            LoginCheck::InvalidEmailFormat => {
                let payload = LoginPayload {
                    email: Some("invalid_email"),
                    password: Some("1234"),
                    role: Some(settings.admin.role.as_str()),
                };
                let response = login(client, RequestOptions::new().json(payload.to_json())).await?;
                VALIDATION_REJECTED.check(&response)?;
            }
            LoginCheck::EmptyBody => {
                let response = login(client, RequestOptions::new().raw_body("")).await?;
                VALIDATION_REJECTED.check(&response)?;
            }
            LoginCheck::LongInput => {
                let email = format!("{}@example.com", "a".repeat(LONG_INPUT_LENGTH));
                let password = "b".repeat(LONG_INPUT_LENGTH);
                let payload = LoginPayload {
                    email: Some(email.as_str()),
                    password: Some(password.as_str()),
                    role: Some(settings.admin.role.as_str()),
                };
                let response = login(client, RequestOptions::new().json(payload.to_json())).await?;
                OVERSIZED_INPUT_REJECTED.check(&response)?;
            }
            LoginCheck::InvalidMethod(method) => {
                let response = client
                    .call(method.clone(), Endpoint::Login, None, RequestOptions::new())
                    .await?;
                METHOD_NOT_ALLOWED.check(&response)?;
            }
            LoginCheck::SqlInjectionAttempt => {
                let response = login_as(client, "' OR 1=1 --", &settings.admin.role).await?;
                INJECTION_REJECTED.check(&response)?;
            }
            LoginCheck::XssPayloadAttempt => {
                let response =
                    login_as(client, "<script>alert(1)</script>", &settings.admin.role).await?;
                SCRIPT_REJECTED.check(&response)?;
            }
            LoginCheck::ProtectedEndpointWithoutToken => {
                let response = client
                    .call(Method::GET, Endpoint::Profile, None, RequestOptions::new())
                    .await?;
                UNAUTHENTICATED.check(&response)?;
            }
            LoginCheck::ProtectedEndpointWithTamperedToken => {
                let tampered = fixture.session()?.tampered()?;
                let response = client
                    .call(
                        Method::GET,
                        Endpoint::Profile,
                        None,
                        RequestOptions::new().session(&tampered),
                    )
                    .await?;
                UNAUTHENTICATED.check(&response)?;
            }
            LoginCheck::MultipleParallelLogins => {
                let codes = parallel_logins(client, PARALLEL_LOGINS).await?;
                anyhow::ensure!(
                    codes.iter().all(|code| LOGIN_SUCCEEDED.accepts(*code)),
                    "Not every parallel login succeeded: {:?}",
                    codes
                );
            }
            LoginCheck::RateLimit => {
                let mut codes = Vec::with_capacity(RATE_LIMIT_ATTEMPTS);
                for _ in 0..RATE_LIMIT_ATTEMPTS {
                    let payload = settings.admin.payload().to_json();
                    let response = login(client, RequestOptions::new().json(payload)).await?;
                    codes.push(response.status_code());
                }
                anyhow::ensure!(
                    codes.contains(&TOO_MANY_REQUESTS)
                        || codes.iter().all(|code| LOGIN_SUCCEEDED.accepts(*code)),
                    "Expected a 429 or only successful logins, got {:?}",
                    codes
                );
            }
        }
        Ok(())
    }
}

/// Session shared by every check of the suite.
pub struct LoginFixture {
    session: Result<Session, String>,
}

impl LoginFixture {
    pub async fn setup(client: &ApiClient) -> Self {
        let session = acquire_token(client, &client.settings().admin)
            .await
            .map_err(|e| format!("{:?}", e));
        Self { session }
    }

    pub fn session(&self) -> anyhow::Result<&Session> {
        self.session
            .as_ref()
            .map_err(|e| anyhow!("Token acquisition failed during setup:\n{}", e))
    }
}

async fn login(
    client: &ApiClient,
    options: RequestOptions,
) -> anyhow::Result<crate::api_client::ApiResponse> {
    Ok(client.call(Method::POST, Endpoint::Login, None, options).await?)
}

async fn login_as(
    client: &ApiClient,
    email: &str,
    role: &str,
) -> anyhow::Result<crate::api_client::ApiResponse> {
    let payload = LoginPayload {
        email: Some(email),
        password: Some("x"),
        role: Some(role),
    };
    login(client, RequestOptions::new().json(payload.to_json())).await
}

/// Fire `count` admin logins at once and collect their status codes.
async fn parallel_logins(client: &ApiClient, count: usize) -> anyhow::Result<Vec<u16>> {
    let mut tasks = JoinSet::new();
    for _ in 0..count {
        let client = client.clone();
        tasks.spawn(async move {
            let payload = client.settings().admin.payload().to_json();
            login(&client, RequestOptions::new().json(payload))
                .await
                .map(|response| response.status_code())
        });
    }

    let mut codes = Vec::with_capacity(count);
    while let Some(joined) = tasks.join_next().await {
        codes.push(joined.context("Login task panicked")??);
    }
    Ok(codes)
}

pub async fn run_suite(client: &ApiClient) -> Vec<CheckOutcome> {
    let fixture = LoginFixture::setup(client).await;
    let mut recorder = Recorder::new(SUITE_NAME);
    for check in LoginCheck::all() {
        recorder.record(check.name(), check.run(client, &fixture)).await;
    }
    recorder.into_outcomes()
}
