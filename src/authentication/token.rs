use super::Session;
use crate::api_client::{ApiClient, RequestError, RequestOptions, ResponseBody};
use crate::configuration::{Endpoint, EndpointError};
use crate::domain::Credentials;
use crate::envelope::extract_token;
use reqwest::{Method, StatusCode};

#[derive(thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("Login failed with status {status}: {body}")]
    Rejected { status: StatusCode, body: ResponseBody },
    #[error("Login failed: token missing in response: {body}")]
    MissingToken { body: ResponseBody },
    #[error("Login returned a token that cannot be sent as a header.")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),
}

impl std::fmt::Debug for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::utils::error_chain_fmt(self, f)
    }
}

/// Log in with `credentials` and return a session carrying the bearer token.
#[tracing::instrument(
    name = "Acquiring token",
    skip(client, credentials),
    fields(email = %credentials.email, role = %credentials.role)
)]
pub async fn acquire_token(
    client: &ApiClient,
    credentials: &Credentials,
) -> Result<Session, TokenError> {
    let url = client.url_for(Endpoint::Login, None)?;
    let response = client
        .safe_request(
            Method::POST,
            &url,
            RequestOptions::new().json(credentials.payload().to_json()),
        )
        .await?;

    if !response.status.is_success() {
        return Err(TokenError::Rejected {
            status: response.status,
            body: response.body,
        });
    }

    let token = response
        .body
        .as_json()
        .and_then(extract_token)
        .map(str::to_owned);
    let Some(token) = token else {
        return Err(TokenError::MissingToken {
            body: response.body,
        });
    };

    let session = Session::from_token(token).map_err(TokenError::InvalidToken)?;
    tracing::info!("Token generated successfully and added to session headers.");
    Ok(session)
}
