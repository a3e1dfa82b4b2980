use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use secrecy::{ExposeSecret, Secret};

/// Authenticated context for a run of checks.
///
/// Holds the bearer token and the default headers derived from it. Every
/// request that should be authenticated is handed the session explicitly.
#[derive(Clone, Debug)]
pub struct Session {
    token: Secret<String>,
    authorization: HeaderValue,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self, InvalidHeaderValue> {
        let token = token.into();
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))?;
        authorization.set_sensitive(true);
        Ok(Self {
            token: Secret::new(token),
            authorization,
        })
    }

    pub fn token(&self) -> &Secret<String> {
        &self.token
    }

    /// `Authorization: Bearer <token>` and `Content-Type: application/json`.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// A copy whose token has been altered, for rejection checks.
    pub fn tampered(&self) -> Result<Self, InvalidHeaderValue> {
        Self::from_token(format!("{}abc", self.token.expose_secret()))
    }
}

/// Whether `token` has the `header.payload.signature` shape of a JWT.
pub fn looks_like_jwt(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}
