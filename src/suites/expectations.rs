//! Accepted status codes for every check, in one place.

use crate::api_client::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedStatus {
    pub outcome: &'static str,
    pub codes: &'static [u16],
}

impl ExpectedStatus {
    pub const fn new(outcome: &'static str, codes: &'static [u16]) -> Self {
        Self { outcome, codes }
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.codes.contains(&status)
    }

    /// Fail with the status and the full body unless the status is accepted.
    pub fn check(&self, response: &ApiResponse) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.accepts(response.status_code()),
            "Expected {} ({:?}), got {} with body: {}",
            self.outcome,
            self.codes,
            response.status_code(),
            response.body
        );
        Ok(())
    }
}

pub const LOGIN_SUCCEEDED: ExpectedStatus = ExpectedStatus::new("a successful login", &[200]);

pub const PROTECTED_ACCESS_GRANTED: ExpectedStatus =
    ExpectedStatus::new("access granted or no data", &[200, 404]);

pub const CREDENTIALS_REJECTED: ExpectedStatus =
    ExpectedStatus::new("rejected credentials", &[400, 401, 403]);

pub const VALIDATION_REJECTED: ExpectedStatus =
    ExpectedStatus::new("a validation error", &[400, 422]);

pub const OVERSIZED_INPUT_REJECTED: ExpectedStatus =
    ExpectedStatus::new("oversized input rejected", &[400, 413]);

pub const METHOD_NOT_ALLOWED: ExpectedStatus = ExpectedStatus::new("method not allowed", &[405]);

pub const INJECTION_REJECTED: ExpectedStatus =
    ExpectedStatus::new("injection payload rejected", &[400, 401, 403]);

pub const SCRIPT_REJECTED: ExpectedStatus =
    ExpectedStatus::new("script payload rejected", &[400, 401, 422]);

pub const UNAUTHENTICATED: ExpectedStatus =
    ExpectedStatus::new("an authentication failure", &[401, 403]);

pub const CATEGORY_CREATED: ExpectedStatus = ExpectedStatus::new("category created", &[200, 201]);

pub const CATEGORIES_LISTED: ExpectedStatus = ExpectedStatus::new("categories listed", &[200]);

pub const CATEGORY_UPDATED: ExpectedStatus = ExpectedStatus::new("category updated", &[200, 201]);

pub const CATEGORY_DELETED: ExpectedStatus = ExpectedStatus::new("category deleted", &[200, 204]);

/// Deletion during teardown also tolerates a category that is already gone.
pub const CATEGORY_CLEANED_UP: ExpectedStatus =
    ExpectedStatus::new("category cleaned up", &[200, 204, 404]);

pub const TOO_MANY_REQUESTS: u16 = 429;

/// Error responses must say what went wrong.
pub fn ensure_error_body(response: &ApiResponse) -> anyhow::Result<()> {
    anyhow::ensure!(
        response.body.has_key("error") || response.body.has_key("message"),
        "No error/message key found in response body: {}",
        response.body
    );
    Ok(())
}
