//! CRUD checks for the category resource.
//!
//! The suite creates one uniquely named category up front, runs every check
//! against it and deletes it again at the end, whatever the outcome.

use super::expectations::{
    CATEGORIES_LISTED, CATEGORY_CLEANED_UP, CATEGORY_CREATED, CATEGORY_DELETED, CATEGORY_UPDATED,
    UNAUTHENTICATED, VALIDATION_REJECTED,
};
use crate::api_client::{ApiClient, ApiResponse, RequestOptions};
use crate::authentication::{Session, acquire_token};
use crate::configuration::Endpoint;
use crate::domain::{CategoryPayload, ResourceId};
use crate::envelope::{collection_contains, extract_collection, extract_id, extract_resource};
use crate::inspection::print_api_response;
use crate::runner::{CheckOutcome, Recorder};
use crate::schema::{category_list_schema, category_schema, validate_schema};
use anyhow::{Context, anyhow};
use reqwest::Method;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const SUITE_NAME: &str = "category";

const PARALLEL_LIST_REQUESTS: usize = 10;
const PARALLEL_LIST_WORKERS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryCheck {
    PostCreateCategory,
    GetListCategories,
    PutUpdateCategory,
    DeleteCategory,
    CreateCategoryWithoutToken,
    CreateCategoryMissingName,
    ParallelListCategories,
}

impl CategoryCheck {
    /// Every check, in execution order. Deletion runs after the checks that
    /// need the category to exist.
    pub const ALL: [CategoryCheck; 7] = [
        CategoryCheck::PostCreateCategory,
        CategoryCheck::GetListCategories,
        CategoryCheck::PutUpdateCategory,
        CategoryCheck::DeleteCategory,
        CategoryCheck::CreateCategoryWithoutToken,
        CategoryCheck::CreateCategoryMissingName,
        CategoryCheck::ParallelListCategories,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CategoryCheck::PostCreateCategory => "post_create_category",
            CategoryCheck::GetListCategories => "get_list_categories",
            CategoryCheck::PutUpdateCategory => "put_update_category",
            CategoryCheck::DeleteCategory => "delete_category",
            CategoryCheck::CreateCategoryWithoutToken => "create_category_without_token",
            CategoryCheck::CreateCategoryMissingName => "create_category_missing_name",
            CategoryCheck::ParallelListCategories => "parallel_list_categories",
        }
    }

    pub async fn run(&self, client: &ApiClient, fixture: &CategoryFixture) -> anyhow::Result<()> {
        let session = fixture.session()?;
        match self {
            CategoryCheck::PostCreateCategory => {
                let created = fixture.created()?;
                let resource = ensure_echoes(&created.response, &created.payload)?;
                validate_schema(&resource, &category_schema(), "Category")?;
            }
            CategoryCheck::GetListCategories => {
                let created = fixture.created()?;
                let response = list_categories(client, session).await?;
                print_api_response(self.name(), None, &response);
                CATEGORIES_LISTED.check(&response)?;
                anyhow::ensure!(
                    response.body.has_key("data"),
                    "Unexpected list response shape: {}",
                    response.body
                );
                validate_schema(&response, &category_list_schema(), "Category list")?;
                anyhow::ensure!(
                    listed(&response, &created.id),
                    "Created category {} not found in list: {}",
                    created.id,
                    response.body
                );
            }
            CategoryCheck::PutUpdateCategory => {
                let created = fixture.created()?;
                let payload = CategoryPayload::updated();
                let response = client
                    .call(
                        Method::PUT,
                        Endpoint::UpdateCategory,
                        Some(&created.id),
                        RequestOptions::new().session(session).json(payload.to_json()),
                    )
                    .await?;
                print_api_response(self.name(), Some(&payload.to_json()), &response);
                CATEGORY_UPDATED.check(&response)?;
                ensure_echoes(&response, &payload)?;
            }
            CategoryCheck::DeleteCategory => {
                let created = fixture.created()?;
                let response = client
                    .call(
                        Method::DELETE,
                        Endpoint::DeleteCategory,
                        Some(&created.id),
                        RequestOptions::new().session(session),
                    )
                    .await?;
                print_api_response(self.name(), None, &response);
                CATEGORY_DELETED.check(&response)?;

                let listing = list_categories(client, session).await?;
                print_api_response("Verify Deletion - List Categories", None, &listing);
                CATEGORIES_LISTED.check(&listing)?;
                anyhow::ensure!(
                    listing.body.as_json().and_then(extract_collection).is_some(),
                    "Unexpected list response shape: {}",
                    listing.body
                );
                anyhow::ensure!(
                    !listed(&listing, &created.id),
                    "Deleted category {} still found in list: {}",
                    created.id,
                    listing.body
                );
            }
            CategoryCheck::CreateCategoryWithoutToken => {
                let payload = CategoryPayload::unique();
                let response = client
                    .call(
                        Method::POST,
                        Endpoint::CreateCategory,
                        None,
                        RequestOptions::new()
                            .session(session)
                            .without_auth()
                            .json(payload.to_json()),
                    )
                    .await?;
                remove_if_created(client, session, &response).await;
                UNAUTHENTICATED.check(&response)?;
            }
            CategoryCheck::CreateCategoryMissingName => {
                let payload = serde_json::json!({"description": "Category without a name"});
                let response = client
                    .call(
                        Method::POST,
                        Endpoint::CreateCategory,
                        None,
                        RequestOptions::new().session(session).json(payload),
                    )
                    .await?;
                remove_if_created(client, session, &response).await;
                VALIDATION_REJECTED.check(&response)?;
            }
            CategoryCheck::ParallelListCategories => {
                let codes = parallel_listing(
                    client,
                    session,
                    PARALLEL_LIST_REQUESTS,
                    PARALLEL_LIST_WORKERS,
                )
                .await?;
                anyhow::ensure!(
                    codes.iter().all(|code| CATEGORIES_LISTED.accepts(*code)),
                    "Not every parallel listing succeeded: {:?}",
                    codes
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreatedCategory {
    pub id: ResourceId,
    pub payload: CategoryPayload,
    pub response: ApiResponse,
}

/// Session and category shared by every check of the suite.
pub struct CategoryFixture {
    session: Result<Session, String>,
    created: Result<CreatedCategory, String>,
}

impl CategoryFixture {
    #[tracing::instrument(name = "Setting up category fixture", skip(client))]
    pub async fn setup(client: &ApiClient) -> Self {
        let session = acquire_token(client, &client.settings().admin)
            .await
            .map_err(|e| format!("{:?}", e));
        let created = match &session {
            Ok(session) => create_category(client, session)
                .await
                .map_err(|e| format!("{:?}", e)),
            Err(_) => Err("No session to create the category with.".to_string()),
        };
        Self { session, created }
    }

    pub fn session(&self) -> anyhow::Result<&Session> {
        self.session
            .as_ref()
            .map_err(|e| anyhow!("Token acquisition failed during setup:\n{}", e))
    }

    pub fn created(&self) -> anyhow::Result<&CreatedCategory> {
        self.created
            .as_ref()
            .map_err(|e| anyhow!("Category creation failed during setup:\n{}", e))
    }

    /// Delete the fixture category unless it is already gone.
    #[tracing::instrument(name = "Tearing down category fixture", skip_all)]
    pub async fn teardown(&self, client: &ApiClient) {
        let (Ok(session), Ok(created)) = (&self.session, &self.created) else {
            return;
        };
        let outcome = client
            .call(
                Method::DELETE,
                Endpoint::DeleteCategory,
                Some(&created.id),
                RequestOptions::new().session(session),
            )
            .await;
        match outcome {
            Ok(response) if CATEGORY_CLEANED_UP.accepts(response.status_code()) => {}
            Ok(response) => tracing::warn!(
                "Cleanup delete of category {} returned {}, body={}",
                created.id,
                response.status_code(),
                response.body
            ),
            Err(e) => tracing::warn!(
                error.cause_chain = ?e,
                "Cleanup delete of category {} failed",
                created.id
            ),
        }
    }
}

async fn create_category(client: &ApiClient, session: &Session) -> anyhow::Result<CreatedCategory> {
    let payload = CategoryPayload::unique();
    let response = client
        .call(
            Method::POST,
            Endpoint::CreateCategory,
            None,
            RequestOptions::new().session(session).json(payload.to_json()),
        )
        .await?;
    print_api_response("Create Category Fixture", Some(&payload.to_json()), &response);
    CATEGORY_CREATED.check(&response)?;

    let id = response
        .body
        .as_json()
        .and_then(extract_id)
        .with_context(|| format!("No category id found in creation response: {}", response.body))?;
    tracing::info!(category_id = %id, "Created fixture category");
    Ok(CreatedCategory {
        id,
        payload,
        response,
    })
}

async fn list_categories(client: &ApiClient, session: &Session) -> anyhow::Result<ApiResponse> {
    Ok(client
        .call(
            Method::POST,
            Endpoint::ListCategories,
            None,
            RequestOptions::new().session(session),
        )
        .await?)
}

fn listed(response: &ApiResponse, id: &ResourceId) -> bool {
    response
        .body
        .as_json()
        .is_some_and(|body| collection_contains(body, id))
}

/// Check that the response describes a category with the payload's fields,
/// and return that category.
fn ensure_echoes(
    response: &ApiResponse,
    payload: &CategoryPayload,
) -> anyhow::Result<serde_json::Value> {
    let resource = response
        .body
        .as_json()
        .and_then(extract_resource)
        .with_context(|| format!("Unexpected category response: {}", response.body))?;
    anyhow::ensure!(
        resource.get("name").and_then(|v| v.as_str()) == Some(payload.name.as_str()),
        "Expected name {:?}, got body: {}",
        payload.name,
        response.body
    );
    anyhow::ensure!(
        resource.get("description").and_then(|v| v.as_str()) == Some(payload.description.as_str()),
        "Expected description {:?}, got body: {}",
        payload.description,
        response.body
    );
    Ok(serde_json::Value::Object(resource.clone()))
}

/// A negative check that unexpectedly created a category must not leave it behind.
async fn remove_if_created(client: &ApiClient, session: &Session, response: &ApiResponse) {
    if !response.status.is_success() {
        return;
    }
    let Some(id) = response.body.as_json().and_then(extract_id) else {
        return;
    };
    if let Err(e) = client
        .call(
            Method::DELETE,
            Endpoint::DeleteCategory,
            Some(&id),
            RequestOptions::new().session(session),
        )
        .await
    {
        tracing::warn!(error.cause_chain = ?e, "Failed to remove stray category {}", id);
    }
}

/// List categories `requests` times over at most `workers` concurrent calls.
async fn parallel_listing(
    client: &ApiClient,
    session: &Session,
    requests: usize,
    workers: usize,
) -> anyhow::Result<Vec<u16>> {
    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();
    for _ in 0..requests {
        let client = client.clone();
        let session = session.clone();
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let response = list_categories(&client, &session).await?;
            Ok::<_, anyhow::Error>(response.status_code())
        });
    }

    let mut codes = Vec::with_capacity(requests);
    while let Some(joined) = tasks.join_next().await {
        codes.push(joined.context("Listing task panicked")??);
    }
    Ok(codes)
}

pub async fn run_suite(client: &ApiClient) -> Vec<CheckOutcome> {
    let fixture = CategoryFixture::setup(client).await;
    let mut recorder = Recorder::new(SUITE_NAME);
    for check in CategoryCheck::ALL {
        recorder.record(check.name(), check.run(client, &fixture)).await;
    }
    fixture.teardown(client).await;
    recorder.into_outcomes()
}
