//! Debug rendering of request/response pairs.

use crate::api_client::{ApiResponse, ResponseBody};
use reqwest::StatusCode;
use serde_json::Value;
use std::borrow::Cow;

const RULE: &str = "------------------------------------------------";

/// Anything a check may want to inspect: a whole response, a body, parsed
/// JSON or raw text.
#[derive(Debug, Clone, Copy)]
pub enum BodyView<'a> {
    Response(&'a ApiResponse),
    Body(&'a ResponseBody),
    Json(&'a Value),
    Text(&'a str),
}

impl<'a> BodyView<'a> {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BodyView::Response(response) => Some(response.status),
            _ => None,
        }
    }

    /// The body as JSON, parsing text when needed.
    pub fn to_json(&self) -> Result<Cow<'a, Value>, serde_json::Error> {
        match *self {
            BodyView::Response(ApiResponse { body, .. }) | BodyView::Body(body) => match body {
                ResponseBody::Json(json) => Ok(Cow::Borrowed(json)),
                ResponseBody::Text(text) => serde_json::from_str(text).map(Cow::Owned),
            },
            BodyView::Json(json) => Ok(Cow::Borrowed(json)),
            BodyView::Text(text) => serde_json::from_str(text).map(Cow::Owned),
        }
    }

    fn pretty(&self) -> String {
        match self.to_json() {
            Ok(json) => serde_json::to_string_pretty(json.as_ref()).unwrap_or_else(|_| json.to_string()),
            Err(_) => match *self {
                BodyView::Response(ApiResponse { body, .. }) | BodyView::Body(body) => {
                    body.to_string()
                }
                BodyView::Json(json) => json.to_string(),
                BodyView::Text(text) => text.to_owned(),
            },
        }
    }
}

impl<'a> From<&'a ApiResponse> for BodyView<'a> {
    fn from(response: &'a ApiResponse) -> Self {
        BodyView::Response(response)
    }
}

impl<'a> From<&'a ResponseBody> for BodyView<'a> {
    fn from(body: &'a ResponseBody) -> Self {
        BodyView::Body(body)
    }
}

impl<'a> From<&'a Value> for BodyView<'a> {
    fn from(json: &'a Value) -> Self {
        BodyView::Json(json)
    }
}

impl<'a> From<&'a str> for BodyView<'a> {
    fn from(text: &'a str) -> Self {
        BodyView::Text(text)
    }
}

pub fn render_api_response<'a>(
    test_name: &str,
    payload: Option<&Value>,
    response: impl Into<BodyView<'a>>,
) -> String {
    let response = response.into();
    let payload = payload.map_or_else(|| "None".to_string(), |p| p.to_string());
    let mut rendered = format!("\n{RULE}\n{test_name}\n   Payload : {payload}\n");
    if let Some(status) = response.status() {
        rendered.push_str(&format!("   → Response Code : {}\n", status.as_u16()));
    }
    rendered.push_str(&format!("   → Response Body : {}\n{RULE}", response.pretty()));
    rendered
}

/// Print a request/response pair for debugging and return the rendering.
///
/// Output goes to stdout, so the test harness only shows it for failing tests.
pub fn print_api_response<'a>(
    test_name: &str,
    payload: Option<&Value>,
    response: impl Into<BodyView<'a>>,
) -> String {
    let rendered = render_api_response(test_name, payload, response);
    tracing::debug!(check = test_name, "{}", rendered);
    println!("{}", rendered);
    rendered
}
