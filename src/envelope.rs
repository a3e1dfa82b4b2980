//! Decoders for the inconsistent response envelopes of the upstream service.
//!
//! A resource may come back flat (`{"id": ..}`), wrapped (`{"data": {"id": ..}}`)
//! or wrapped in a list (`{"data": [{"id": ..}]}`). Each shape is a separate
//! decoder; decoders are tried in a fixed order and the first hit wins.

use crate::domain::ResourceId;
use serde_json::{Map, Value};

/// Keys that may hold a resource id, in order of precedence.
pub const ID_KEYS: [&str; 3] = ["id", "_id", "category_id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdEnvelope {
    /// `{"id": ..}`
    Flat,
    /// `{"data": {"id": ..}}`
    DataObject,
    /// `{"data": [{"id": ..}, ..]}`
    DataList,
}

impl IdEnvelope {
    pub const PRECEDENCE: [IdEnvelope; 3] =
        [IdEnvelope::Flat, IdEnvelope::DataObject, IdEnvelope::DataList];

    fn object<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Map<String, Value>> {
        match self {
            IdEnvelope::Flat => Some(body),
            IdEnvelope::DataObject => body.get("data")?.as_object(),
            IdEnvelope::DataList => body.get("data")?.as_array()?.first()?.as_object(),
        }
    }

    pub fn decode(&self, body: &Map<String, Value>) -> Option<ResourceId> {
        let object = self.object(body)?;
        ID_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(ResourceId::from_json))
    }
}

/// Find the id of the resource a response describes.
pub fn extract_id(body: &Value) -> Option<ResourceId> {
    let body = body.as_object()?;
    IdEnvelope::PRECEDENCE
        .iter()
        .find_map(|envelope| envelope.decode(body))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEnvelope {
    /// `{"token": ..}`
    Token,
    /// `{"access_token": ..}`
    AccessToken,
    /// `{"data": {"token": {"access": ..}}}`
    DataTokenAccess,
}

impl TokenEnvelope {
    pub const PRECEDENCE: [TokenEnvelope; 3] = [
        TokenEnvelope::Token,
        TokenEnvelope::AccessToken,
        TokenEnvelope::DataTokenAccess,
    ];

    pub fn decode<'a>(&self, body: &'a Value) -> Option<&'a str> {
        let candidate = match self {
            TokenEnvelope::Token => body.get("token"),
            TokenEnvelope::AccessToken => body.get("access_token"),
            TokenEnvelope::DataTokenAccess => body.get("data")?.get("token")?.get("access"),
        };
        candidate?.as_str().filter(|token| !token.is_empty())
    }
}

/// Find a bearer token in a login response.
pub fn extract_token(body: &Value) -> Option<&str> {
    if !body.is_object() {
        return None;
    }
    TokenEnvelope::PRECEDENCE
        .iter()
        .find_map(|envelope| envelope.decode(body))
}

/// The entries of a list response: `data.categories`, or `data` when it is a list.
pub fn extract_collection(body: &Value) -> Option<Vec<&Value>> {
    match body.get("data")? {
        Value::Object(data) => Some(data.get("categories")?.as_array()?.iter().collect()),
        Value::Array(entries) => Some(entries.iter().collect()),
        _ => None,
    }
}

/// The resource object itself: `data` when it is a mapping, the top level otherwise.
pub fn extract_resource(body: &Value) -> Option<&Map<String, Value>> {
    let body = body.as_object()?;
    match body.get("data") {
        Some(Value::Object(data)) => Some(data),
        _ => Some(body),
    }
}

/// Whether a list response contains an entry with the given id.
pub fn collection_contains(body: &Value, id: &ResourceId) -> bool {
    extract_collection(body).is_some_and(|entries| {
        entries
            .iter()
            .filter_map(|entry| entry.as_object())
            .any(|entry| ID_KEYS.iter().any(|key| entry.get(*key).is_some_and(|v| id.matches(v))))
    })
}
