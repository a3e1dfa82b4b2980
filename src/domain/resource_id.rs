/// Identifier of a remote resource, as found in a response envelope.
///
/// Services return ids as strings or numbers; both are kept in their
/// textual form so they can be substituted into endpoint templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    /// Accepts non-empty strings and non-zero numbers.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Whether `value` denotes the same id, regardless of string/number encoding.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        Self::from_json(value).is_some_and(|other| other == *self)
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
