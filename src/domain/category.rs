use uuid::Uuid;

pub const CATEGORY_NAME_PREFIX: &str = "Automation Test Category";

/// Body of a create or update category request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPayload {
    pub name: String,
    pub description: String,
}

impl CategoryPayload {
    /// A category whose name will not collide with leftovers of earlier runs.
    pub fn unique() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            name: format!("{} {}", CATEGORY_NAME_PREFIX, &suffix[..8]),
            description: "Created by Automation Test Suite".to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({"name": self.name, "description": self.description})
    }

    pub fn updated() -> Self {
        Self {
            name: "Updated Automation Category".to_string(),
            description: "Updated by automation checks".to_string(),
        }
    }
}
