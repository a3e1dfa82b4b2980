use secrecy::{ExposeSecret, Secret};

#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
    pub role: String,
}

impl Credentials {
    pub fn payload(&self) -> LoginPayload<'_> {
        LoginPayload {
            email: Some(self.email.as_str()),
            password: Some(self.password.expose_secret().as_str()),
            role: Some(self.role.as_str()),
        }
    }
}

/// Body of a login request.
///
/// Every field is optional so that negative checks can drop or null them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoginPayload<'a> {
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub role: Option<&'a str>,
}

impl LoginPayload<'_> {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password,
            "role": self.role,
        })
    }
}
