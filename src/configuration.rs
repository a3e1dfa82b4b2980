use crate::domain::Credentials;
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;

/// Placeholder substituted with a resource id in single-resource endpoints.
pub const ID_PLACEHOLDER: &str = "{id}";

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_PROFILE_ENDPOINT: &str = "/user/profile";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    CreateCategory,
    ListCategories,
    UpdateCategory,
    DeleteCategory,
    ProtectedEndpoint,
    Profile,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::CreateCategory => "create_category",
            Endpoint::ListCategories => "list_categories",
            Endpoint::UpdateCategory => "update_category",
            Endpoint::DeleteCategory => "delete_category",
            Endpoint::ProtectedEndpoint => "protected_endpoint",
            Endpoint::Profile => "profile",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Endpoint `{0}` is not configured.")]
    NotConfigured(Endpoint),
    #[error("Endpoint `{0}` needs a resource id to fill its `{{id}}` placeholder.")]
    MissingId(Endpoint),
}

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration sources.")]
    Load(#[from] config::ConfigError),
    #[error("Missing mandatory setting `{0}`.")]
    Missing(&'static str),
    #[error("`REQUEST_TIMEOUT` must be at least one second.")]
    ZeroTimeout,
}

impl std::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::utils::error_chain_fmt(self, f)
    }
}

/// A path template such as `/v1/admin/business/category/{id}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointPath(String);

impl EndpointPath {
    pub fn is_templated(&self) -> bool {
        self.0.contains(ID_PLACEHOLDER)
    }

    fn render(&self, endpoint: Endpoint, id: Option<&str>) -> Result<String, EndpointError> {
        match (self.is_templated(), id) {
            (true, Some(id)) => Ok(self.0.replace(ID_PLACEHOLDER, id)),
            (true, None) => Err(EndpointError::MissingId(endpoint)),
            (false, _) => Ok(self.0.clone()),
        }
    }
}

impl AsRef<str> for EndpointPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug)]
pub struct EndpointSettings {
    pub login: EndpointPath,
    pub create_category: EndpointPath,
    pub list_categories: EndpointPath,
    pub update_category: EndpointPath,
    pub delete_category: EndpointPath,
    pub protected_endpoint: Option<EndpointPath>,
    pub profile: EndpointPath,
}

impl EndpointSettings {
    pub fn get(&self, endpoint: Endpoint) -> Option<&EndpointPath> {
        match endpoint {
            Endpoint::Login => Some(&self.login),
            Endpoint::CreateCategory => Some(&self.create_category),
            Endpoint::ListCategories => Some(&self.list_categories),
            Endpoint::UpdateCategory => Some(&self.update_category),
            Endpoint::DeleteCategory => Some(&self.delete_category),
            Endpoint::ProtectedEndpoint => self.protected_endpoint.as_ref(),
            Endpoint::Profile => Some(&self.profile),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub endpoints: EndpointSettings,
    pub admin: Credentials,
    pub wrong: Credentials,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Full URL of `endpoint`, with `id` substituted into templated paths.
    pub fn url_for(&self, endpoint: Endpoint, id: Option<&str>) -> Result<String, EndpointError> {
        let path = self
            .endpoints
            .get(endpoint)
            .ok_or(EndpointError::NotConfigured(endpoint))?;
        Ok(format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            path.render(endpoint, id)?
        ))
    }

    pub fn from_config(config: config::Config) -> Result<Self, ConfigurationError> {
        config.try_deserialize::<RawSettings>()?.try_into()
    }
}

/// Flat view of the sources, one field per environment variable.
#[derive(serde::Deserialize)]
struct RawSettings {
    base_url: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    request_timeout: u64,
    endpoint_login: Option<String>,
    endpoint_create_category: Option<String>,
    endpoint_list_categories: Option<String>,
    endpoint_update_category: Option<String>,
    endpoint_delete_category: Option<String>,
    endpoint_protected: Option<String>,
    endpoint_profile: String,
    admin_email: Option<String>,
    admin_password: Option<Secret<String>>,
    admin_role: Option<String>,
    wrong_email: String,
    wrong_password: Secret<String>,
    wrong_role: String,
}

fn required<T>(value: Option<T>, key: &'static str) -> Result<T, ConfigurationError> {
    value.ok_or(ConfigurationError::Missing(key))
}

fn required_text(value: Option<String>, key: &'static str) -> Result<String, ConfigurationError> {
    required(value.filter(|v| !v.trim().is_empty()), key)
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigurationError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let endpoint = |value: Option<String>, key| required_text(value, key).map(EndpointPath);
        if raw.request_timeout == 0 {
            return Err(ConfigurationError::ZeroTimeout);
        }
        Ok(Self {
            base_url: required_text(raw.base_url, "BASE_URL")?,
            request_timeout_seconds: raw.request_timeout,
            endpoints: EndpointSettings {
                login: endpoint(raw.endpoint_login, "ENDPOINT_LOGIN")?,
                create_category: endpoint(raw.endpoint_create_category, "ENDPOINT_CREATE_CATEGORY")?,
                list_categories: endpoint(raw.endpoint_list_categories, "ENDPOINT_LIST_CATEGORIES")?,
                update_category: endpoint(raw.endpoint_update_category, "ENDPOINT_UPDATE_CATEGORY")?,
                delete_category: endpoint(raw.endpoint_delete_category, "ENDPOINT_DELETE_CATEGORY")?,
                protected_endpoint: raw
                    .endpoint_protected
                    .filter(|p| !p.trim().is_empty())
                    .map(EndpointPath),
                profile: EndpointPath(raw.endpoint_profile),
            },
            admin: Credentials {
                email: required_text(raw.admin_email, "ADMIN_EMAIL")?,
                password: required(raw.admin_password, "ADMIN_PASSWORD")?,
                role: required_text(raw.admin_role, "ADMIN_ROLE")?,
            },
            wrong: Credentials {
                email: raw.wrong_email,
                password: raw.wrong_password,
                role: raw.wrong_role,
            },
        })
    }
}

/// Builder pre-loaded with the defaults every source is layered on top of.
pub fn default_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigurationError>
{
    Ok(config::Config::builder()
        .set_default("request_timeout", DEFAULT_REQUEST_TIMEOUT_SECONDS)?
        .set_default("endpoint_profile", DEFAULT_PROFILE_ENDPOINT)?
        .set_default("wrong_email", "")?
        .set_default("wrong_password", "")?
        .set_default("wrong_role", "")?)
}

pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment variables from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    let config_file =
        std::env::var("API_CHECKS_CONFIG").unwrap_or_else(|_| "configuration".to_string());

    let settings = default_builder()?
        .add_source(config::File::with_name(&config_file).required(false))
        // E.g. `ENDPOINT_LOGIN=/v1/auth/login` sets `Settings.endpoints.login`
        .add_source(config::Environment::default())
        .build()?;

    Settings::from_config(settings)
}
