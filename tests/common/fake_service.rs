//! In-memory stand-in for the API under test, served through `wiremock`.

use fake::Fake;
use fake::faker::internet::en::{Password, SafeEmail};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use wiremock::{Request, Respond, ResponseTemplate};

pub const LOGIN_PATH: &str = "/v1/auth/login";
pub const CATEGORIES_PATH: &str = "/v1/categories";
pub const LIST_CATEGORIES_PATH: &str = "/v1/categories/list";
pub const PROTECTED_PATH: &str = "/v1/protected";
pub const PROFILE_PATH: &str = "/user/profile";

const MAX_FIELD_LENGTH: usize = 1_000;

/// Where the login response puts the token.
#[derive(Clone, Copy, Debug, Default)]
pub enum TokenShape {
    #[default]
    Token,
    AccessToken,
    DataTokenAccess,
}

impl TokenShape {
    pub fn envelope(&self, token: &str) -> Value {
        match self {
            TokenShape::Token => json!({"token": token}),
            TokenShape::AccessToken => json!({"access_token": token, "token_type": "bearer"}),
            TokenShape::DataTokenAccess => json!({
                "success": true,
                "data": {"token": {"access": token, "refresh": "r"}}
            }),
        }
    }
}

/// Where the list response puts the categories.
#[derive(Clone, Copy, Debug, Default)]
pub enum ListEnvelope {
    #[default]
    DataCategories,
    DataList,
    /// A key no client knows about.
    DataItems,
}

impl ListEnvelope {
    fn wrap(&self, categories: Vec<Value>) -> Value {
        match self {
            ListEnvelope::DataCategories => json!({"data": {"categories": categories}}),
            ListEnvelope::DataList => json!({"data": categories}),
            ListEnvelope::DataItems => json!({"data": {"items": categories}}),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FakeServiceOptions {
    pub token_shape: TokenShape,
    /// Whether updates answer with the stored category or a bare message.
    pub echo_updates: bool,
    pub list_envelope: ListEnvelope,
    /// Accept creates without a token or a name.
    pub lenient_creates: bool,
    /// Successful logins allowed before every further one gets a 429.
    pub login_limit: Option<usize>,
}

impl Default for FakeServiceOptions {
    fn default() -> Self {
        Self {
            token_shape: TokenShape::default(),
            echo_updates: true,
            list_envelope: ListEnvelope::default(),
            lenient_creates: false,
            login_limit: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Clone, Debug)]
struct StoredCategory {
    name: String,
    description: Value,
}

#[derive(Default)]
struct Store {
    next_id: u64,
    logins: usize,
    throttled_logins: usize,
    categories: BTreeMap<u64, StoredCategory>,
}

#[derive(Clone)]
pub struct FakeService {
    options: FakeServiceOptions,
    admin: AdminAccount,
    token: String,
    store: Arc<Mutex<Store>>,
}

impl FakeService {
    pub fn new(options: FakeServiceOptions) -> Self {
        let admin = AdminAccount {
            email: SafeEmail().fake(),
            password: Password(12..20).fake(),
            role: "ADMIN".into(),
        };
        let token = format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        Self {
            options,
            admin,
            token,
            store: Arc::new(Mutex::new(Store::default())),
        }
    }

    pub fn admin(&self) -> &AdminAccount {
        &self.admin
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn category_count(&self) -> usize {
        self.store.lock().unwrap().categories.len()
    }

    pub fn throttled_logins(&self) -> usize {
        self.store.lock().unwrap().throttled_logins
    }

    fn authorized(&self, request: &Request) -> bool {
        request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == format!("Bearer {}", self.token))
    }

    fn login(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return message(400, "Request body must be JSON");
        };
        let field = |key: &str| body.get(key).and_then(Value::as_str);
        let (Some(email), Some(password)) = (field("email"), field("password")) else {
            return message(400, "email and password are required");
        };
        if email.len() > MAX_FIELD_LENGTH || password.len() > MAX_FIELD_LENGTH {
            return message(413, "Payload too large");
        }
        if !email.contains('@') {
            return message(400, "email is not valid");
        }
        let role_matches = field("role").is_none_or(|role| role == self.admin.role);
        if email != self.admin.email || password != self.admin.password || !role_matches {
            return ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"}));
        }
        let mut store = self.store.lock().unwrap();
        if self.options.login_limit.is_some_and(|limit| store.logins >= limit) {
            store.throttled_logins += 1;
            return message(429, "Too many requests");
        }
        store.logins += 1;
        ResponseTemplate::new(200).set_body_json(self.options.token_shape.envelope(&self.token))
    }

    fn create(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return message(400, "Request body must be JSON");
        };
        let name = body.get("name").and_then(Value::as_str).unwrap_or_default();
        if name.is_empty() && !self.options.lenient_creates {
            return message(422, "name is required");
        }
        let category = StoredCategory {
            name: name.to_owned(),
            description: body.get("description").cloned().unwrap_or(Value::Null),
        };
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = store.next_id;
        let data = category_json(id, &category);
        store.categories.insert(id, category);
        ResponseTemplate::new(201).set_body_json(json!({"message": "Category created", "data": data}))
    }

    fn list(&self) -> ResponseTemplate {
        let store = self.store.lock().unwrap();
        let categories: Vec<Value> = store
            .categories
            .iter()
            .map(|(id, category)| category_json(*id, category))
            .collect();
        ResponseTemplate::new(200).set_body_json(self.options.list_envelope.wrap(categories))
    }

    fn update(&self, id: u64, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return message(400, "Request body must be JSON");
        };
        let mut store = self.store.lock().unwrap();
        let Some(category) = store.categories.get_mut(&id) else {
            return message(404, "Category not found");
        };
        if let Some(name) = body.get("name").and_then(Value::as_str) {
            category.name = name.to_owned();
        }
        if let Some(description) = body.get("description") {
            category.description = description.clone();
        }
        if self.options.echo_updates {
            ResponseTemplate::new(200).set_body_json(json!({"data": category_json(id, category)}))
        } else {
            message(200, "Category updated")
        }
    }

    fn delete(&self, id: u64) -> ResponseTemplate {
        match self.store.lock().unwrap().categories.remove(&id) {
            Some(_) => message(200, "Category deleted"),
            None => message(404, "Category not found"),
        }
    }
}

impl Respond for FakeService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request.url.path();
        let method = request.method.as_str();

        if path == LOGIN_PATH {
            return match method {
                "POST" => self.login(request),
                _ => message(405, "Method not allowed"),
            };
        }
        let lenient_create =
            self.options.lenient_creates && method == "POST" && path == CATEGORIES_PATH;
        if !lenient_create && !self.authorized(request) {
            return message(401, "Unauthorized");
        }

        match (method, path) {
            ("GET", PROTECTED_PATH) => message(200, "Welcome"),
            ("GET", PROFILE_PATH) => ResponseTemplate::new(200)
                .set_body_json(json!({"data": {"email": self.admin.email, "role": self.admin.role}})),
            ("POST", CATEGORIES_PATH) => self.create(request),
            ("POST", LIST_CATEGORIES_PATH) => self.list(),
            (method, path) => {
                let id = path
                    .strip_prefix(CATEGORIES_PATH)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .and_then(|id| id.parse::<u64>().ok());
                match (method, id) {
                    ("PUT", Some(id)) => self.update(id, request),
                    ("DELETE", Some(id)) => self.delete(id),
                    _ => message(404, "Not found"),
                }
            }
        }
    }
}

fn message(status: u16, text: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"message": text}))
}

fn category_json(id: u64, category: &StoredCategory) -> Value {
    json!({"id": id, "name": category.name, "description": category.description})
}
