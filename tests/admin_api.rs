use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use mailyard::application::{
    admin::{settings::AdminSettingsService, users::AdminUserService},
    kv::KvStore,
    pagination::{OffsetPage, OffsetRequest},
    repos::{
        AddressesRepo, CreateUserParams, HealthRepo, RepoError, SettingsRepo, UserQueryFilter,
        UsersRepo, UsersWriteRepo,
    },
    roles::{RoleCatalog, UserRoleDefinition},
};
use mailyard::domain::entities::{AddressRecord, SettingRecord, UserListRecord};
use mailyard::infra::{
    http::{AdminState, build_admin_router},
    kv::MemoryKvStore,
};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tower::ServiceExt;

#[derive(Debug, Clone)]
struct StoredUser {
    email: String,
    password: String,
    user_info: Value,
}

#[derive(Default)]
struct MemoryStore {
    users: Mutex<BTreeMap<i64, StoredUser>>,
    roles: Mutex<BTreeMap<i64, String>>,
    bindings: Mutex<Vec<(i64, AddressRecord)>>,
    settings: Mutex<Option<SettingRecord>>,
    role_writes: Mutex<usize>,
    unhealthy: bool,
    fail_writes: bool,
}

impl MemoryStore {
    fn check_writable(&self) -> Result<(), RepoError> {
        if self.fail_writes {
            return Err(RepoError::from_persistence("disk full"));
        }
        Ok(())
    }
}

#[async_trait]
impl UsersRepo for MemoryStore {
    async fn list_users(
        &self,
        filter: &UserQueryFilter,
        page: OffsetRequest,
    ) -> Result<OffsetPage<UserListRecord>, RepoError> {
        let users = self.users.lock().unwrap();
        let roles = self.roles.lock().unwrap();
        let bindings = self.bindings.lock().unwrap();
        let needle = filter.email.as_ref().map(|needle| needle.to_lowercase());

        let matching: Vec<(&i64, &StoredUser)> = users
            .iter()
            .rev()
            .filter(|(_, user)| {
                needle
                    .as_ref()
                    .is_none_or(|needle| user.email.to_lowercase().contains(needle))
            })
            .collect();
        let count = matching.len() as i64;
        let now = OffsetDateTime::now_utc();

        let results = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|(id, user)| UserListRecord {
                id: *id,
                user_email: user.email.clone(),
                created_at: now,
                updated_at: now,
                role_text: roles.get(id).cloned(),
                address_count: bindings.iter().filter(|(owner, _)| owner == id).count() as i64,
            })
            .collect();

        Ok(OffsetPage::new(results, count))
    }
}

#[async_trait]
impl UsersWriteRepo for MemoryStore {
    async fn create_user(&self, params: CreateUserParams) -> Result<i64, RepoError> {
        self.check_writable()?;
        let mut users = self.users.lock().unwrap();
        if users.values().any(|user| user.email == params.email) {
            return Err(RepoError::Duplicate {
                constraint: "users_user_email_key".into(),
            });
        }
        let id = users.keys().next_back().copied().unwrap_or(0) + 1;
        users.insert(
            id,
            StoredUser {
                email: params.email,
                password: params.password,
                user_info: params.user_info,
            },
        );
        Ok(id)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), RepoError> {
        self.check_writable()?;
        self.bindings
            .lock()
            .unwrap()
            .retain(|(owner, _)| *owner != user_id);
        self.roles.lock().unwrap().remove(&user_id);
        self.users.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn update_password(&self, user_id: i64, password: &str) -> Result<(), RepoError> {
        self.check_writable()?;
        if let Some(user) = self.users.lock().unwrap().get_mut(&user_id) {
            user.password = password.to_string();
        }
        Ok(())
    }

    async fn upsert_role(&self, user_id: i64, role_text: &str) -> Result<(), RepoError> {
        self.check_writable()?;
        *self.role_writes.lock().unwrap() += 1;
        self.roles
            .lock()
            .unwrap()
            .insert(user_id, role_text.to_string());
        Ok(())
    }

    async fn clear_role(&self, user_id: i64) -> Result<(), RepoError> {
        self.check_writable()?;
        *self.role_writes.lock().unwrap() += 1;
        self.roles.lock().unwrap().remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl AddressesRepo for MemoryStore {
    async fn list_bound_addresses(&self, user_id: i64) -> Result<Vec<AddressRecord>, RepoError> {
        let mut addresses: Vec<AddressRecord> = self
            .bindings
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, address)| address.clone())
            .collect();
        addresses.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(addresses)
    }
}

#[async_trait]
impl SettingsRepo for MemoryStore {
    async fn load_setting(&self, key: &str) -> Result<Option<SettingRecord>, RepoError> {
        let stored = self.settings.lock().unwrap();
        Ok(stored.clone().filter(|record| record.key == key))
    }

    async fn save_setting(&self, key: &str, value: Value) -> Result<SettingRecord, RepoError> {
        self.check_writable()?;
        let mut stored = self.settings.lock().unwrap();
        let record = SettingRecord {
            key: key.to_string(),
            value,
            version: stored.as_ref().map_or(1, |record| record.version + 1),
            updated_at: OffsetDateTime::now_utc(),
        };
        *stored = Some(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.unhealthy {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }
}

struct Harness {
    router: Router,
    store: Arc<MemoryStore>,
}

fn harness_with(store: MemoryStore, with_kv: bool) -> Harness {
    let store = Arc::new(store);
    let kv: Option<Arc<dyn KvStore>> =
        with_kv.then(|| Arc::new(MemoryKvStore::new()) as Arc<dyn KvStore>);
    let domains: Arc<[String]> = vec!["mail.test".to_string(), "alt.test".to_string()].into();
    let roles = RoleCatalog::new(vec![
        UserRoleDefinition {
            role: "vip".into(),
        },
        UserRoleDefinition {
            role: "admin".into(),
        },
    ])
    .expect("role catalog");

    let state = AdminState {
        health: store.clone(),
        settings: Arc::new(AdminSettingsService::new(store.clone(), kv, domains)),
        users: Arc::new(AdminUserService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(roles),
        )),
    };

    Harness {
        router: build_admin_router(state),
        store,
    }
}

fn harness() -> Harness {
    harness_with(MemoryStore::default(), true)
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, String) {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
    }

    async fn create_user(&self, email: &str) -> i64 {
        let (status, body) = self
            .json(
                Method::POST,
                "/admin/users",
                json!({ "email": email, "password": "secret" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let users = self.store.users.lock().unwrap();
        users
            .iter()
            .find(|(_, user)| user.email == email)
            .map(|(id, _)| *id)
            .expect("created user")
    }
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("json body")
}

fn address(id: i64, name: &str, mail_count: i64) -> AddressRecord {
    let now = OffsetDateTime::now_utc();
    AddressRecord {
        id,
        name: name.to_string(),
        created_at: now,
        updated_at: now,
        mail_count,
        send_count: 0,
    }
}

#[tokio::test]
async fn settings_default_when_nothing_saved() {
    let harness = harness();
    let (status, body) = harness.get("/admin/user_settings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["maxAddressCount"], 5);
}

#[tokio::test]
async fn saved_settings_are_returned_verbatim() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_settings",
            json!({
                "enable": true,
                "enableMailVerify": true,
                "verifyMailSender": "noreply@mail.test",
                "enableMailAllowList": true,
                "mailAllowList": ["gmail.com"],
                "maxAddressCount": 0,
                "registerNotice": "hello"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(parse(&body), json!({ "success": true }));

    let (_, body) = harness.get("/admin/user_settings").await;
    let settings = parse(&body);
    assert_eq!(settings["maxAddressCount"], 0);
    assert_eq!(settings["mailAllowList"], json!(["gmail.com"]));
    assert_eq!(settings["registerNotice"], "hello");
}

#[tokio::test]
async fn mail_verify_without_kv_is_forbidden() {
    let harness = harness_with(MemoryStore::default(), false);
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_settings",
            json!({ "enableMailVerify": true, "verifyMailSender": "noreply@mail.test" }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        "Please enable KV first if you want to enable mail verify"
    );
}

#[tokio::test]
async fn mail_verify_needs_a_sender() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_settings",
            json!({ "enableMailVerify": true }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Please provide verifyMailSender");
}

#[tokio::test]
async fn sender_domain_must_be_configured() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_settings",
            json!({ "enableMailVerify": true, "verifyMailSender": "noreply@other.test" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        "VerifyMailSender(noreply@other.test) domain must in [\n  \"mail.test\",\n  \"alt.test\"\n]"
    );
}

#[tokio::test]
async fn negative_max_address_count_is_rejected() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_settings",
            json!({ "enable": true, "maxAddressCount": -1 }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid maxAddressCount");
    assert!(harness.store.settings.lock().unwrap().is_none());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let harness = harness();
    let (status, body) = harness
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/admin/user_settings")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .expect("request"),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid JSON body");
}

#[tokio::test]
async fn creating_the_same_user_twice_conflicts() {
    let harness = harness();
    let payload = json!({ "email": "dup@mail.test", "password": "secret" });

    let (status, body) = harness
        .json(Method::POST, "/admin/users", payload.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({ "success": true }));

    let (status, body) = harness.json(Method::POST, "/admin/users", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "User already exists");
}

#[tokio::test]
async fn create_user_records_request_origin() {
    let harness = harness();
    let (status, _) = harness
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/admin/users")
                .header(CONTENT_TYPE, "application/json")
                .header("cf-connecting-ip", "203.0.113.7")
                .header("cf-ipcountry", "JP")
                .body(Body::from(
                    json!({ "email": "geo@mail.test", "password": "secret" }).to_string(),
                ))
                .expect("request"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let users = harness.store.users.lock().unwrap();
    let user = users.values().next().expect("stored user");
    assert_eq!(user.user_info["userEmail"], "geo@mail.test");
    assert_eq!(user.user_info["geoData"]["ip"], "203.0.113.7");
    assert_eq!(user.user_info["geoData"]["country"], "JP");
}

#[tokio::test]
async fn create_user_requires_credentials() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/users",
            json!({ "email": "a@mail.test" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid email or password");
}

#[tokio::test]
async fn create_user_store_failure_reports_message() {
    let harness = harness_with(
        MemoryStore {
            fail_writes: true,
            ..Default::default()
        },
        true,
    );
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/users",
            json!({ "email": "a@mail.test", "password": "secret" }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Failed to register: persistence error: disk full");
}

#[tokio::test]
async fn listing_filters_by_email_substring() {
    let harness = harness();
    for email in ["foo@mail.test", "bar@mail.test", "FOObar@alt.test", "baz@mail.test"] {
        harness.create_user(email).await;
    }

    let (status, body) = harness
        .get("/admin/users?limit=10&offset=0&query=foo")
        .await;
    assert_eq!(status, StatusCode::OK);

    let page = parse(&body);
    assert_eq!(page["count"], 2);
    let emails: Vec<&str> = page["results"]
        .as_array()
        .expect("results array")
        .iter()
        .map(|user| user["user_email"].as_str().expect("email"))
        .collect();
    assert_eq!(emails, vec!["FOObar@alt.test", "foo@mail.test"]);
}

#[tokio::test]
async fn listing_counts_the_full_set_across_pages() {
    let harness = harness();
    for n in 0..3 {
        harness.create_user(&format!("user{n}@mail.test")).await;
    }

    let (status, body) = harness.get("/admin/users?limit=2&offset=2").await;
    assert_eq!(status, StatusCode::OK);
    let page = parse(&body);
    assert_eq!(page["count"], 3);
    assert_eq!(page["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["results"][0]["role_text"], Value::Null);
}

#[tokio::test]
async fn listing_validates_limit_and_offset() {
    let harness = harness();

    let (status, body) = harness.get("/admin/users?limit=0&offset=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid limit");

    let (status, body) = harness.get("/admin/users?limit=101&offset=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid limit");

    let (status, body) = harness.get("/admin/users?limit=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid offset");
}

#[tokio::test]
async fn deleting_a_missing_user_succeeds() {
    let harness = harness();
    let (status, body) = harness.delete("/admin/users/999").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({ "success": true }));
}

#[tokio::test]
async fn delete_removes_bindings_and_role() {
    let harness = harness();
    let id = harness.create_user("gone@mail.test").await;
    harness
        .store
        .bindings
        .lock()
        .unwrap()
        .push((id, address(1, "gone@mail.test", 0)));
    harness.store.roles.lock().unwrap().insert(id, "vip".into());

    let (status, _) = harness.delete(&format!("/admin/users/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(harness.store.users.lock().unwrap().is_empty());
    assert!(harness.store.bindings.lock().unwrap().is_empty());
    assert!(harness.store.roles.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_numeric_user_id_is_rejected() {
    let harness = harness();
    let (status, body) = harness.delete("/admin/users/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid user_id");
}

#[tokio::test]
async fn reset_password_updates_the_user() {
    let harness = harness();
    let id = harness.create_user("reset@mail.test").await;

    let (status, _) = harness
        .json(
            Method::POST,
            &format!("/admin/users/{id}/reset_password"),
            json!({ "password": "rotated" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.store.users.lock().unwrap()[&id].password, "rotated");
}

#[tokio::test]
async fn reset_password_policy_failure_is_a_server_error() {
    let harness = harness();
    let id = harness.create_user("policy@mail.test").await;
    let (status, body) = harness
        .json(
            Method::POST,
            &format!("/admin/users/{id}/reset_password"),
            json!({ "password": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Failed to reset password: Invalid password");
    assert_eq!(harness.store.users.lock().unwrap()[&id].password, "secret");
}

#[tokio::test]
async fn create_user_policy_failure_is_a_server_error() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/users",
            json!({ "email": "long@mail.test", "password": "x".repeat(101) }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Failed to register: Invalid password");
    assert!(harness.store.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_role_clears_without_existing_role() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_roles",
            json!({ "user_id": 5, "role_text": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({ "success": true }));
}

#[tokio::test]
async fn unknown_role_is_rejected_without_writes() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_roles",
            json!({ "user_id": 5, "role_text": "owner" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid role_text");
    assert_eq!(*harness.store.role_writes.lock().unwrap(), 0);
}

#[tokio::test]
async fn role_update_assigns_and_replaces() {
    let harness = harness();
    let id = harness.create_user("role@mail.test").await;

    for role in ["vip", "admin"] {
        let (status, _) = harness
            .json(
                Method::POST,
                "/admin/user_roles",
                json!({ "user_id": id, "role_text": role }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = harness.get("/admin/users?limit=10&offset=0").await;
    assert_eq!(parse(&body)["results"][0]["role_text"], "admin");
}

#[tokio::test]
async fn role_update_requires_user_id() {
    let harness = harness();
    let (status, body) = harness
        .json(
            Method::POST,
            "/admin/user_roles",
            json!({ "role_text": "vip" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid user_id");
}

#[tokio::test]
async fn bound_addresses_are_listed_newest_first() {
    let harness = harness();
    let id = harness.create_user("owner@mail.test").await;
    {
        let mut bindings = harness.store.bindings.lock().unwrap();
        bindings.push((id, address(3, "first@mail.test", 2)));
        bindings.push((id, address(8, "second@mail.test", 0)));
        bindings.push((id + 1, address(9, "other@mail.test", 0)));
    }

    let (status, body) = harness
        .get(&format!("/admin/users/bind_address/{id}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let results = parse(&body)["results"].clone();
    let names: Vec<&str> = results
        .as_array()
        .expect("results array")
        .iter()
        .map(|address| address["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["second@mail.test", "first@mail.test"]);
    assert_eq!(results[1]["mail_count"], 2);
}

#[tokio::test]
async fn health_probe_reflects_store_state() {
    let (status, _) = harness().get("/_health/db").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let unhealthy = harness_with(
        MemoryStore {
            unhealthy: true,
            ..Default::default()
        },
        true,
    );
    let (status, _) = unhealthy.get("/_health/db").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let harness = harness();
    let response = harness
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin/user_settings")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .expect("request id header");
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
}
