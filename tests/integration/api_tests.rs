//! API integration tests against a running server with a migrated database

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const PASSWORD: &str = "shelf-reader-2024";

/// Register a fresh account and return (username, token)
async fn register_and_login(client: &Client) -> (String, String) {
    let username = format!("reader_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.org", username),
            "first_name": "Test",
            "last_name": "Reader",
            "password1": PASSWORD,
            "password2": PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    (username, token)
}

/// Id of some catalog resource, if the catalog has any
async fn any_resource_id(client: &Client) -> Option<i64> {
    let body: Value = client
        .get(format!("{}/resources", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    body["resources"][0]["id"].as_i64()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_rejects_mismatched_passwords() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": "mismatch_user",
            "email": "mismatch@example.org",
            "first_name": "Mis",
            "last_name": "Match",
            "password1": PASSWORD,
            "password2": "something-else-entirely"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["fields"]["password2"][0], "The two password fields didn't match.");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": "nobody-here", "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Invalid username or password.");
}

#[tokio::test]
#[ignore]
async fn test_admin_login_requires_staff() {
    let client = Client::new();
    let (username, _) = register_and_login(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": PASSWORD, "login_type": "admin" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_search_reports_counts_and_choices() {
    let client = Client::new();

    let response = client
        .get(format!("{}/resources", BASE_URL))
        .query(&[("query", "learning"), ("sort_by", "-publication_year")])
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["resources"].is_array());
    assert_eq!(body["results_count"], body["pagination"]["total"]);
    assert_eq!(body["filters"]["sort"], "-publication_year");
    assert_eq!(body["choices"]["year_ranges"].as_array().map(Vec::len), Some(5));
    assert!(body.get("favorite_ids").is_none());
}

#[tokio::test]
#[ignore]
async fn test_search_rejects_unknown_choices() {
    let client = Client::new();

    let response = client
        .get(format!("{}/resources", BASE_URL))
        .query(&[("year_range", "1990-1995"), ("availability", "restricted")])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["year_range"].is_array());
    assert!(body["fields"]["availability"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_page_past_the_end_shows_last_page() {
    let client = Client::new();

    let body: Value = client
        .get(format!("{}/resources", BASE_URL))
        .query(&[("page", "100000")])
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["pagination"]["page"], body["pagination"]["num_pages"]);
}

#[tokio::test]
#[ignore]
async fn test_resource_detail_counts_views() {
    let client = Client::new();
    let Some(id) = any_resource_id(&client).await else {
        return;
    };

    let first: Value = client
        .get(format!("{}/resources/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let second: Value = client
        .get(format!("{}/resources/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let views = |v: &Value| v["resource"]["view_count"].as_i64().unwrap_or_default();
    assert!(views(&second) > views(&first));
    assert!(second["related_resources"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_missing_resource_is_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/resources/{}", BASE_URL, i32::MAX))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_favorite_toggle_roundtrip() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;
    let Some(id) = any_resource_id(&client).await else {
        return;
    };

    let toggle = || {
        client
            .post(format!("{}/favorites/{}", BASE_URL, id))
            .bearer_auth(&token)
            .send()
    };

    let added: Value = toggle().await.expect("Failed to send request").json().await.unwrap();
    assert_eq!(added["favorited"], true);
    assert_eq!(added["message"], "Added to favorites");

    let favorites: Value = client
        .get(format!("{}/favorites", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .unwrap();
    assert_eq!(favorites["items"][0]["resource"]["id"], id);

    let removed: Value = toggle().await.expect("Failed to send request").json().await.unwrap();
    assert_eq!(removed["favorited"], false);
    assert_eq!(removed["message"], "Removed from favorites");
}

#[tokio::test]
#[ignore]
async fn test_search_is_logged_on_profile() {
    let client = Client::new();
    let (username, token) = register_and_login(&client).await;

    client
        .get(format!("{}/resources", BASE_URL))
        .query(&[("query", username.as_str())])
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    let profile: Value = client
        .get(format!("{}/auth/profile", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .unwrap();

    let searches = profile["recent_searches"].as_array().expect("searches");
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0]["query"], username);
    assert_eq!(searches[0]["results_count"], 0);
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_token() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let response = client
        .post(format!("{}/auth/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/auth/profile", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_autocomplete_and_statistics() {
    let client = Client::new();

    let short: Value = client
        .get(format!("{}/keywords/autocomplete", BASE_URL))
        .query(&[("term", "a")])
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .unwrap();
    assert_eq!(short, json!([]));

    let stats: Value = client
        .get(format!("{}/statistics", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .unwrap();
    assert!(stats["total_resources"].is_number());
    assert!(stats["most_viewed"].as_array().map(|a| a.len() <= 10).unwrap_or(false));
    assert!(stats["top_keywords"].as_array().map(|a| a.len() <= 20).unwrap_or(false));
}

// ---------------------------------------------------------------------------
// Seeded catalog: these need a staff account, taken from LIBCAT_STAFF_USERNAME
// and LIBCAT_STAFF_PASSWORD (default admin/admin).
// ---------------------------------------------------------------------------

async fn staff_login(client: &Client) -> String {
    let username = std::env::var("LIBCAT_STAFF_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("LIBCAT_STAFF_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password, "login_type": "admin" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), 200, "staff login failed");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_create(client: &Client, token: &str, path: &str, payload: Value) -> i64 {
    let response = client
        .post(format!("{}/admin/{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 201, "creating {} failed", path);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

async fn admin_delete(client: &Client, token: &str, path: &str, id: i64) {
    client
        .delete(format!("{}/admin/{}/{}", BASE_URL, path, id))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send delete request");
}

async fn resource_type_id(client: &Client, name: &str) -> i64 {
    let types: Value = client
        .get(format!("{}/resource-types", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    types
        .as_array()
        .and_then(|all| all.iter().find(|t| t["name"] == name))
        .and_then(|t| t["id"].as_i64())
        .expect("Resource type not seeded")
}

/// Two resources sharing a unique marker word. The book matches the marker
/// through both of its authors and its keyword; the journal through its title.
struct SeededCatalog {
    marker: String,
    subject_id: i64,
    book_id: i64,
    journal_id: i64,
    author_ids: Vec<i64>,
    keyword_id: i64,
}

impl SeededCatalog {
    async fn create(client: &Client, token: &str) -> Self {
        let marker = format!("zq{}", &uuid::Uuid::new_v4().simple().to_string()[..10]);

        let subject_id = admin_create(client, token, "subjects", json!({ "name": format!("Subject {}", marker) })).await;
        let first_author = admin_create(
            client,
            token,
            "authors",
            json!({ "first_name": "Ada", "last_name": format!("Smith{}", marker) }),
        )
        .await;
        let second_author = admin_create(
            client,
            token,
            "authors",
            json!({ "first_name": "Alan", "last_name": format!("Jones{}", marker) }),
        )
        .await;
        let keyword_id = admin_create(client, token, "keywords", json!({ "word": format!("kw{}", marker) })).await;

        let book_id = admin_create(
            client,
            token,
            "resources",
            json!({
                "title": "Alpha volume",
                "resource_type_id": resource_type_id(client, "book").await,
                "description": "Seeded book",
                "publication_year": 2021,
                "availability": "available",
                "author_ids": [first_author, second_author],
                "subject_ids": [subject_id],
                "keyword_ids": [keyword_id]
            }),
        )
        .await;
        let journal_id = admin_create(
            client,
            token,
            "resources",
            json!({
                "title": format!("Beta {}", marker),
                "resource_type_id": resource_type_id(client, "journal").await,
                "description": "Seeded journal",
                "publication_year": 1995,
                "availability": "checked_out",
                "subject_ids": [subject_id]
            }),
        )
        .await;

        Self {
            marker,
            subject_id,
            book_id,
            journal_id,
            author_ids: vec![first_author, second_author],
            keyword_id,
        }
    }

    async fn remove(self, client: &Client, token: &str) {
        for id in [self.book_id, self.journal_id] {
            admin_delete(client, token, "resources", id).await;
        }
        for id in self.author_ids {
            admin_delete(client, token, "authors", id).await;
        }
        admin_delete(client, token, "keywords", self.keyword_id).await;
        admin_delete(client, token, "subjects", self.subject_id).await;
    }
}

async fn search(client: &Client, params: &[(&str, String)], token: Option<&str>) -> Value {
    let mut request = client.get(format!("{}/resources", BASE_URL)).query(params);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await.expect("Failed to send request");
    assert_eq!(response.status(), 200);
    response.json().await.expect("Failed to parse response")
}

fn result_ids(body: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = body["resources"]
        .as_array()
        .expect("resources")
        .iter()
        .filter_map(|r| r["id"].as_i64())
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
#[ignore]
async fn test_seeded_search_deduplicates_and_logs_total() {
    let client = Client::new();
    let staff = staff_login(&client).await;
    let seeded = SeededCatalog::create(&client, &staff).await;
    let (_, reader) = register_and_login(&client).await;

    let body = search(&client, &[("query", seeded.marker.clone())], Some(&reader)).await;
    let mut expected = vec![seeded.book_id, seeded.journal_id];
    expected.sort_unstable();
    assert_eq!(result_ids(&body), expected);
    assert_eq!(body["results_count"], 2);
    assert_eq!(body["pagination"]["total"], 2);

    let profile: Value = client
        .get(format!("{}/auth/profile", BASE_URL))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .unwrap();
    let searches = profile["recent_searches"].as_array().expect("searches");
    assert_eq!(searches[0]["query"], seeded.marker.as_str());
    assert_eq!(searches[0]["results_count"], 2);

    seeded.remove(&client, &staff).await;
}

#[tokio::test]
#[ignore]
async fn test_seeded_facets_are_conjunctive() {
    let client = Client::new();
    let staff = staff_login(&client).await;
    let seeded = SeededCatalog::create(&client, &staff).await;
    let book_type = resource_type_id(&client, "book").await.to_string();
    let marker = seeded.marker.clone();

    let books = search(
        &client,
        &[("query", marker.clone()), ("resource_type", book_type.clone())],
        None,
    )
    .await;
    assert_eq!(result_ids(&books), vec![seeded.book_id]);

    let old = search(
        &client,
        &[("query", marker.clone()), ("year_range", "before-2000".to_string())],
        None,
    )
    .await;
    assert_eq!(result_ids(&old), vec![seeded.journal_id]);

    let none = search(
        &client,
        &[
            ("query", marker.clone()),
            ("resource_type", book_type),
            ("year_range", "before-2000".to_string()),
        ],
        None,
    )
    .await;
    assert_eq!(none["results_count"], 0);
    assert!(result_ids(&none).is_empty());

    let checked_out = search(
        &client,
        &[
            ("subject", seeded.subject_id.to_string()),
            ("availability", "checked_out".to_string()),
        ],
        None,
    )
    .await;
    assert_eq!(result_ids(&checked_out), vec![seeded.journal_id]);

    seeded.remove(&client, &staff).await;
}

#[tokio::test]
#[ignore]
async fn test_search_rejects_ids_that_name_no_row() {
    let client = Client::new();
    let missing = i32::MAX.to_string();

    let response = client
        .get(format!("{}/resources", BASE_URL))
        .query(&[("resource_type", missing.as_str()), ("subject", missing.as_str())])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["fields"]["resource_type"].is_array());
    assert!(body["fields"]["subject"].is_array());
}
