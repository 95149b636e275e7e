// tests/api_tests.rs

use drive_mentor::{
    config::Config,
    models::{
        question::{AnswerOption, Correctness, Question, QuestionMetadata},
        test::Test,
    },
    routes,
    state::AppState,
    store::{InMemoryStore, Repositories},
    utils::jwt::sign_jwt,
};
use serde_json::{Value, json};

const SECRET: &str = "test_secret_for_integration_tests";

fn question(code: &str, correct: &str) -> Question {
    Question {
        code: Some(code.into()),
        body: format!("<p>Question {}</p>", code),
        options: ["A", "B", "C"]
            .iter()
            .map(|label| AnswerOption {
                label: label.to_string(),
                text: format!("Option {}", label),
                correctness: if *label == correct {
                    Correctness::Correct
                } else {
                    Correctness::Incorrect
                },
            })
            .collect(),
        explanation: Some("See chapter 2".to_string()),
        image_base64: None,
        metadata: QuestionMetadata::default(),
    }
}

fn test(id: &str, description: Option<&str>, question_count: u32) -> Test {
    Test {
        id: id.to_string(),
        prefix: id.chars().take(2).collect(),
        question_count,
        description: description.map(str::to_string),
        created_at: None,
    }
}

/// Seeds a small catalog with one test per category.
fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .insert_test(
            test("41001", Some("Priority rules"), 2),
            vec![question("q1", "B"), question("q2", "A")],
        )
        .unwrap();
    store
        .insert_test(
            test("100", None, 3),
            vec![question("5", "A"), question("9", "C"), question("11", "A")],
        )
        .unwrap();
    store
        .insert_test(test("7351", Some("Signals"), 1), vec![question("1", "A")])
        .unwrap();
    store.insert_test(test("13402", None, 0), Vec::new()).unwrap();
    store
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    let config = Config {
        database_url: String::new(),
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        port: 0,
        time_flush_interval_secs: 30,
    };

    let state = AppState::new(Repositories::in_memory(seeded_store()), config);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn bearer(user_id: &str) -> String {
    format!("Bearer {}", sign_jwt(user_id, SECRET, 600).unwrap())
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    auth: &str,
    test_id: &str,
    answers: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/tests/{}/attempts", address, test_id))
        .header("Authorization", auth)
        .json(&json!({ "answers": answers, "elapsed_seconds": 90 }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;

    let response = reqwest::get(format!("{}/random_path_that_does_not_exist", address))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn catalog_is_sorted_and_counted() {
    let address = spawn_app().await;

    let body: Value = reqwest::get(format!("{}/api/tests", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let ids: Vec<&str> = body["tests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["100", "7351", "13402", "41001"]);
    assert_eq!(body["counts"]["all"], 4);
    assert_eq!(body["counts"]["special"], 1);

    let special: Value = reqwest::get(format!("{}/api/tests?category=special", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(special["tests"].as_array().unwrap().len(), 1);
    assert_eq!(special["counts"]["all"], 4);
}

#[tokio::test]
async fn test_detail_hides_answer_key() {
    let address = spawn_app().await;

    let response = reqwest::get(format!("{}/api/tests/41001", address)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["test"]["description"], "Priority rules");
    assert_eq!(body["questions"][0]["key"], "q1");
    assert!(body["questions"][0]["options"][0].get("correctness").is_none());
    assert!(body["questions"][0].get("explanation").is_none());

    let missing = reqwest::get(format!("{}/api/tests/999", address)).await.unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn attempt_is_scored_and_recorded() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let auth = bearer("user-1");

    let response = submit(&client, &address, &auth, "41001", json!({ "q1": "B", "q2": "C" })).await;
    assert_eq!(response.status().as_u16(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["correct"], 1);
    assert_eq!(body["incorrect"], 1);
    assert_eq!(body["total"], 2);
    assert_eq!(body["failed"], json!(["q2"]));

    let progress: Value = client
        .get(format!("{}/api/stats/progress", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["completed"], 1);
    assert_eq!(progress["total"], 4);
    assert_eq!(progress["percentage"], 25);
}

#[tokio::test]
async fn stats_are_scoped_to_token_user() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = submit(
        &client,
        &address,
        &bearer("user-1"),
        "41001",
        json!({ "q1": "B", "q2": "C" }),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201);

    let other = bearer("user-2");
    let progress: Value = client
        .get(format!("{}/api/stats/progress", address))
        .header("Authorization", &other)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["completed"], 0);

    let failures: Value = client
        .get(format!("{}/api/failures", address))
        .header("Authorization", &other)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(failures["status"], "no_failures");
}

#[tokio::test]
async fn incomplete_attempt_is_rejected_with_missing_keys() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let auth = bearer("user-1");

    let response = submit(&client, &address, &auth, "41001", json!({})).await;
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["missing"], json!(["q1", "q2"]));

    // Nothing was recorded.
    let failures: Value = client
        .get(format!("{}/api/failures", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(failures["status"], "no_failures");
}

#[tokio::test]
async fn guests_can_submit_with_issued_id() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let issued: Value = client
        .post(format!("{}/api/auth/guest", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let guest_id = issued["guest_id"].as_str().unwrap().to_string();
    assert!(guest_id.starts_with("guest_"));

    let response = client
        .post(format!("{}/api/tests/7351/attempts", address))
        .header("X-Guest-Id", &guest_id)
        .json(&json!({ "answers": { "1": "A" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let anonymous = client
        .post(format!("{}/api/tests/7351/attempts", address))
        .json(&json!({ "answers": { "1": "A" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    let forged = client
        .post(format!("{}/api/tests/7351/attempts", address))
        .header("X-Guest-Id", "guest_NOT-VALID")
        .json(&json!({ "answers": { "1": "A" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status().as_u16(), 401);
}

#[tokio::test]
async fn failures_are_deduplicated_and_grouped() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let auth = bearer("user-2");

    // Test 100: fail 5, then fail 5 and 9.
    submit(&client, &address, &auth, "100", json!({ "5": "B", "9": "C", "11": "A" })).await;
    submit(&client, &address, &auth, "100", json!({ "5": "B", "9": "A", "11": "A" })).await;
    submit(&client, &address, &auth, "41001", json!({ "q1": "A", "q2": "A" })).await;

    let body: Value = client
        .get(format!("{}/api/failures", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "found");
    let groups = body["data"].as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0]["test_id"], "100");
    assert_eq!(groups[0]["test_description"], "Test 100");
    let codes: Vec<&str> = groups[0]["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["5", "9"]);
    assert_eq!(groups[1]["test_id"], "41001");
    assert_eq!(groups[1]["questions"][0]["correct_answer"], "Option B");

    let single: Value = client
        .get(format!("{}/api/failures/41001", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(single["data"]["test_description"], "Priority rules");
}

#[tokio::test]
async fn consolidated_review_is_graded_per_test() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let auth = bearer("user-3");

    submit(&client, &address, &auth, "100", json!({ "5": "B", "9": "C", "11": "A" })).await;
    submit(&client, &address, &auth, "41001", json!({ "q1": "B", "q2": "B" })).await;

    let all: Value = client
        .get(format!("{}/api/failures/all", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["data"].as_array().unwrap().len(), 2);

    let graded: Value = client
        .post(format!("{}/api/failures/review", address))
        .header("Authorization", &auth)
        .json(&json!({ "answers": { "100:5": "A", "41001:q2": "C" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(graded["status"], "found");
    assert_eq!(graded["data"]["correct"], 1);
    assert_eq!(graded["data"]["per_test"]["100"]["correct"], 1);
    assert_eq!(graded["data"]["per_test"]["41001"]["total"], 1);
}

#[tokio::test]
async fn failure_routes_require_a_token() {
    let address = spawn_app().await;

    let response = reqwest::get(format!("{}/api/failures", address)).await.unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // A guest id is not a token.
    let guest = reqwest::Client::new()
        .get(format!("{}/api/failures", address))
        .header("X-Guest-Id", "guest_abcdefghij")
        .send()
        .await
        .unwrap();
    assert_eq!(guest.status().as_u16(), 401);
}

#[tokio::test]
async fn description_update_is_sanitized() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/tests/100/description", address))
        .header("Authorization", bearer("user-4"))
        .json(&json!({ "description": "<b>Basics</b><script>alert(1)</script>" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let detail: Value = reqwest::get(format!("{}/api/tests/100", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["test"]["description"], "<b>Basics</b>");

    let too_long = client
        .put(format!("{}/api/tests/100/description", address))
        .header("Authorization", bearer("user-4"))
        .json(&json!({ "description": "x".repeat(501) }))
        .send()
        .await
        .unwrap();
    assert_eq!(too_long.status().as_u16(), 400);
}

#[tokio::test]
async fn study_time_session_lifecycle() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let auth = bearer("user-5");

    let started: Value = client
        .post(format!("{}/api/stats/time/start", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["started"], true);

    let again: Value = client
        .post(format!("{}/api/stats/time/start", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["started"], false);

    let stats: Value = client
        .get(format!("{}/api/stats/time", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["is_tracking"], true);
    assert_eq!(stats["sessions_count"], 1);
    assert_eq!(stats["level"]["name"], "Beginner");

    let stopped = client
        .post(format!("{}/api/stats/time/stop", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap();
    assert_eq!(stopped.status().as_u16(), 200);

    let stats: Value = client
        .get(format!("{}/api/stats/time", address))
        .header("Authorization", &auth)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["is_tracking"], false);
}
