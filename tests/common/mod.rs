#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use mathquiz::{
    db::{AuthUser, ClientInfo, Db, UserProfile},
    generator::{ChatClientConfig, ChatCompletionClient, QuestionGenerator},
    names,
    services::{
        auth::{AuthService, EmailAllowlist},
        identity::{GoogleConfig, GoogleIdentity},
    },
    AppState, SubmissionPolicy,
};
use serde_json::{json, Value};

pub async fn create_test_db() -> Db {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("mathquiz_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());
    Db::new(&url).await.expect("failed to create test database")
}

/// What the fake completion endpoint answers with.
#[derive(Clone)]
pub enum StubReply {
    Content(String),
    NoChoices,
    Status(StatusCode),
    Slow(Duration),
}

#[derive(Clone)]
pub struct Stub {
    pub base_url: String,
    pub hits: Arc<Mutex<Vec<Value>>>,
}

impl Stub {
    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Value {
        self.hits.lock().unwrap().last().cloned().expect("no request")
    }
}

#[derive(Clone)]
struct StubState {
    reply: StubReply,
    hits: Arc<Mutex<Vec<Value>>>,
}

async fn completions(
    State(state): State<StubState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.hits.lock().unwrap().push(body);
    match state.reply {
        StubReply::Content(content) => (
            StatusCode::OK,
            Json(json!({ "choices": [{ "message": { "content": content } }] })),
        ),
        StubReply::NoChoices => (StatusCode::OK, Json(json!({ "choices": [] }))),
        StubReply::Status(code) => (code, Json(json!({ "error": "stub failure" }))),
        StubReply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(json!({ "choices": [] })))
        }
    }
}

/// Serve a fake chat-completion endpoint on an ephemeral port.
pub async fn spawn_stub(reply: StubReply) -> Stub {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/chat/completions", post(completions))
        .with_state(StubState {
            reply,
            hits: hits.clone(),
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    Stub {
        base_url: format!("http://{addr}"),
        hits,
    }
}

pub fn client_config(base_url: &str, timeout: Duration) -> ChatClientConfig {
    ChatClientConfig {
        api_key: "test-key".to_string(),
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
        timeout,
        max_retries: 2,
    }
}

pub fn app_state(db: Db, llm_base_url: &str, submission: SubmissionPolicy) -> AppState {
    let client = ChatCompletionClient::new(client_config(llm_base_url, Duration::from_secs(5)))
        .expect("completion client");
    let generator = QuestionGenerator::with_seed(client, db.clone(), 16, 42);

    let identity = GoogleIdentity::new(GoogleConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_url: format!("http://localhost{}", names::GOOGLE_CALLBACK_URL),
    })
    .expect("identity provider");
    let auth = AuthService::new(
        db.clone(),
        identity,
        EmailAllowlist::parse(names::DEFAULT_ALLOWED_EMAIL_DOMAIN),
    );

    AppState {
        db,
        generator: Arc::new(generator),
        auth: Arc::new(auth),
        secure_cookies: false,
        trust_forwarded_for: false,
        submission,
    }
}

pub async fn login(db: &Db, email: &str) -> (AuthUser, String) {
    let user = db
        .upsert_user_on_login(&UserProfile {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "Student".to_string(),
        })
        .await
        .expect("upsert user");
    let token = db
        .create_user_session(&user.id, &ClientInfo::default())
        .await
        .expect("create session");
    (user, token)
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}", names::USER_SESSION_COOKIE_NAME, token)
}

pub const GOOD_COMPLETION: &str = "Here is your question:\n```json\n{\"question\": \"Simplify \\(x^2 \\cdot x^3\\)\", \"options\": [\"x^5\", \"x^6\", \"x^8\", \"x\"], \"correct_answer\": \"x^5\"}\n```";
