use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use mathquiz::{
    db::Db,
    generator::{ChatClientConfig, ChatCompletionClient, QuestionGenerator},
    names,
    services::{
        auth::{AuthService, EmailAllowlist},
        identity::{GoogleConfig, GoogleIdentity},
    },
    AppState, SubmissionPolicy,
};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// SQLite database URL.
    #[arg(long, env, default_value = "sqlite://mathquiz.db")]
    database_url: String,

    /// The address to bind to.
    #[arg(short, long, env, default_value = "127.0.0.1:8000")]
    address: String,

    /// Public base URL, used for the OAuth redirect.
    #[arg(long, env, default_value = "http://localhost:8000")]
    base_url: String,

    /// API key of the chat-completion provider.
    #[arg(long, env)]
    llm_api_key: String,

    #[arg(long, env, default_value = "https://api.deepseek.com")]
    llm_base_url: String,

    #[arg(long, env, default_value = "deepseek-chat")]
    llm_model: String,

    /// Per-attempt timeout of completion requests, in seconds.
    #[arg(long, env, default_value_t = 30)]
    llm_timeout_secs: u64,

    /// Retries for transient completion failures.
    #[arg(long, env, default_value_t = 2)]
    llm_max_retries: usize,

    #[arg(long, env)]
    google_client_id: String,

    #[arg(long, env)]
    google_client_secret: String,

    /// Comma separated email suffixes allowed to log in.
    #[arg(long, env, default_value = names::DEFAULT_ALLOWED_EMAIL_DOMAIN)]
    allowed_email_domains: String,

    /// Record answers from visitors without a session.
    #[arg(long, env, default_value_t = false)]
    allow_anonymous_submissions: bool,

    #[arg(long, env, default_value_t = false)]
    secure_cookies: bool,

    /// Only enable behind a reverse proxy that sets `X-Forwarded-For`.
    #[arg(long, env, default_value_t = false)]
    trust_forwarded_for: bool,

    /// Comma separated emails given the teacher role when they log in.
    #[arg(long, env, default_value = "")]
    teacher_emails: String,

    /// Topic/difficulty pairs remembered for repeat avoidance.
    #[arg(long, env, default_value_t = names::DEFAULT_RECENT_CACHE_CAPACITY)]
    recent_cache_capacity: usize,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tracing=info,mathquiz=debug".to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    let db = Db::new(&args.database_url).await?;

    let client = ChatCompletionClient::new(ChatClientConfig {
        api_key: args.llm_api_key,
        base_url: args.llm_base_url,
        model: args.llm_model,
        timeout: Duration::from_secs(args.llm_timeout_secs),
        max_retries: args.llm_max_retries,
    })?;
    let generator = QuestionGenerator::new(client, db.clone(), args.recent_cache_capacity);

    let identity = GoogleIdentity::new(GoogleConfig {
        client_id: args.google_client_id,
        client_secret: args.google_client_secret,
        redirect_url: format!(
            "{}{}",
            args.base_url.trim_end_matches('/'),
            names::GOOGLE_CALLBACK_URL
        ),
    })?;
    let allowlist = EmailAllowlist::parse(&args.allowed_email_domains);
    let auth =
        AuthService::new(db.clone(), identity, allowlist).with_teachers(&args.teacher_emails);

    let state = AppState {
        db,
        generator: Arc::new(generator),
        auth: Arc::new(auth),
        secure_cookies: args.secure_cookies,
        trust_forwarded_for: args.trust_forwarded_for,
        submission: SubmissionPolicy::from_allow_anonymous(args.allow_anonymous_submissions),
    };
    let app = mathquiz::router(state);

    let address = args.address.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("listening on {address}");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
