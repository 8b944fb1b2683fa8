use color_eyre::Result;

use std::collections::HashSet;

use crate::db::models::{AuthUser, ClientInfo, UserProfile, ROLE_TEACHER};
use crate::db::Db;
use crate::services::identity::{GoogleIdentity, IdentityProvider};

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn upsert_user_on_login(
        &self,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<AuthUser>> + Send;

    fn create_user_session(
        &self,
        user_id: &str,
        client: &ClientInfo,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    fn end_user_session(&self, token: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    fn set_user_role(
        &self,
        user_id: &str,
        role: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

impl AuthRepository for Db {
    async fn upsert_user_on_login(&self, profile: &UserProfile) -> Result<AuthUser> {
        Db::upsert_user_on_login(self, profile).await
    }

    async fn create_user_session(&self, user_id: &str, client: &ClientInfo) -> Result<String> {
        Db::create_user_session(self, user_id, client).await
    }

    async fn end_user_session(&self, token: &str) -> Result<()> {
        Db::end_user_session(self, token).await
    }

    async fn set_user_role(&self, user_id: &str, role: &str) -> Result<()> {
        Db::set_user_role(self, user_id, role).await
    }
}

// ---------------------------------------------------------------------------
// Email allowlist
// ---------------------------------------------------------------------------

/// Case-insensitive suffix allowlist, e.g. `@school.example.edu`.
#[derive(Clone, Debug)]
pub struct EmailAllowlist {
    suffixes: Vec<String>,
}

impl EmailAllowlist {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a comma separated list.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    pub fn is_allowed(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        !email.is_empty() && self.suffixes.iter().any(|s| email.ends_with(s.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Outcome enums
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum LoginOutcome {
    /// Login succeeded. Contains the session token and the user.
    Success { token: String, user: AuthUser },
    /// The provider vouched for an email outside the allowlist.
    EmailNotAllowed(String),
    /// The `state` returned by the provider does not match the one we issued.
    StateMismatch,
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

pub struct AuthService<R: AuthRepository = Db, I: IdentityProvider = GoogleIdentity> {
    repo: R,
    identity: I,
    allowlist: EmailAllowlist,
    teachers: HashSet<String>,
}

impl<R: AuthRepository, I: IdentityProvider> AuthService<R, I> {
    pub fn new(repo: R, identity: I, allowlist: EmailAllowlist) -> Self {
        Self {
            repo,
            identity,
            allowlist,
            teachers: HashSet::new(),
        }
    }

    /// Emails (comma separated) promoted to teacher when they log in.
    /// Admins keep their role.
    pub fn with_teachers(mut self, emails: &str) -> Self {
        self.teachers = emails
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Where to send the browser, and the state to remember for the callback.
    pub fn begin_login(&self) -> (String, String) {
        self.identity.authorize_url()
    }

    pub async fn complete_login(
        &self,
        code: &str,
        returned_state: &str,
        expected_state: Option<&str>,
        client: &ClientInfo,
    ) -> Result<LoginOutcome> {
        if expected_state != Some(returned_state) {
            tracing::warn!("oauth state mismatch");
            return Ok(LoginOutcome::StateMismatch);
        }

        let profile = self.identity.fetch_profile(code).await?;

        if !self.allowlist.is_allowed(&profile.email) {
            tracing::warn!("email not allowed: {}", profile.email);
            return Ok(LoginOutcome::EmailNotAllowed(profile.email));
        }

        let mut user = self.repo.upsert_user_on_login(&profile).await?;
        if !user.is_elevated() && self.teachers.contains(&user.email.to_lowercase()) {
            self.repo.set_user_role(&user.id, ROLE_TEACHER).await?;
            user.role = ROLE_TEACHER.to_string();
        }

        let token = self.repo.create_user_session(&user.id, client).await?;

        Ok(LoginOutcome::Success { token, user })
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        self.repo.end_user_session(token).await
    }
}
