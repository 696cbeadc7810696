//! Signed-in session state.
//!
//! The session is `{user, token}` mirrored into a [`KeyValueStore`] under
//! `auth_token` and `auth_user`. Logging in is a redirect to the backend;
//! the backend finishes the provider handshake and sends the browser back
//! with `token` and `user` query parameters, which
//! [`AuthSession::handle_oauth_callback`] consumes.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, AuthProvider, TokenVerifyResponse, User, UserRole};
use crate::core::storage::{KeyValueStore, StorageError, AUTH_TOKEN_KEY, AUTH_USER_KEY};
use crate::utils::url::{query_param, strip_query_params};

const CALLBACK_TOKEN_PARAM: &str = "token";
const CALLBACK_USER_PARAM: &str = "user";

pub const MOCK_USER_ID: &str = "mock-user-1";
pub const MOCK_TOKEN: &str = "mock-token-123";

/// Token validation as seen by the session.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn verify(&self, token: &str) -> Result<TokenVerifyResponse, ApiError>;
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn verify(&self, token: &str) -> Result<TokenVerifyResponse, ApiError> {
        ApiClient::verify(self, token).await
    }
}

/// Whatever can send the user to a login page.
pub trait Redirector {
    fn redirect(&self, url: &str);
}

/// What happened to the persisted session during [`AuthSession::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing was persisted.
    Empty,
    /// The backend accepted the token.
    Verified,
    /// The backend could not be asked; local state was kept.
    Unverified,
    /// The backend refused the token, or the persisted state was unusable.
    Rejected,
}

/// Result of [`AuthSession::init`].
#[derive(Debug, Clone, PartialEq)]
pub struct InitReport {
    pub restore: RestoreOutcome,
    /// Present when OAuth callback parameters were consumed: the address
    /// with `token` and `user` removed.
    pub cleaned_address: Option<Url>,
}

pub struct AuthSession {
    store: Arc<dyn KeyValueStore>,
    user: Option<User>,
    token: Option<String>,
}

impl AuthSession {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            user: None,
            token: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Restore the persisted session, re-validate it, then look for an
    /// OAuth callback on `address`.
    pub async fn init(
        &mut self,
        backend: &dyn AuthBackend,
        address: Option<&Url>,
    ) -> Result<InitReport, StorageError> {
        let restore = self.restore(backend).await?;
        let cleaned_address = match address {
            Some(address) => self.handle_oauth_callback(address)?,
            None => None,
        };
        Ok(InitReport {
            restore,
            cleaned_address,
        })
    }

    async fn restore(&mut self, backend: &dyn AuthBackend) -> Result<RestoreOutcome, StorageError> {
        let saved_token = self.store.get(AUTH_TOKEN_KEY)?;
        let saved_user = self.store.get(AUTH_USER_KEY)?;
        let (Some(token), Some(user_json)) = (saved_token, saved_user) else {
            return Ok(RestoreOutcome::Empty);
        };

        let user = match serde_json::from_str::<User>(&user_json) {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "Discarding unreadable persisted user");
                self.logout()?;
                return Ok(RestoreOutcome::Rejected);
            }
        };

        self.token = Some(token.clone());
        self.user = Some(user);

        match backend.verify(&token).await {
            Ok(response) if response.valid => Ok(RestoreOutcome::Verified),
            Ok(_) => {
                info!("Backend reports the saved token as invalid; signing out");
                self.logout()?;
                Ok(RestoreOutcome::Rejected)
            }
            Err(err @ ApiError::Status { .. }) => {
                info!(error = %err, "Saved token rejected; signing out");
                self.logout()?;
                Ok(RestoreOutcome::Rejected)
            }
            Err(err) => {
                info!(error = %err, "Auth API not available, using local state");
                Ok(RestoreOutcome::Unverified)
            }
        }
    }

    /// Adopt `token`/`user` from a redirect address.
    ///
    /// Returns the address with both parameters stripped when they were
    /// consumed, `None` when they were absent or unusable.
    pub fn handle_oauth_callback(&mut self, address: &Url) -> Result<Option<Url>, StorageError> {
        let (Some(token), Some(user_json)) = (
            query_param(address, CALLBACK_TOKEN_PARAM),
            query_param(address, CALLBACK_USER_PARAM),
        ) else {
            return Ok(None);
        };

        let user = match serde_json::from_str::<User>(&user_json) {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "Failed to parse OAuth callback");
                return Ok(None);
            }
        };

        info!(user = %user.email, provider = %user.provider, "Signed in via OAuth callback");
        self.adopt(token, user)?;
        Ok(Some(strip_query_params(
            address,
            &[CALLBACK_TOKEN_PARAM, CALLBACK_USER_PARAM],
        )))
    }

    pub fn login(&self, backend: &ApiClient, provider: AuthProvider, redirector: &dyn Redirector) {
        redirector.redirect(&backend.login_url(provider));
    }

    /// Clear the session locally. The token is not revoked server-side.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.user = None;
        self.token = None;
        let token_result = self.store.remove(AUTH_TOKEN_KEY);
        let user_result = self.store.remove(AUTH_USER_KEY);
        token_result.and(user_result)
    }

    /// Install a fixed admin session for working without a backend.
    pub fn mock_login(&mut self, provider: AuthProvider) -> Result<(), StorageError> {
        let user = User {
            id: MOCK_USER_ID.to_string(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            avatar: Some("https://api.dicebear.com/7.x/avataaars/svg?seed=test".to_string()),
            role: UserRole::Admin,
            provider,
        };
        self.adopt(MOCK_TOKEN.to_string(), user)
    }

    fn adopt(&mut self, token: String, user: User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&user).map_err(|source| StorageError::Encode {
            key: AUTH_USER_KEY.to_string(),
            source,
        })?;
        self.token = Some(token);
        self.user = Some(user);
        if let Some(token) = &self.token {
            self.store.set(AUTH_TOKEN_KEY, token)?;
        }
        self.store.set(AUTH_USER_KEY, &user_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Verdict {
        Valid,
        Rejected,
        Offline,
    }

    struct FakeBackend {
        verdict: Verdict,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(verdict: Verdict) -> Self {
            Self {
                verdict,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn verify(&self, _token: &str) -> Result<TokenVerifyResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.verdict {
                Verdict::Valid => Ok(TokenVerifyResponse {
                    valid: true,
                    user: None,
                }),
                Verdict::Rejected => Err(ApiError::Status {
                    status: 401,
                    message: "Invalid token".to_string(),
                }),
                Verdict::Offline => Err(ApiError::Unauthenticated),
            }
        }
    }

    const USER_JSON: &str = r#"{"id":"u1","email":"ann@example.com","name":"Ann","avatar":null,"role":"admin","provider":"github"}"#;

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_TOKEN_KEY, "saved-token").unwrap();
        store.set(AUTH_USER_KEY, USER_JSON).unwrap();
        store
    }

    #[tokio::test]
    async fn init_keeps_verified_session() {
        let store = seeded_store();
        let backend = FakeBackend::new(Verdict::Valid);
        let mut session = AuthSession::new(store.clone());

        let report = session.init(&backend, None).await.unwrap();
        assert_eq!(report.restore, RestoreOutcome::Verified);
        assert_eq!(session.token(), Some("saved-token"));
        assert!(session.is_admin());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn init_clears_rejected_session() {
        let store = seeded_store();
        let backend = FakeBackend::new(Verdict::Rejected);
        let mut session = AuthSession::new(store.clone());

        let report = session.init(&backend, None).await.unwrap();
        assert_eq!(report.restore, RestoreOutcome::Rejected);
        assert!(!session.is_logged_in());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(AUTH_USER_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn init_keeps_local_state_when_backend_unreachable() {
        let store = seeded_store();
        let backend = FakeBackend::new(Verdict::Offline);
        let mut session = AuthSession::new(store.clone());

        let report = session.init(&backend, None).await.unwrap();
        assert_eq!(report.restore, RestoreOutcome::Unverified);
        assert!(session.is_logged_in());
    }

    #[tokio::test]
    async fn init_without_saved_state_skips_verification() {
        let backend = FakeBackend::new(Verdict::Valid);
        let mut session = AuthSession::new(Arc::new(MemoryStore::new()));

        let report = session.init(&backend, None).await.unwrap();
        assert_eq!(report.restore, RestoreOutcome::Empty);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn init_consumes_oauth_callback() {
        let store = Arc::new(MemoryStore::new());
        let backend = FakeBackend::new(Verdict::Valid);
        let mut session = AuthSession::new(store.clone());

        let address = Url::parse(
            "http://localhost:5173/?token=abc&user=%7B%22id%22%3A%22u2%22%2C%22email%22%3A%22bo%40example.com%22%2C%22name%22%3A%22Bo%22%2C%22avatar%22%3Anull%2C%22role%22%3A%22user%22%2C%22provider%22%3A%22google%22%7D",
        )
        .unwrap();
        let report = session.init(&backend, Some(&address)).await.unwrap();

        let cleaned = report.cleaned_address.expect("callback should be consumed");
        assert_eq!(cleaned.as_str(), "http://localhost:5173/");
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Bo"));
        assert!(!session.is_admin());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        let persisted: User =
            serde_json::from_str(&store.get(AUTH_USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.id, "u2");
    }

    #[test]
    fn callback_with_bad_user_json_changes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut session = AuthSession::new(store.clone());
        let address = Url::parse("http://localhost:5173/?token=abc&user=%7Bbroken").unwrap();

        assert_eq!(session.handle_oauth_callback(&address).unwrap(), None);
        assert!(!session.is_logged_in());
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn callback_needs_both_parameters() {
        let mut session = AuthSession::new(Arc::new(MemoryStore::new()));
        let address = Url::parse("http://localhost:5173/?token=abc").unwrap();
        assert_eq!(session.handle_oauth_callback(&address).unwrap(), None);
        assert!(!session.is_logged_in());
    }

    #[test]
    fn mock_login_then_logout() {
        let store = Arc::new(MemoryStore::new());
        let mut session = AuthSession::new(store.clone());

        session.mock_login(AuthProvider::Google).unwrap();
        assert!(session.is_admin());
        assert_eq!(session.token(), Some(MOCK_TOKEN));
        assert_eq!(session.user().unwrap().provider, AuthProvider::Google);
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some(MOCK_TOKEN));
        let saved_user = store.get(AUTH_USER_KEY).unwrap().expect("user persisted");
        let saved_user: User = serde_json::from_str(&saved_user).unwrap();
        assert_eq!(Some(&saved_user), session.user());

        session.logout().unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(session.token(), None);
        assert_eq!(store.get(AUTH_USER_KEY).unwrap(), None);
    }

    #[test]
    fn login_redirects_to_provider_endpoint() {
        struct Recorder(std::sync::Mutex<Vec<String>>);
        impl Redirector for Recorder {
            fn redirect(&self, url: &str) {
                self.0.lock().unwrap().push(url.to_string());
            }
        }

        let session = AuthSession::new(Arc::new(MemoryStore::new()));
        let recorder = Recorder(std::sync::Mutex::new(Vec::new()));
        let client = ApiClient::new("http://localhost:8000/api");
        session.login(&client, AuthProvider::Github, &recorder);
        assert_eq!(
            recorder.0.lock().unwrap().as_slice(),
            ["http://localhost:8000/api/auth/github".to_string()]
        );
    }
}
