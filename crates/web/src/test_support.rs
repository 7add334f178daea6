//! In-memory doubles for the remote services.
//!
//! Compiled for unit tests and behind the `test-support` feature so the
//! integration-tests crate can drive the full router without a Supabase
//! project. Each double records the calls it receives and can be told to
//! fail a specific operation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use hitchyard_core::{Email, UserId};

use crate::db::{DataStore, Filter, Select, StoreError, Table};
use crate::models::{AccessToken, Identity};
use crate::services::auth::{AuthError, AuthSession, IdentityProvider, SignUpRequest};
use crate::services::{Marketplace, VettingNotification, VettingNotifier, WebhookError};

// =============================================================================
// Data store
// =============================================================================

/// Kind of store operation, for call logs and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Insert,
    Select,
    Update,
}

/// One call received by [`MemoryDataStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub table: Table,
}

#[derive(Default)]
struct StoreState {
    tables: HashMap<Table, Vec<Value>>,
    calls: Vec<StoreCall>,
    failures: HashMap<(StoreOp, Table), String>,
}

/// A [`DataStore`] holding rows as JSON objects.
///
/// Inserted rows get a fresh `id` when they lack one. Selects apply
/// equality filters, descending order and column projection the way the
/// hosted store does.
#[derive(Clone, Default)]
pub struct MemoryDataStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryDataStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("memory store lock")
    }

    /// Put a row in `table` without recording a call.
    pub fn seed(&self, table: Table, row: Value) {
        self.lock().tables.entry(table).or_default().push(row);
    }

    /// Current rows of `table`.
    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().tables.get(&table).cloned().unwrap_or_default()
    }

    /// Every call received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Make `op` on `table` fail with `message`.
    pub fn fail(&self, op: StoreOp, table: Table, message: impl Into<String>) {
        self.lock().failures.insert((op, table), message.into());
    }

    fn record(&self, op: StoreOp, table: Table) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall { op, table });
        match state.failures.get(&(op, table)) {
            Some(message) => Err(StoreError::rejected(400, message.clone())),
            None => Ok(()),
        }
    }
}

fn cell_matches(cell: Option<&Value>, expected: &str) -> bool {
    match cell {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == expected,
    }
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| cell_matches(row.get(f.column), &f.value))
}

/// Compare two cells, as timestamps when both parse.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let text = |v: Option<&Value>| match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let (a, b) = (text(a), text(b));

    match (
        DateTime::parse_from_rfc3339(&a),
        DateTime::parse_from_rfc3339(&b),
    ) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(&b),
    }
}

fn project(row: &Value, columns: &str) -> Value {
    if columns == "*" {
        return row.clone();
    }

    let mut projected = Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(value) = row.get(column) {
            projected.insert(column.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}

#[async_trait]
impl DataStore for MemoryDataStore {
    async fn insert(
        &self,
        _token: &AccessToken,
        table: Table,
        mut row: Value,
    ) -> Result<(), StoreError> {
        self.record(StoreOp::Insert, table)?;

        if let Value::Object(fields) = &mut row {
            fields
                .entry("id")
                .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
        }
        self.seed(table, row);
        Ok(())
    }

    async fn select(&self, _token: &AccessToken, query: &Select) -> Result<Vec<Value>, StoreError> {
        self.record(StoreOp::Select, query.table)?;

        let mut rows: Vec<Value> = self
            .rows(query.table)
            .into_iter()
            .filter(|row| row_matches(row, &query.filters))
            .collect();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_cells(a.get(order.column), b.get(order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.iter().map(|row| project(row, query.columns)).collect())
    }

    async fn update(
        &self,
        _token: &AccessToken,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<(), StoreError> {
        self.record(StoreOp::Update, table)?;

        let mut state = self.lock();
        let rows = state.tables.entry(table).or_default();
        for row in rows.iter_mut().filter(|row| row_matches(row, filters)) {
            if let (Value::Object(fields), Value::Object(changes)) = (&mut *row, &patch) {
                for (key, value) in changes {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// =============================================================================
// Identity provider
// =============================================================================

/// Lifetime of issued access tokens unless a test changes it.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

struct Account {
    id: UserId,
    password: String,
}

struct IssuedToken {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

struct IdentityState {
    tokens: HashMap<String, IssuedToken>,
    refresh_tokens: HashMap<String, Identity>,
    accounts: HashMap<String, Account>,
    sign_ups: Vec<SignUpRecord>,
    token_lifetime: Duration,
    lookups: usize,
    refreshes: usize,
    lookup_failure: Option<String>,
    sign_up_failure: Option<String>,
    refresh_failure: Option<String>,
}

impl Default for IdentityState {
    fn default() -> Self {
        Self {
            tokens: HashMap::new(),
            refresh_tokens: HashMap::new(),
            accounts: HashMap::new(),
            sign_ups: Vec::new(),
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            lookups: 0,
            refreshes: 0,
            lookup_failure: None,
            sign_up_failure: None,
            refresh_failure: None,
        }
    }
}

/// A signup the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRecord {
    pub email: String,
    pub zip_code: String,
}

/// An [`IdentityProvider`] with accounts and tokens held in memory.
#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    state: Arc<Mutex<IdentityState>>,
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IdentityState> {
        self.state.lock().expect("identity provider lock")
    }

    /// Issue a valid token for `user`.
    pub fn issue_token(&self, user: UserId, email: &str) -> AccessToken {
        self.issue_session(Identity {
            id: user,
            email: Some(email.to_string()),
        })
        .token
    }

    /// Issue an access token, with the current lifetime, and a refresh token.
    fn issue_session(&self, identity: Identity) -> AuthSession {
        let access = format!("token-{}", uuid::Uuid::new_v4());
        let refresh = format!("refresh-{}", uuid::Uuid::new_v4());

        let mut state = self.lock();
        let lifetime =
            chrono::Duration::from_std(state.token_lifetime).expect("token lifetime in range");
        let expires_at = Utc::now() + lifetime;
        state.tokens.insert(
            access.clone(),
            IssuedToken {
                identity: identity.clone(),
                expires_at,
            },
        );
        state.refresh_tokens.insert(refresh.clone(), identity.clone());

        AuthSession {
            token: AccessToken::new(access),
            refresh_token: Some(SecretString::from(refresh)),
            expires_at: Some(expires_at),
            identity,
        }
    }

    /// Lifetime of access tokens issued from now on. Zero issues tokens
    /// that are already expired.
    pub fn set_token_lifetime(&self, lifetime: Duration) {
        self.lock().token_lifetime = lifetime;
    }

    /// Create a confirmed account that can sign in.
    pub fn register(&self, email: &str, password: &str) -> UserId {
        let id = UserId::random();
        self.lock().accounts.insert(
            email.to_lowercase(),
            Account {
                id,
                password: password.to_string(),
            },
        );
        id
    }

    /// Make every identity lookup fail with `message`.
    pub fn fail_lookups(&self, message: impl Into<String>) {
        self.lock().lookup_failure = Some(message.into());
    }

    /// Make signup fail with `message`.
    pub fn fail_sign_up(&self, message: impl Into<String>) {
        self.lock().sign_up_failure = Some(message.into());
    }

    /// Make every refresh fail with `message`.
    pub fn fail_refresh(&self, message: impl Into<String>) {
        self.lock().refresh_failure = Some(message.into());
    }

    /// Number of `refresh` calls received.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.lock().refreshes
    }

    /// Number of `current_user` calls received.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lock().lookups
    }

    /// Signups accepted so far.
    #[must_use]
    pub fn sign_ups(&self) -> Vec<SignUpRecord> {
        self.lock().sign_ups.clone()
    }

    /// Whether `token` is still valid.
    #[must_use]
    pub fn is_live(&self, token: &AccessToken) -> bool {
        self.lock()
            .tokens
            .get(token.expose())
            .is_some_and(|issued| issued.expires_at > Utc::now())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn current_user(&self, token: &AccessToken) -> Result<Option<Identity>, AuthError> {
        let mut state = self.lock();
        state.lookups += 1;
        if let Some(message) = &state.lookup_failure {
            return Err(AuthError::Rejected {
                status: 500,
                message: message.clone(),
            });
        }
        Ok(state
            .tokens
            .get(token.expose())
            .filter(|issued| issued.expires_at > Utc::now())
            .map(|issued| issued.identity.clone()))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), AuthError> {
        let mut state = self.lock();
        if let Some(message) = &state.sign_up_failure {
            return Err(AuthError::Rejected {
                status: 422,
                message: message.clone(),
            });
        }
        if state.accounts.contains_key(request.email.as_str()) {
            return Err(AuthError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        state.accounts.insert(
            request.email.as_str().to_string(),
            Account {
                id: UserId::random(),
                password: request.password.expose_secret().to_string(),
            },
        );
        state.sign_ups.push(SignUpRecord {
            email: request.email.as_str().to_string(),
            zip_code: request.zip_code.as_str().to_string(),
        });
        Ok(())
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let id = {
            let state = self.lock();
            match state.accounts.get(email.as_str()) {
                Some(account) if account.password == password.expose_secret() => account.id,
                _ => {
                    return Err(AuthError::Rejected {
                        status: 400,
                        message: "Invalid login credentials".to_string(),
                    });
                }
            }
        };

        Ok(self.issue_session(Identity {
            id,
            email: Some(email.as_str().to_string()),
        }))
    }

    async fn refresh(&self, refresh_token: &SecretString) -> Result<AuthSession, AuthError> {
        let identity = {
            let mut state = self.lock();
            state.refreshes += 1;
            if let Some(message) = &state.refresh_failure {
                return Err(AuthError::Rejected {
                    status: 500,
                    message: message.clone(),
                });
            }
            state
                .refresh_tokens
                .remove(refresh_token.expose_secret())
                .ok_or_else(|| AuthError::Rejected {
                    status: 400,
                    message: "Invalid Refresh Token: Refresh Token Not Found".to_string(),
                })?
        };

        Ok(self.issue_session(identity))
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        self.lock().tokens.remove(token.expose());
        Ok(())
    }
}

// =============================================================================
// Webhook
// =============================================================================

/// A [`VettingNotifier`] that records every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<VettingNotification>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make delivery fail with `message` (notifications are still recorded).
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().expect("notifier failure lock") = Some(message.into());
    }

    /// Notifications received so far.
    #[must_use]
    pub fn sent(&self) -> Vec<VettingNotification> {
        self.sent.lock().expect("notifier sent lock").clone()
    }
}

#[async_trait]
impl VettingNotifier for RecordingNotifier {
    async fn notify(&self, notification: &VettingNotification) -> Result<(), WebhookError> {
        self.sent
            .lock()
            .expect("notifier sent lock")
            .push(notification.clone());

        match self.failure.lock().expect("notifier failure lock").clone() {
            Some(message) => Err(WebhookError::Api {
                status: 502,
                message,
            }),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// The three doubles plus a [`Marketplace`] wired to them.
#[derive(Clone, Default)]
pub struct TestBackend {
    pub identity: MemoryIdentityProvider,
    pub store: MemoryDataStore,
    pub notifier: RecordingNotifier,
}

impl TestBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A marketplace backed by these doubles.
    #[must_use]
    pub fn marketplace(&self) -> Marketplace {
        Marketplace::new(
            Arc::new(self.identity.clone()),
            Arc::new(self.store.clone()),
            Arc::new(self.notifier.clone()),
        )
    }

    /// A signed-in caller: their ID and a valid token.
    pub fn sign_in(&self, email: &str) -> (UserId, AccessToken) {
        let user = UserId::random();
        (user, self.identity.issue_token(user, email))
    }
}
