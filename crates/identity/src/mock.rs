//! Mock identity provider
//!
//! Programmable in-memory provider for tests and local development:
//! users live in a map, confirmation codes are fixed, and any
//! operation can be forced to fail with a chosen error.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use gatehouse_common::ROLE_ATTRIBUTE;

use crate::{
    AuthTokens, CodeDelivery, IdentityError, IdentityProvider, IdentityUser, SignUpOutcome,
    UserPage,
};

/// Code accepted by confirmation operations
pub const MOCK_CONFIRMATION_CODE: &str = "123456";

#[derive(Debug, Clone)]
struct MockUser {
    sub: String,
    email: String,
    password: String,
    confirmed: bool,
    enabled: bool,
    attributes: HashMap<String, String>,
}

/// In-memory identity provider with programmable failures
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    users: Arc<RwLock<HashMap<String, MockUser>>>,
    /// access token -> email, for operations keyed by token
    sessions: Arc<RwLock<HashMap<String, String>>>,
    /// When set, every operation fails with this error
    fail_with: Arc<RwLock<Option<IdentityError>>>,
    /// Operation names in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user; `sub` doubles as the username key for admin lookups
    pub fn with_user(self, sub: &str, email: &str, password: &str, role: Option<&str>, confirmed: bool) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("sub".to_string(), sub.to_string());
        attributes.insert("email".to_string(), email.to_string());
        attributes.insert("email_verified".to_string(), confirmed.to_string());
        if let Some(role) = role {
            attributes.insert(ROLE_ATTRIBUTE.to_string(), role.to_string());
        }

        self.users.write().unwrap().insert(
            email.to_string(),
            MockUser {
                sub: sub.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                confirmed,
                enabled: true,
                attributes,
            },
        );
        self
    }

    /// Force every subsequent operation to fail with `error`
    pub fn fail_with(&self, error: Option<IdentityError>) {
        *self.fail_with.write().unwrap() = error;
    }

    /// Associate an externally issued access token with a user
    pub fn bind_token(&self, access_token: &str, email: &str) {
        self.sessions
            .write()
            .unwrap()
            .insert(access_token.to_string(), email.to_string());
    }

    /// Operation names recorded so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, op: &str) -> Result<(), IdentityError> {
        self.calls.write().unwrap().push(op.to_string());
        if let Some(err) = self.fail_with.read().unwrap().clone() {
            return Err(err);
        }
        Ok(())
    }

    fn tokens_for(&self, user: &MockUser) -> AuthTokens {
        let access_token = format!("mock-access-{}", user.sub);
        self.sessions
            .write()
            .unwrap()
            .insert(access_token.clone(), user.email.clone());
        AuthTokens {
            access_token,
            id_token: Some(format!("mock-id-{}", user.sub)),
            refresh_token: Some(format!("mock-refresh-{}", user.sub)),
            expires_in: 3600,
            token_type: "Bearer".to_string(),
        }
    }

    fn identity_user(user: &MockUser) -> IdentityUser {
        IdentityUser {
            username: user.sub.clone(),
            enabled: user.enabled,
            status: Some(if user.confirmed {
                "CONFIRMED".to_string()
            } else {
                "UNCONFIRMED".to_string()
            }),
            created_at: Some(chrono::Utc::now()),
            updated_at: Some(chrono::Utc::now()),
            attributes: user.attributes.clone(),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<SignUpOutcome, IdentityError> {
        self.record("sign_up")?;

        let mut users = self.users.write().unwrap();
        if users.contains_key(email) {
            return Err(IdentityError::UsernameExists);
        }

        let sub = format!("mock-sub-{}", users.len() + 1);
        let mut stored = attributes.clone();
        stored.insert("sub".to_string(), sub.clone());
        stored.insert("email".to_string(), email.to_string());

        users.insert(
            email.to_string(),
            MockUser {
                sub: sub.clone(),
                email: email.to_string(),
                password: password.to_string(),
                confirmed: false,
                enabled: true,
                attributes: stored,
            },
        );

        Ok(SignUpOutcome {
            user_confirmed: false,
            user_sub: sub,
            code_delivery: Some(CodeDelivery {
                destination: Some(email.to_string()),
                medium: Some("EMAIL".to_string()),
                attribute: Some("email".to_string()),
            }),
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.record("confirm_sign_up")?;

        if code != MOCK_CONFIRMATION_CODE {
            return Err(IdentityError::CodeMismatch);
        }

        let mut users = self.users.write().unwrap();
        let user = users.get_mut(email).ok_or(IdentityError::UserNotFound)?;
        user.confirmed = true;
        user.attributes
            .insert("email_verified".to_string(), "true".to_string());
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, IdentityError> {
        self.record("login")?;

        let users = self.users.read().unwrap();
        let user = users.get(email).ok_or(IdentityError::UserNotFound)?;

        if user.password != password {
            return Err(IdentityError::NotAuthorized);
        }
        if !user.confirmed {
            return Err(IdentityError::UserNotConfirmed);
        }

        Ok(self.tokens_for(user))
    }

    async fn refresh(
        &self,
        email: &str,
        refresh_token: &str,
    ) -> Result<AuthTokens, IdentityError> {
        self.record("refresh")?;

        let users = self.users.read().unwrap();
        let user = users.get(email).ok_or(IdentityError::UserNotFound)?;

        if refresh_token != format!("mock-refresh-{}", user.sub) {
            return Err(IdentityError::NotAuthorized);
        }

        Ok(self.tokens_for(user))
    }

    async fn forgot_password(&self, email: &str) -> Result<Option<CodeDelivery>, IdentityError> {
        self.record("forgot_password")?;

        let users = self.users.read().unwrap();
        if !users.contains_key(email) {
            return Err(IdentityError::UserNotFound);
        }

        Ok(Some(CodeDelivery {
            destination: Some(email.to_string()),
            medium: Some("EMAIL".to_string()),
            attribute: Some("email".to_string()),
        }))
    }

    async fn confirm_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        self.record("confirm_password")?;

        if code != MOCK_CONFIRMATION_CODE {
            return Err(IdentityError::CodeMismatch);
        }

        let mut users = self.users.write().unwrap();
        let user = users.get_mut(email).ok_or(IdentityError::UserNotFound)?;
        user.password = new_password.to_string();
        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        self.record("change_password")?;

        let email = self
            .sessions
            .read()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or(IdentityError::NotAuthorized)?;

        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&email).ok_or(IdentityError::UserNotFound)?;

        if user.password != current_password {
            return Err(IdentityError::NotAuthorized);
        }

        user.password = new_password.to_string();
        Ok(())
    }

    async fn admin_get_user(&self, username: &str) -> Result<IdentityUser, IdentityError> {
        self.record("admin_get_user")?;

        let users = self.users.read().unwrap();
        users
            .values()
            .find(|u| u.sub == username || u.email == username)
            .map(Self::identity_user)
            .ok_or(IdentityError::UserNotFound)
    }

    async fn list_users(
        &self,
        limit: i32,
        _pagination_token: Option<String>,
    ) -> Result<UserPage, IdentityError> {
        self.record("list_users")?;

        let users = self.users.read().unwrap();
        let mut listed: Vec<IdentityUser> = users.values().map(Self::identity_user).collect();
        listed.sort_by(|a, b| a.username.cmp(&b.username));
        listed.truncate(limit.max(0) as usize);

        Ok(UserPage {
            users: listed,
            pagination_token: None,
        })
    }

    async fn admin_update_attributes(
        &self,
        username: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<(), IdentityError> {
        self.record("admin_update_attributes")?;

        let mut users = self.users.write().unwrap();
        let user = users
            .values_mut()
            .find(|u| u.sub == username || u.email == username)
            .ok_or(IdentityError::UserNotFound)?;

        for (name, value) in attributes {
            user.attributes.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}
