//! AWS Cognito identity provider implementation
//!
//! Forwards each operation to the Cognito user pool APIs and maps the
//! provider's error codes into the [`IdentityError`] taxonomy.

use std::collections::HashMap;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_cognitoidentityprovider::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cognitoidentityprovider::primitives::DateTime as AwsDateTime;
use aws_sdk_cognitoidentityprovider::types::{
    AttributeType, AuthFlowType, AuthenticationResultType, CodeDeliveryDetailsType,
};
use aws_sdk_cognitoidentityprovider::Client;
use chrono::{DateTime, Utc};

use crate::{
    AuthTokens, CodeDelivery, IdentityError, IdentityProvider, IdentityUser, SignUpOutcome,
    UserPage,
};

/// Attributes Cognito accepts without the `custom:` prefix
const STANDARD_ATTRIBUTES: &[&str] = &["email", "name", "phone_number", "given_name", "family_name"];

/// Cognito-backed identity provider
pub struct CognitoIdentityProvider {
    client: Client,
    user_pool_id: String,
    client_id: String,
}

impl CognitoIdentityProvider {
    /// Create a provider with default AWS configuration for the region
    pub async fn new(region: String, user_pool_id: String, client_id: String) -> Self {
        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .load()
            .await;

        Self {
            client: Client::new(&aws_config),
            user_pool_id,
            client_id,
        }
    }

    /// Create a provider from an already-built client (tests, LocalStack)
    pub fn from_client(client: Client, user_pool_id: String, client_id: String) -> Self {
        Self {
            client,
            user_pool_id,
            client_id,
        }
    }
}

/// Prefix non-standard attribute names with `custom:`
fn shape_attribute_name(name: &str) -> String {
    if name.starts_with("custom:") || STANDARD_ATTRIBUTES.contains(&name) {
        name.to_string()
    } else {
        format!("custom:{name}")
    }
}

fn build_attribute(name: &str, value: &str) -> Result<AttributeType, IdentityError> {
    AttributeType::builder()
        .name(shape_attribute_name(name))
        .value(value)
        .build()
        .map_err(|e| IdentityError::Provider(format!("Invalid attribute {name}: {e}")))
}

/// Normalize an SDK failure, logging the diagnostic here only
fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> IdentityError
where
    E: ProvideErrorMetadata + std::fmt::Debug,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => {
            let code = service.code();
            let message = service
                .message()
                .unwrap_or("Identity provider error")
                .to_string();
            tracing::error!(operation, code = ?code, message = %message, "Cognito error");
            IdentityError::from_code(code, message)
        }
        None => {
            tracing::error!(operation, error = ?err, "Cognito call failed before the service");
            IdentityError::Unavailable
        }
    }
}

fn to_chrono(dt: Option<&AwsDateTime>) -> Option<DateTime<Utc>> {
    dt.and_then(|d| DateTime::from_timestamp(d.secs(), d.subsec_nanos()))
}

fn code_delivery(details: Option<&CodeDeliveryDetailsType>) -> Option<CodeDelivery> {
    details.map(|d| CodeDelivery {
        destination: d.destination().map(str::to_string),
        medium: d.delivery_medium().map(|m| m.as_str().to_string()),
        attribute: d.attribute_name().map(str::to_string),
    })
}

fn tokens_from_result(result: &AuthenticationResultType) -> Result<AuthTokens, IdentityError> {
    let access_token = result
        .access_token()
        .ok_or_else(|| IdentityError::Provider("Provider returned no access token".to_string()))?
        .to_string();

    Ok(AuthTokens {
        access_token,
        id_token: result.id_token().map(str::to_string),
        refresh_token: result.refresh_token().map(str::to_string),
        expires_in: result.expires_in(),
        token_type: result.token_type().unwrap_or("Bearer").to_string(),
    })
}

fn user_from_attributes(
    username: String,
    enabled: bool,
    status: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    attributes: &[AttributeType],
) -> IdentityUser {
    let attributes = attributes
        .iter()
        .filter_map(|a| {
            a.value()
                .map(|v| (a.name().to_string(), v.to_string()))
        })
        .collect::<HashMap<_, _>>();

    IdentityUser {
        username,
        enabled,
        status,
        created_at,
        updated_at,
        attributes,
    }
}

#[async_trait::async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<SignUpOutcome, IdentityError> {
        let mut request = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .user_attributes(build_attribute("email", email)?);

        for (name, value) in attributes {
            request = request.user_attributes(build_attribute(name, value)?);
        }

        let out = request
            .send()
            .await
            .map_err(|e| map_sdk_error("sign_up", e))?;

        Ok(SignUpOutcome {
            user_confirmed: out.user_confirmed(),
            user_sub: out.user_sub().to_string(),
            code_delivery: code_delivery(out.code_delivery_details()),
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .send()
            .await
            .map_err(|e| map_sdk_error("confirm_sign_up", e))?;

        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthTokens, IdentityError> {
        let out = self
            .client
            .initiate_auth()
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|e| map_sdk_error("login", e))?;

        match out.authentication_result() {
            Some(result) => tokens_from_result(result),
            None => {
                // NEW_PASSWORD_REQUIRED and similar challenges are not
                // part of this flow
                let challenge = out
                    .challenge_name()
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::warn!(challenge = %challenge, "Login returned a challenge instead of tokens");
                Err(IdentityError::Provider(format!(
                    "Authentication challenge required: {challenge}"
                )))
            }
        }
    }

    async fn refresh(
        &self,
        email: &str,
        refresh_token: &str,
    ) -> Result<AuthTokens, IdentityError> {
        let out = self
            .client
            .initiate_auth()
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .auth_parameters("USERNAME", email)
            .auth_parameters("REFRESH_TOKEN", refresh_token)
            .send()
            .await
            .map_err(|e| map_sdk_error("refresh", e))?;

        let result = out.authentication_result().ok_or_else(|| {
            IdentityError::Provider("Provider returned no tokens on refresh".to_string())
        })?;

        tokens_from_result(result)
    }

    async fn forgot_password(&self, email: &str) -> Result<Option<CodeDelivery>, IdentityError> {
        let out = self
            .client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .send()
            .await
            .map_err(|e| map_sdk_error("forgot_password", e))?;

        Ok(code_delivery(out.code_delivery_details()))
    }

    async fn confirm_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(new_password)
            .send()
            .await
            .map_err(|e| map_sdk_error("confirm_password", e))?;

        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        self.client
            .change_password()
            .access_token(access_token)
            .previous_password(current_password)
            .proposed_password(new_password)
            .send()
            .await
            .map_err(|e| map_sdk_error("change_password", e))?;

        Ok(())
    }

    async fn admin_get_user(&self, username: &str) -> Result<IdentityUser, IdentityError> {
        let out = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await
            .map_err(|e| map_sdk_error("admin_get_user", e))?;

        Ok(user_from_attributes(
            out.username().to_string(),
            out.enabled(),
            out.user_status().map(|s| s.as_str().to_string()),
            to_chrono(out.user_create_date()),
            to_chrono(out.user_last_modified_date()),
            out.user_attributes(),
        ))
    }

    async fn list_users(
        &self,
        limit: i32,
        pagination_token: Option<String>,
    ) -> Result<UserPage, IdentityError> {
        let out = self
            .client
            .list_users()
            .user_pool_id(&self.user_pool_id)
            .limit(limit)
            .set_pagination_token(pagination_token)
            .send()
            .await
            .map_err(|e| map_sdk_error("list_users", e))?;

        let users = out
            .users()
            .iter()
            .map(|u| {
                user_from_attributes(
                    u.username().unwrap_or_default().to_string(),
                    u.enabled(),
                    u.user_status().map(|s| s.as_str().to_string()),
                    to_chrono(u.user_create_date()),
                    to_chrono(u.user_last_modified_date()),
                    u.attributes(),
                )
            })
            .collect();

        Ok(UserPage {
            users,
            pagination_token: out.pagination_token().map(str::to_string),
        })
    }

    async fn admin_update_attributes(
        &self,
        username: &str,
        attributes: &HashMap<String, String>,
    ) -> Result<(), IdentityError> {
        let mut request = self
            .client
            .admin_update_user_attributes()
            .user_pool_id(&self.user_pool_id)
            .username(username);

        for (name, value) in attributes {
            request = request.user_attributes(build_attribute(name, value)?);
        }

        request
            .send()
            .await
            .map_err(|e| map_sdk_error("admin_update_attributes", e))?;

        Ok(())
    }
}
