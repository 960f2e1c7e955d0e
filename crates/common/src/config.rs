//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// AWS region hosting the user pool and profile table
    pub region: String,

    /// Cognito user pool configuration
    pub user_pool_id: String,
    pub user_pool_client_id: String,

    /// DynamoDB table holding extended profile records
    pub profiles_table: String,

    /// Runtime configuration
    pub log_level: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),

            user_pool_id: env::var("USER_POOL_ID")
                .map_err(|_| anyhow::anyhow!("USER_POOL_ID is required"))?,
            user_pool_client_id: env::var("USER_POOL_CLIENT_ID")
                .map_err(|_| anyhow::anyhow!("USER_POOL_CLIENT_ID is required"))?,

            profiles_table: env::var("PROFILES_TABLE")
                .map_err(|_| anyhow::anyhow!("PROFILES_TABLE is required"))?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }

    /// Token issuer for this user pool.
    ///
    /// Verified tokens must carry this exact `iss` claim.
    pub fn issuer(&self) -> String {
        format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            self.region, self.user_pool_id
        )
    }

    /// Published key-set endpoint for the user pool
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.issuer())
    }
}
