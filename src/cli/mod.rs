//! CLI entry point for sfauth.

pub mod auth;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::auth::{CredentialKey, Credentials};

/// sfauth CLI
#[derive(Parser, Debug)]
#[command(name = "sfauth", version, about = "Salesforce OAuth2 token manager")]
pub struct Cli {
    /// TOML settings file; environment variables override it
    #[arg(short, long, global = true, env = "SFAUTH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate and cache a token (reuses a cached one)
    Login(LoginArgs),
    /// Request a new token even if one is cached
    Refresh,
    /// Show cached token, version and resources
    Status,
    /// Revoke the cached token at the provider, keeping it cached
    Revoke,
    /// Revoke the cached token and remove it from the cache
    Logout,
}

/// Arguments for `sfauth login`.
#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    #[arg(long)]
    pub login_url: Option<String>,
    #[arg(long)]
    pub consumer_key: Option<String>,
    #[arg(long)]
    pub consumer_secret: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Use the refresh-token grant
    #[arg(long)]
    pub refresh_token: Option<String>,
    /// Store this token instead of calling the token endpoint
    #[arg(long)]
    pub access_token: Option<String>,
    #[arg(long)]
    pub instance_url: Option<String>,
}

impl LoginArgs {
    pub fn credentials(&self) -> Credentials {
        let supplied = [
            (CredentialKey::LoginUrl, &self.login_url),
            (CredentialKey::ConsumerKey, &self.consumer_key),
            (CredentialKey::ConsumerSecret, &self.consumer_secret),
            (CredentialKey::Username, &self.username),
            (CredentialKey::Password, &self.password),
            (CredentialKey::RefreshToken, &self.refresh_token),
            (CredentialKey::AccessToken, &self.access_token),
            (CredentialKey::InstanceUrl, &self.instance_url),
        ];
        let mut credentials = Credentials::default();
        for (key, value) in supplied {
            if let Some(value) = value {
                credentials.set(key, value.as_str());
            }
        }
        credentials
    }
}
