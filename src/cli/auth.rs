//! CLI command handlers.

use std::path::Path;

use super::LoginArgs;
use crate::auth::Authenticator;
use crate::config::{Settings, StorageKind};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Settings for CLI use: always file-backed so tokens outlive the process.
pub fn cli_settings(config: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load(config)?;
    settings.storage.kind = StorageKind::File;
    Ok(settings)
}

fn authenticator(settings: Settings) -> Result<Authenticator, Box<dyn std::error::Error>> {
    Ok(Authenticator::builder().settings(settings).build()?)
}

/// Handle `sfauth login`.
pub async fn handle_login(settings: Settings, args: &LoginArgs) -> CliResult {
    let mut auth = authenticator(settings)?;
    let is_new = auth.authenticate(&args.credentials()).await?;
    let token = auth.token_repo().get()?;
    if is_new {
        println!("✅ New token issued");
    } else {
        println!("✅ Using cached token");
    }
    println!(
        "   Instance: {}",
        token.instance_url.as_deref().unwrap_or("(unknown)")
    );
    Ok(())
}

/// Handle `sfauth refresh`.
pub async fn handle_refresh(settings: Settings) -> CliResult {
    let auth = authenticator(settings)?;
    let token = auth.refresh().await?;
    println!("✅ Token refreshed");
    if let Some(issued) = token.issued_at_time() {
        println!("   Issued: {issued}");
    }
    Ok(())
}

/// Handle `sfauth status`.
pub async fn handle_status(settings: Settings) -> CliResult {
    let auth = authenticator(settings)?;
    if !auth.token_repo().has()? {
        println!("Not logged in");
        return Ok(());
    }
    let token = auth.token_repo().get()?;
    println!("Logged in ({})", token.token_type);
    println!(
        "   Instance: {}",
        token.instance_url.as_deref().unwrap_or("(unknown)")
    );
    if auth.version_repo().has()? {
        let version = auth.version_repo().get()?;
        println!("   API version: {} ({})", version.version, version.label);
    }
    if auth.resource_repo().has()? {
        println!("   Resources: {}", auth.resource_repo().get()?.len());
    }
    Ok(())
}

/// Handle `sfauth revoke`.
pub async fn handle_revoke(settings: Settings) -> CliResult {
    let auth = authenticator(settings)?;
    auth.revoke().await?;
    println!("✅ Token revoked (still cached; use `logout` to remove it)");
    Ok(())
}

/// Handle `sfauth logout`: revoke, then flush the cache.
pub async fn handle_logout(settings: Settings) -> CliResult {
    let auth = authenticator(settings)?;
    if auth.token_repo().has()? {
        if let Err(err) = auth.revoke().await {
            eprintln!("⚠️  Revocation failed: {err}");
        }
    }
    auth.flush_token()?;
    println!("✅ Logged out");
    Ok(())
}
