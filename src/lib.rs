//! OAuth2 authentication and token lifecycle for Salesforce-style REST APIs.
//!
//! Obtains access tokens with the password or refresh-token grant, caches
//! them in pluggable storage, and keeps the cached API version and resource
//! map in step with configuration.
//!
//! # Quick Start
//!
//! ```no_run
//! use sfauth::prelude::*;
//!
//! # async fn example() -> sfauth::error::Result<()> {
//! let mut auth = Authenticator::builder()
//!     .settings(Settings::from_env())
//!     .build()?;
//! auth.authenticate(&Credentials::default()).await?;
//! let token = auth.get_auth_token(false).await?;
//! println!("{}", token.instance_url.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod format;
pub mod prelude;
pub mod repository;
pub mod storage;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::AuthError;
