//! Credential handling, OAuth2 grants and the token lifecycle.

pub mod credentials;
pub mod discovery;
pub mod grant;
pub mod manager;
mod secret;
pub mod token;
pub mod version;

pub use credentials::{CredentialKey, Credentials};
pub use discovery::{Discovery, HttpDiscovery};
pub use grant::{Grant, GrantExecutor};
pub use manager::{refresh_hook, Authenticator, BoxError, RefreshHook};
pub use token::AuthToken;
pub use version::VersionCheck;
