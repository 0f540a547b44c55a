//! Convenience re-exports.

pub use crate::auth::{AuthToken, Authenticator, CredentialKey, Credentials, VersionCheck};
pub use crate::config::{ResourcePolicy, Settings};
pub use crate::error::{AuthError, Result};
pub use crate::repository::{
    Repositories, ResourceMap, ResourceRepository, TokenRepository, VersionRecord,
    VersionRepository,
};
pub use crate::storage::{FileStorage, MemoryStorage, Storage};
pub use crate::transport::{HttpResponse, HttpTransport, RequestOptions};
