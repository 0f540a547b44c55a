//! In-memory credential store with partial-update semantics.

use bon::Builder;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use crate::error::{AuthError, Result};

/// Recognized credential keys, named as callers pass them in key/value maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum CredentialKey {
    #[strum(to_string = "loginURL")]
    LoginUrl,
    ConsumerKey,
    ConsumerSecret,
    Username,
    Password,
    AccessToken,
    RefreshToken,
    InstanceUrl,
    TokenType,
}

/// Identity parameters used to obtain a token.
///
/// Every field is optional; [`Credentials::merge`] only copies non-empty values,
/// so a partial update never erases what was set before. Secret fields are
/// held as [`SecretString`] and redacted from `Debug` output.
///
/// # Example
/// ```
/// use sfauth::auth::Credentials;
///
/// let mut stored = Credentials::builder()
///     .login_url("https://login.salesforce.com")
///     .consumer_key("key")
///     .build();
/// stored.merge(&Credentials::builder().username("user").build());
/// assert_eq!(stored.consumer_key.as_deref(), Some("key"));
/// assert_eq!(stored.username.as_deref(), Some("user"));
/// ```
#[derive(Debug, Clone, Default, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    #[serde(rename = "loginURL", skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub login_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub consumer_key: Option<String>,
    #[serde(with = "super::secret::option", skip_serializing_if = "Option::is_none")]
    #[builder(with = |value: impl Into<String>| SecretString::new(value.into()))]
    pub consumer_secret: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub username: Option<String>,
    #[serde(with = "super::secret::option", skip_serializing_if = "Option::is_none")]
    #[builder(with = |value: impl Into<String>| SecretString::new(value.into()))]
    pub password: Option<SecretString>,
    /// Pre-obtained access token; bypasses the token endpoint entirely.
    #[serde(with = "super::secret::option", skip_serializing_if = "Option::is_none")]
    #[builder(with = |value: impl Into<String>| SecretString::new(value.into()))]
    pub access_token: Option<SecretString>,
    #[serde(with = "super::secret::option", skip_serializing_if = "Option::is_none")]
    #[builder(with = |value: impl Into<String>| SecretString::new(value.into()))]
    pub refresh_token: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub instance_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub token_type: Option<String>,
}

enum Field<'a> {
    Plain(&'a Option<String>),
    Secret(&'a Option<SecretString>),
}

enum FieldMut<'a> {
    Plain(&'a mut Option<String>),
    Secret(&'a mut Option<SecretString>),
}

impl Credentials {
    /// Build credentials from string pairs keyed by [`CredentialKey`] names.
    ///
    /// Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut credentials = Self::default();
        for (name, value) in pairs {
            match name.as_ref().parse::<CredentialKey>() {
                Ok(key) => credentials.set(key, value),
                Err(_) => debug!(key = name.as_ref(), "ignoring unrecognized credential key"),
            }
        }
        credentials
    }

    /// Non-empty value of a non-secret field. Secret keys always yield `None`;
    /// read those with [`Credentials::secret`].
    pub fn get(&self, key: CredentialKey) -> Option<&str> {
        match self.field(key) {
            Field::Plain(value) => value.as_deref().filter(|value| !value.is_empty()),
            Field::Secret(_) => None,
        }
    }

    /// Non-empty value of a secret field. Other keys always yield `None`.
    pub fn secret(&self, key: CredentialKey) -> Option<&SecretString> {
        match self.field(key) {
            Field::Secret(value) => value
                .as_ref()
                .filter(|value| !value.expose_secret().is_empty()),
            Field::Plain(_) => None,
        }
    }

    /// True when `key` holds a non-empty value.
    pub fn is_set(&self, key: CredentialKey) -> bool {
        self.get(key).is_some() || self.secret(key).is_some()
    }

    /// Like [`Credentials::get`], or [`AuthError::MissingCredential`].
    pub fn require(&self, key: CredentialKey) -> Result<&str> {
        self.get(key).ok_or(AuthError::MissingCredential(key))
    }

    /// Like [`Credentials::secret`], or [`AuthError::MissingCredential`].
    pub fn require_secret(&self, key: CredentialKey) -> Result<&SecretString> {
        self.secret(key).ok_or(AuthError::MissingCredential(key))
    }

    pub fn set(&mut self, key: CredentialKey, value: impl Into<String>) {
        let value = value.into();
        match self.field_mut(key) {
            FieldMut::Plain(slot) => *slot = Some(value),
            FieldMut::Secret(slot) => *slot = Some(SecretString::new(value)),
        }
    }

    /// Overwrite stored fields with every non-empty field of `supplied`.
    pub fn merge(&mut self, supplied: &Credentials) {
        for key in CredentialKey::iter() {
            match (self.field_mut(key), supplied.field(key)) {
                (FieldMut::Plain(slot), Field::Plain(_)) => {
                    if let Some(value) = supplied.get(key) {
                        *slot = Some(value.to_string());
                    }
                }
                (FieldMut::Secret(slot), Field::Secret(_)) => {
                    if let Some(value) = supplied.secret(key) {
                        *slot = Some(value.clone());
                    }
                }
                _ => {}
            }
        }
    }

    /// True when no field holds a non-empty value.
    pub fn is_empty(&self) -> bool {
        CredentialKey::iter().all(|key| !self.is_set(key))
    }

    fn field(&self, key: CredentialKey) -> Field<'_> {
        match key {
            CredentialKey::LoginUrl => Field::Plain(&self.login_url),
            CredentialKey::ConsumerKey => Field::Plain(&self.consumer_key),
            CredentialKey::ConsumerSecret => Field::Secret(&self.consumer_secret),
            CredentialKey::Username => Field::Plain(&self.username),
            CredentialKey::Password => Field::Secret(&self.password),
            CredentialKey::AccessToken => Field::Secret(&self.access_token),
            CredentialKey::RefreshToken => Field::Secret(&self.refresh_token),
            CredentialKey::InstanceUrl => Field::Plain(&self.instance_url),
            CredentialKey::TokenType => Field::Plain(&self.token_type),
        }
    }

    fn field_mut(&mut self, key: CredentialKey) -> FieldMut<'_> {
        match key {
            CredentialKey::LoginUrl => FieldMut::Plain(&mut self.login_url),
            CredentialKey::ConsumerKey => FieldMut::Plain(&mut self.consumer_key),
            CredentialKey::ConsumerSecret => FieldMut::Secret(&mut self.consumer_secret),
            CredentialKey::Username => FieldMut::Plain(&mut self.username),
            CredentialKey::Password => FieldMut::Secret(&mut self.password),
            CredentialKey::AccessToken => FieldMut::Secret(&mut self.access_token),
            CredentialKey::RefreshToken => FieldMut::Secret(&mut self.refresh_token),
            CredentialKey::InstanceUrl => FieldMut::Plain(&mut self.instance_url),
            CredentialKey::TokenType => FieldMut::Plain(&mut self.token_type),
        }
    }
}
