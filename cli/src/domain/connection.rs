//! Connection parameters for one module run.
//!
//! Pure data and validation; no I/O.

use std::fmt;

use serde::Deserialize;

use crate::domain::error::ValidationError;

/// How the client reaches the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Configuration Manager REST API on the array or its SVP.
    #[default]
    Direct,
    /// UAIG porcelain gateway in front of one or more arrays.
    Gateway,
}

impl ConnectionType {
    /// Path prefix every endpoint template is resolved under.
    #[must_use]
    pub fn base_path(self) -> &'static str {
        match self {
            Self::Direct => "ConfigurationManager",
            Self::Gateway => "porcelain",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Gateway => f.write_str("gateway"),
        }
    }
}

/// Credentials resolved from [`ConnectionInfo`].
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials<'a> {
    /// Username/password, exchanged for a session token.
    Basic { username: &'a str, password: &'a str },
    /// Pre-issued API token sent as a bearer token.
    Token(&'a str),
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => write!(f, "Basic({username}, ***)"),
            Self::Token(_) => f.write_str("Token(***)"),
        }
    }
}

/// `connection_info` block of a module-arguments document.
#[derive(Clone, Deserialize)]
pub struct ConnectionInfo {
    pub address: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub subscriber_id: Option<String>,
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("connection_type", &self.connection_type)
            .field("subscriber_id", &self.subscriber_id)
            .finish()
    }
}

impl ConnectionInfo {
    /// Check that the fields required by the connection type are present.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first missing or
    /// contradictory field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::MissingConnectionField("address"));
        }
        self.credentials().map(|_| ())
    }

    /// Resolve which credentials to present.
    ///
    /// # Errors
    ///
    /// Returns an error when the credentials do not fit the connection type.
    pub fn credentials(&self) -> Result<Credentials<'_>, ValidationError> {
        let token = self.api_token.as_deref().filter(|t| !t.is_empty());
        let user = self.username.as_deref().filter(|u| !u.is_empty());
        let pass = self.password.as_deref().filter(|p| !p.is_empty());

        match self.connection_type {
            ConnectionType::Gateway => token
                .map(Credentials::Token)
                .ok_or(ValidationError::MissingConnectionField("api_token")),
            ConnectionType::Direct => match (user, pass, token) {
                (Some(username), Some(password), None) => {
                    Ok(Credentials::Basic { username, password })
                }
                (None, None, Some(t)) => Ok(Credentials::Token(t)),
                (Some(_), Some(_), Some(_)) => Err(ValidationError::Credentials(
                    "use either username/password or api_token, not both".to_string(),
                )),
                (Some(_), None, _) => Err(ValidationError::MissingConnectionField("password")),
                (None, Some(_), _) => Err(ValidationError::MissingConnectionField("username")),
                (None, None, None) => Err(ValidationError::Credentials(
                    "username/password or api_token is required".to_string(),
                )),
            },
        }
    }

    /// `https://{address}/{base}`: an explicit scheme in `address` is kept.
    #[must_use]
    pub fn base_url(&self) -> String {
        let address = self.address.trim().trim_end_matches('/');
        let root = if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("https://{address}")
        };
        format!("{root}/{}", self.connection_type.base_path())
    }
}
