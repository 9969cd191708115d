//! Realm settings consumed by the session layer
//!
//! Realm lookup itself happens outside this crate; callers hand a resolved
//! [`Realm`] to every operation.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// When cookies issued for a realm must carry the `Secure` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslRequired {
    /// Every request must use TLS.
    All,
    /// TLS is required unless the client connects from a local address.
    External,
    /// TLS is never required.
    None,
}

impl SslRequired {
    pub fn is_required(&self, connection: &ClientConnection) -> bool {
        match self {
            SslRequired::All => true,
            SslRequired::External => !connection.is_local(),
            SslRequired::None => false,
        }
    }
}

impl FromStr for SslRequired {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(SslRequired::All),
            "external" => Ok(SslRequired::External),
            "none" => Ok(SslRequired::None),
            other => Err(format!("Unknown ssl-required policy: {other}")),
        }
    }
}

impl fmt::Display for SslRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SslRequired::All => "all",
            SslRequired::External => "external",
            SslRequired::None => "none",
        };
        f.write_str(value)
    }
}

/// Network facts about the client that sent the current request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientConnection {
    pub remote_addr: Option<IpAddr>,
}

impl ClientConnection {
    pub fn new(remote_addr: Option<IpAddr>) -> Self {
        Self { remote_addr }
    }

    /// Loopback, private, link-local and unique-local addresses count as local,
    /// as do IPv4-mapped IPv6 forms of them. An unknown address is never local.
    pub fn is_local(&self) -> bool {
        match self.remote_addr {
            Some(IpAddr::V4(addr)) => addr.is_loopback() || addr.is_private() || addr.is_link_local(),
            Some(IpAddr::V6(addr)) => match addr.to_ipv4_mapped() {
                Some(mapped) => ClientConnection::new(Some(IpAddr::V4(mapped))).is_local(),
                None => {
                    let first = addr.segments()[0];
                    addr.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
                }
            },
            None => false,
        }
    }
}

/// Per-realm session settings. Lifespans are in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    pub name: String,
    pub ssl_required: SslRequired,
    /// Time a client has to finish the authorization code flow. Doubles as the
    /// grace window after one tab completes authentication.
    pub access_code_lifespan: i64,
    /// Lifespan of user-action codes and of the detached page state cookie.
    pub access_code_lifespan_user_action: i64,
    /// Time a user has to complete the login.
    pub access_code_lifespan_login: i64,
}

impl Realm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ssl_required: SslRequired::External,
            access_code_lifespan: 60,
            access_code_lifespan_user_action: 300,
            access_code_lifespan_login: 1800,
        }
    }

    pub fn with_ssl_required(mut self, ssl_required: SslRequired) -> Self {
        self.ssl_required = ssl_required;
        self
    }

    /// Path every realm-scoped cookie is bound to.
    pub fn cookie_path(&self) -> String {
        format!("/realms/{}/", self.name)
    }

    /// Full lifespan of a root authentication session.
    ///
    /// Always at least `access_code_lifespan`, so a grace-scheduled timestamp
    /// never lands in the future.
    pub fn auth_session_lifespan(&self) -> i64 {
        self.access_code_lifespan_login
            .max(self.access_code_lifespan_user_action)
            .max(self.access_code_lifespan)
    }
}
