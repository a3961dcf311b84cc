use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheme used to reach a check's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// HTTP verb used when probing a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last observed liveness state of a check.
///
/// A freshly registered check is `Down` until a probe proves otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Up,
    #[default]
    Down,
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Up => write!(f, "up"),
            CheckState::Down => write!(f, "down"),
        }
    }
}

/// Account record, keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    /// 10-digit phone number; doubles as the ownership identity.
    pub phone: String,
    pub hashed_password: String,
    pub tos_agreement: bool,
    /// Ids of the checks this user owns, in creation order.
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Bearer token record, keyed by its 20-character id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub phone: String,
    /// Absolute expiry, epoch milliseconds.
    pub expires: i64,
}

impl Token {
    /// A token is live while its expiry is strictly in the future.
    pub fn is_live(&self, now_ms: i64) -> bool {
        self.expires > now_ms
    }
}

/// A registered monitoring target, keyed by its 20-character id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    /// Owner identity; immutable after creation.
    pub user_phone: String,
    pub protocol: Protocol,
    /// Host (and optional path), without a scheme.
    pub url: String,
    pub method: HttpMethod,
    /// Response codes treated as "up"; never empty.
    pub success_codes: Vec<u16>,
    /// Probe deadline in seconds, 1 through 5.
    pub timeout_seconds: u64,
    #[serde(default)]
    pub state: CheckState,
    /// Epoch milliseconds of the last evaluation; absent before the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<i64>,
}

impl Check {
    /// Full URL the probe engine requests.
    pub fn target(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }
}
