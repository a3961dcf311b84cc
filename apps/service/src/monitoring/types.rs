use serde::{Deserialize, Serialize};

use crate::models::{Check, CheckState};

/// Why a probe produced no usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeError {
    NetworkError,
    Timeout,
}

/// Classified result of exactly one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// HTTP status of the response, when one arrived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(default, rename = "errorKind", skip_serializing_if = "Option::is_none")]
    pub error: Option<ProbeError>,
}

impl Outcome {
    pub fn response(code: u16) -> Self {
        Self { response_code: Some(code), error: None }
    }

    pub fn network_error() -> Self {
        Self { response_code: None, error: Some(ProbeError::NetworkError) }
    }

    pub fn timeout() -> Self {
        Self { response_code: None, error: Some(ProbeError::Timeout) }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One complete evaluation of a check; also the audit-log entry body.
///
/// `check` is the record as it stood before this evaluation updated it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub check: Check,
    pub outcome: Outcome,
    pub state: CheckState,
    pub alert_warranted: bool,
    /// Epoch milliseconds of the evaluation.
    pub time: i64,
}
