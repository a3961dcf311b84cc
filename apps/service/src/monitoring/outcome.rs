//! Up/down state machine and the side effects of one evaluation.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::types::{Evaluation, Outcome};
use crate::alert::{AlertDispatcher, status_change_message};
use crate::audit::AuditLog;
use crate::models::{Check, CheckState};
use crate::store::{CHECKS, FileStore};

pub struct OutcomeProcessor {
    store: Arc<FileStore>,
    audit: Arc<AuditLog>,
    alerts: Arc<dyn AlertDispatcher>,
}

impl OutcomeProcessor {
    pub fn new(store: Arc<FileStore>, audit: Arc<AuditLog>, alerts: Arc<dyn AlertDispatcher>) -> Self {
        Self { store, audit, alerts }
    }

    /// Apply the state machine to one probe outcome and perform the side
    /// effects in order: persist the updated check, append the audit entry,
    /// then alert the owner if warranted.
    ///
    /// The three effects are independent: a persistence failure is reported
    /// and does not suppress the audit entry, and an alert failure never
    /// rolls back the state update. The check's very first evaluation sets
    /// `lastChecked` without ever alerting.
    pub async fn process(&self, check: Check, outcome: Outcome) -> Evaluation {
        let state = if !outcome.is_error()
            && outcome.response_code.is_some_and(|code| check.success_codes.contains(&code))
        {
            CheckState::Up
        } else {
            CheckState::Down
        };
        let alert_warranted = check.last_checked.is_some() && check.state != state;
        let time = Utc::now().timestamp_millis();

        let mut updated = check.clone();
        updated.state = state;
        updated.last_checked = Some(time);

        if let Err(e) = self.store.update(CHECKS, &updated.id, &updated).await {
            error!(check = %updated.id, error = %e, "failed to persist check evaluation");
        }

        let evaluation = Evaluation { check, outcome, state, alert_warranted, time };
        if let Err(e) = self.audit.append(&evaluation.check.id, &evaluation).await {
            error!(check = %evaluation.check.id, error = %e, "failed to append audit log entry");
        }

        if alert_warranted {
            let message = status_change_message(&updated);
            match self.alerts.send(&updated.user_phone, &message).await {
                Ok(()) => info!(check = %updated.id, state = %state, "owner alerted to state change"),
                Err(e) => error!(check = %updated.id, error = %e, "failed to alert owner to state change"),
            }
        } else {
            debug!(check = %evaluation.check.id, "check state unchanged, no alert needed");
        }

        evaluation
    }
}
