//! One scheduler pass: discover, validate, probe, and process every check.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use super::outcome::OutcomeProcessor;
use super::probe::ProbeEngine;
use super::types::Evaluation;
use super::validation::validate_check;
use crate::models::Check;
use crate::store::{CHECKS, FileStore};

pub struct Worker {
    store: Arc<FileStore>,
    engine: ProbeEngine,
    processor: OutcomeProcessor,
}

impl Worker {
    pub fn new(store: Arc<FileStore>, engine: ProbeEngine, processor: OutcomeProcessor) -> Self {
        Self { store, engine, processor }
    }

    /// Run one pass over all registered checks. Checks are evaluated
    /// concurrently and independently: a failure on one is reported and
    /// skipped without touching the others or aborting the pass.
    pub async fn run_tick(&self) -> Vec<Evaluation> {
        let ids = match self.store.list(CHECKS).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "failed to list checks, skipping this pass");
                return Vec::new();
            }
        };
        if ids.is_empty() {
            debug!("no checks registered");
            return Vec::new();
        }

        debug!(count = ids.len(), "evaluating checks");
        let evaluations = join_all(ids.iter().map(|id| self.evaluate(id))).await;
        evaluations.into_iter().flatten().collect()
    }

    /// Evaluate a single check end to end. Returns `None` when the check was
    /// skipped (unreadable or malformed); it is reconsidered next tick
    /// without modification.
    async fn evaluate(&self, id: &str) -> Option<Evaluation> {
        let check: Check = match self.store.read(CHECKS, id).await {
            Ok(check) => check,
            Err(e) => {
                warn!(check = %id, error = %e, "failed to read check, skipping");
                return None;
            }
        };

        if let Err(e) = validate_check(&check) {
            warn!(check = %id, error = %e, "check is not properly formed, skipping");
            return None;
        }

        let outcome = self.engine.probe(&check).await;
        Some(self.processor.process(check, outcome).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertDispatcher;
    use crate::audit::AuditLog;
    use crate::models::{CheckState, HttpMethod, Protocol};
    use anyhow::Result;
    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    struct NullDispatcher;

    #[async_trait]
    impl AlertDispatcher for NullDispatcher {
        async fn send(&self, _phone: &str, _message: &str) -> Result<()> {
            Ok(())
        }
    }

    fn worker(data_dir: &TempDir, log_dir: &TempDir) -> (Arc<FileStore>, Worker) {
        let store = Arc::new(FileStore::new(data_dir.path()));
        let audit = Arc::new(AuditLog::new(log_dir.path()));
        let processor = OutcomeProcessor::new(store.clone(), audit, Arc::new(NullDispatcher));
        let engine = ProbeEngine::new().unwrap();
        (store.clone(), Worker::new(store, engine, processor))
    }

    async fn serve_ok() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            }
        });
        format!("127.0.0.1:{}", addr.port())
    }

    fn check(id: &str, url: String) -> Check {
        Check {
            id: id.to_string(),
            user_phone: "5551234567".to_string(),
            protocol: Protocol::Http,
            url,
            method: HttpMethod::Get,
            success_codes: vec![200],
            timeout_seconds: 1,
            state: CheckState::Down,
            last_checked: None,
        }
    }

    #[tokio::test]
    async fn tick_evaluates_every_valid_check_and_skips_malformed_ones() {
        let data_dir = TempDir::new().unwrap();
        let log_dir = TempDir::new().unwrap();
        let (store, worker) = worker(&data_dir, &log_dir);

        let addr = serve_ok().await;
        let good = check(&"g".repeat(20), addr);
        store.create(CHECKS, &good.id, &good).await.unwrap();

        // Malformed on purpose: timeout outside the allowed range.
        let mut bad = check(&"b".repeat(20), "example.com".to_string());
        bad.timeout_seconds = 30;
        store.create(CHECKS, &bad.id, &bad).await.unwrap();

        let evaluations = worker.run_tick().await;
        assert_eq!(evaluations.len(), 1);
        assert_eq!(evaluations[0].check.id, good.id);
        assert_eq!(evaluations[0].state, CheckState::Up);

        // The malformed check is left exactly as it was.
        let untouched: Check = store.read(CHECKS, &bad.id).await.unwrap();
        assert_eq!(untouched, bad);
    }

    #[tokio::test]
    async fn tick_with_no_checks_is_a_no_op() {
        let data_dir = TempDir::new().unwrap();
        let log_dir = TempDir::new().unwrap();
        let (_store, worker) = worker(&data_dir, &log_dir);

        assert!(worker.run_tick().await.is_empty());
    }
}
