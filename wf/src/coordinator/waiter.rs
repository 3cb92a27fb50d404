//! The wait/check/retry loop

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use super::check::EventCheck;
use crate::config::WaitConfig;
use crate::error::{WaitError, WaitResult};
use crate::event::{EventData, Payload};
use crate::registry::WaitRegistry;

/// Entry point for waiting on events
///
/// Cheap to clone; every clone waits against the same registry. Obtained from
/// [`crate::client::setup`] so that the registry is the one the client's
/// dispatcher resolves.
#[derive(Clone, Debug)]
pub struct WaitCoordinator {
    registry: WaitRegistry,
    config: Arc<WaitConfig>,
}

impl WaitCoordinator {
    pub fn new(registry: WaitRegistry, config: WaitConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &WaitRegistry {
        &self.registry
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Wait for the next `name` event accepted by `check`
    ///
    /// With no `timeout` the configured default applies; with neither, the wait
    /// is unbounded. The deadline is fixed when this is called and is not
    /// extended when `check` rejects an event.
    pub async fn wait_for(
        &self,
        name: &str,
        check: Option<&dyn EventCheck>,
        timeout: Option<Duration>,
    ) -> WaitResult<EventData> {
        let args = self.wait_for_args(name, check, timeout).await?;
        Ok(EventData::from_args(args))
    }

    /// Same as [`wait_for`](Self::wait_for) without shaping the arguments
    pub async fn wait_for_args(
        &self,
        name: &str,
        check: Option<&dyn EventCheck>,
        timeout: Option<Duration>,
    ) -> WaitResult<Payload> {
        let timeout = timeout.or_else(|| self.config.default_timeout());
        // A timeout too large to represent as an instant waits without a deadline
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        debug!(event = %name, ?timeout, has_check = check.is_some(), "WaitCoordinator::wait_for: called");

        let timed_out = || {
            warn!(event = %name, ?timeout, "WaitCoordinator::wait_for: timed out");
            WaitError::Timeout {
                event: name.to_string(),
                timeout: timeout.unwrap_or_default(),
            }
        };

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let mut slot = self.registry.register(name);

            let received = match deadline {
                Some(deadline) => {
                    let outcome = tokio::time::timeout_at(deadline, slot.recv()).await;
                    match outcome {
                        Ok(received) => received,
                        Err(_) => {
                            slot.cancel();
                            return Err(timed_out());
                        }
                    }
                }
                None => slot.recv().await,
            };
            let args = received?;

            let Some(check) = check else {
                debug!(event = %name, attempt, "WaitCoordinator::wait_for: resolved");
                return Ok(args);
            };

            let verdict = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, check.check(&args)).await {
                    Ok(verdict) => verdict,
                    Err(_) => return Err(timed_out()),
                },
                None => check.check(&args).await,
            };

            match verdict {
                Ok(true) => {
                    debug!(event = %name, attempt, "WaitCoordinator::wait_for: check accepted");
                    return Ok(args);
                }
                Ok(false) => {
                    debug!(event = %name, attempt, "WaitCoordinator::wait_for: check rejected, re-arming");
                }
                Err(source) => {
                    debug!(event = %name, attempt, error = %source, "WaitCoordinator::wait_for: check failed");
                    return Err(WaitError::Predicate {
                        event: name.to_string(),
                        source: source.into(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{check_async, check_fn};
    use serde_json::{Value, json};

    fn coordinator() -> WaitCoordinator {
        WaitCoordinator::new(WaitRegistry::new(), WaitConfig::default())
    }

    async fn wait_until_pending(registry: &WaitRegistry, name: &str) {
        while registry.pending_count(name) == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_wait_for_resolves() {
        let coord = coordinator();
        let registry = coord.registry().clone();

        let waiter = tokio::spawn({
            let coord = coord.clone();
            async move { coord.wait_for("on_ready", None, Some(Duration::from_secs(5))).await }
        });

        wait_until_pending(&registry, "on_ready").await;
        registry.resolve_all("on_ready", vec![json!("session")]);

        let data = waiter.await.unwrap().unwrap();
        assert_eq!(data, EventData::Single(json!("session")));
        assert_eq!(registry.metrics().pending_slots, 0);
    }

    #[tokio::test]
    async fn test_timeout_cleans_up() {
        let coord = coordinator();
        let started = std::time::Instant::now();

        let err = coord
            .wait_for("x", None, Some(Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(coord.registry().pending_count("x"), 0);
    }

    #[tokio::test]
    async fn test_zero_timeout_fails_immediately() {
        let coord = coordinator();
        let err = coord.wait_for("x", None, Some(Duration::ZERO)).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(coord.registry().metrics().pending_slots, 0);
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_waits_unbounded() {
        let coord = coordinator();
        let registry = coord.registry().clone();

        let waiter = tokio::spawn({
            let coord = coord.clone();
            async move { coord.wait_for("x", None, Some(Duration::MAX)).await }
        });

        wait_until_pending(&registry, "x").await;
        registry.resolve_all("x", vec![json!(1)]);

        assert_eq!(waiter.await.unwrap().unwrap(), EventData::Single(json!(1)));
    }

    #[tokio::test]
    async fn test_config_default_timeout_applies() {
        let config = WaitConfig {
            default_timeout_ms: Some(30),
            ..Default::default()
        };
        let coord = WaitCoordinator::new(WaitRegistry::new(), config);

        let err = coord.wait_for("x", None, None).await.unwrap_err();
        match err {
            WaitError::Timeout { event, timeout } => {
                assert_eq!(event, "x");
                assert_eq!(timeout, Duration::from_millis(30));
            }
            other => panic!("Expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_event_rearms() {
        let coord = coordinator();
        let registry = coord.registry().clone();

        let waiter = tokio::spawn({
            let coord = coord.clone();
            async move {
                let check = check_fn(|args: &[Value]| Ok(args.first() == Some(&json!(3))));
                coord.wait_for("count", Some(&check), Some(Duration::from_secs(5))).await
            }
        });

        for n in 1..=3 {
            wait_until_pending(&registry, "count").await;
            registry.resolve_all("count", vec![json!(n)]);
        }

        assert_eq!(waiter.await.unwrap().unwrap(), EventData::Single(json!(3)));
        assert_eq!(registry.metrics().registered_total, 3);
        assert_eq!(registry.metrics().pending_slots, 0);
    }

    #[tokio::test]
    async fn test_check_error_propagates() {
        let coord = coordinator();
        let registry = coord.registry().clone();

        let waiter = tokio::spawn({
            let coord = coord.clone();
            async move {
                let check = check_async(|_: Payload| async { Err::<bool, _>(eyre::eyre!("lookup failed")) });
                coord.wait_for("on_ready", Some(&check), None).await
            }
        });

        wait_until_pending(&registry, "on_ready").await;
        registry.resolve_all("on_ready", vec![]);

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, WaitError::Predicate { .. }));
        assert!(err.to_string().contains("lookup failed"));
        assert_eq!(registry.metrics().pending_slots, 0);
    }

    #[tokio::test]
    async fn test_abandoned_wait_releases_slot() {
        let coord = coordinator();
        let registry = coord.registry().clone();

        let waiter = tokio::spawn({
            let coord = coord.clone();
            async move { coord.wait_for("on_ready", None, None).await }
        });

        wait_until_pending(&registry, "on_ready").await;
        waiter.abort();
        let _ = waiter.await;

        assert_eq!(registry.pending_count("on_ready"), 0);
    }

    #[tokio::test]
    async fn test_cleared_registry_ends_wait() {
        let coord = coordinator();
        let registry = coord.registry().clone();

        let waiter = tokio::spawn({
            let coord = coord.clone();
            async move { coord.wait_for("on_ready", None, None).await }
        });

        wait_until_pending(&registry, "on_ready").await;
        registry.clear();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, WaitError::Closed { .. }));
    }
}
