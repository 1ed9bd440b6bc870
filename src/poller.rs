//! Waiting on long-running operations.
//!
//! After a mutating ARM call the resource keeps moving through provisioning
//! states on its own. [`StateChangeConf`] polls a refresh function until the
//! observed state reaches a target, the resource disappears (delete flows),
//! or the timeout runs out.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::provisioning::ProvisioningState;

const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(10);
const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// One observation returned by a refresh function.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub resource: T,
    pub state: ProvisioningState,
}

impl<T> Snapshot<T> {
    pub fn new(resource: T, state: ProvisioningState) -> Self {
        Self { resource, state }
    }
}

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("timeout while waiting for state to become '{}' (last state: '{}', timeout: {timeout:?})", join(.expected), .last_state.as_ref().map(|s| s.as_str()).unwrap_or(""))]
    Timeout {
        last_state: Option<ProvisioningState>,
        expected: Vec<ProvisioningState>,
        timeout: Duration,
    },

    #[error("unexpected state '{state}', wanted target '{}'", join(.expected))]
    UnexpectedState {
        state: ProvisioningState,
        expected: Vec<ProvisioningState>,
    },

    #[error("couldn't find resource ({retries} retries)")]
    NotFound { retries: u32 },

    #[error("refreshing state: {0}")]
    Refresh(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn join(states: &[ProvisioningState]) -> String {
    states
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration for a single wait.
#[derive(Debug, Clone)]
pub struct StateChangeConf {
    pub pending: Vec<ProvisioningState>,
    /// Empty means "wait until the resource is gone".
    pub target: Vec<ProvisioningState>,
    pub timeout: Duration,
    /// Sleep before the first refresh.
    pub delay: Duration,
    /// Floor for the backoff between refreshes.
    pub min_interval: Duration,
    /// Fixed interval, overriding the backoff entirely.
    pub poll_interval: Option<Duration>,
    /// Consecutive not-found refreshes tolerated while waiting for a target.
    pub not_found_checks: u32,
    /// Consecutive target observations required before succeeding.
    pub continuous_target_occurrence: u32,
    /// States that end the wait with an error even when `pending` is empty.
    pub failure_states: Vec<ProvisioningState>,
}

impl StateChangeConf {
    pub fn new(
        pending: Vec<ProvisioningState>,
        target: Vec<ProvisioningState>,
        timeout: Duration,
    ) -> Self {
        Self {
            pending,
            target,
            timeout,
            delay: Duration::ZERO,
            min_interval: Duration::ZERO,
            poll_interval: None,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: 1,
            failure_states: Vec::new(),
        }
    }

    /// Waits for the resource to disappear.
    pub fn until_gone(pending: Vec<ProvisioningState>, timeout: Duration) -> Self {
        Self::new(pending, Vec::new(), timeout)
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = Some(poll_interval);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    pub fn with_continuous_target_occurrence(mut self, occurrences: u32) -> Self {
        self.continuous_target_occurrence = occurrences.max(1);
        self
    }

    pub fn with_failure_states(mut self, states: Vec<ProvisioningState>) -> Self {
        self.failure_states = states;
        self
    }

    /// Polls `refresh` until a target state is observed.
    ///
    /// `refresh` returns `Ok(None)` when the resource does not exist. The
    /// result is `Ok(None)` only for delete flows (empty `target`).
    pub async fn wait_for_state<T, E, F, Fut>(&self, mut refresh: F) -> Result<Option<T>, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<Snapshot<T>>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut last_state = None;
        let outcome =
            tokio::time::timeout(self.timeout, self.poll(&mut refresh, &mut last_state)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(WaitError::Timeout {
                last_state,
                expected: self.target.clone(),
                timeout: self.timeout,
            }),
        }
    }

    async fn poll<T, E, F, Fut>(
        &self,
        refresh: &mut F,
        last_state: &mut Option<ProvisioningState>,
    ) -> Result<Option<T>, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<Snapshot<T>>, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let mut wait = INITIAL_BACKOFF;
        let mut not_found = 0u32;
        let mut target_occurrence = 0u32;
        let required = self.continuous_target_occurrence.max(1);

        loop {
            let snapshot = refresh()
                .await
                .map_err(|e| WaitError::Refresh(Box::new(e)))?;

            match snapshot {
                None => {
                    not_found += 1;
                    if self.target.is_empty() {
                        target_occurrence += 1;
                        if target_occurrence >= required {
                            tracing::debug!("resource is gone");
                            return Ok(None);
                        }
                    } else if not_found > self.not_found_checks {
                        return Err(WaitError::NotFound { retries: not_found });
                    } else {
                        tracing::debug!(not_found, "resource not found yet");
                    }
                }
                Some(Snapshot { resource, state }) => {
                    not_found = 0;
                    tracing::debug!(state = %state, "observed provisioning state");
                    *last_state = Some(state.clone());

                    if self.failure_states.contains(&state) {
                        return Err(WaitError::UnexpectedState {
                            state,
                            expected: self.target.clone(),
                        });
                    } else if self.target.contains(&state) {
                        target_occurrence += 1;
                        if target_occurrence >= required {
                            return Ok(Some(resource));
                        }
                    } else if self.pending.contains(&state) || self.pending.is_empty() {
                        target_occurrence = 0;
                    } else {
                        return Err(WaitError::UnexpectedState {
                            state,
                            expected: self.target.clone(),
                        });
                    }
                }
            }

            // Backoff grows only while nothing has been confirmed.
            if target_occurrence == 0 {
                wait = (wait * 2).min(MAX_BACKOFF);
            }
            let interval = self
                .poll_interval
                .unwrap_or_else(|| wait.max(self.min_interval));
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Error)]
    #[error("boom")]
    struct Boom;

    type Step = Result<Option<&'static str>, Boom>;

    /// Refresh function replaying `steps`, repeating the last one forever.
    fn scripted(
        steps: Vec<Step>,
        calls: Arc<AtomicUsize>,
    ) -> impl FnMut() -> std::future::Ready<Result<Option<Snapshot<usize>>, Boom>> {
        let mut steps: VecDeque<Step> = steps.into();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            let step = if steps.len() > 1 {
                steps.pop_front()
            } else {
                steps.front().cloned()
            };
            let out = match step {
                Some(Ok(Some(state))) => Ok(Some(Snapshot::new(n, state.parse().unwrap()))),
                Some(Ok(None)) | None => Ok(None),
                Some(Err(e)) => Err(e),
            };
            std::future::ready(out)
        }
    }

    fn creating_to_succeeded(timeout: Duration) -> StateChangeConf {
        StateChangeConf::new(
            vec![ProvisioningState::Creating],
            vec![ProvisioningState::Succeeded],
            timeout,
        )
        .with_min_interval(Duration::from_secs(15))
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_refresh_and_not_earlier() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![Ok(Some("Creating")), Ok(Some("Creating")), Ok(Some("Succeeded"))],
            calls.clone(),
        );

        let conf = creating_to_succeeded(Duration::from_secs(600));
        let result = conf.wait_for_state(refresh).await.unwrap();

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_is_min_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![Ok(Some("Creating")), Ok(Some("Creating")), Ok(Some("Succeeded"))],
            calls.clone(),
        );

        let start = tokio::time::Instant::now();
        creating_to_succeeded(Duration::from_secs(600))
            .wait_for_state(refresh)
            .await
            .unwrap();

        // Two sleeps between three refreshes.
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_while_pending() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(vec![Ok(Some("Creating"))], calls.clone());

        let err = creating_to_succeeded(Duration::from_secs(60))
            .wait_for_state(refresh)
            .await
            .unwrap_err();

        match err {
            WaitError::Timeout {
                last_state,
                expected,
                timeout,
            } => {
                assert_eq!(last_state, Some(ProvisioningState::Creating));
                assert_eq!(expected, vec![ProvisioningState::Succeeded]);
                assert_eq!(timeout, Duration::from_secs(60));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        // Refreshes at 0s, 15s, 30s, 45s; the 60s one races the deadline.
        assert!(calls.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_state_fails_fast() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(vec![Ok(Some("Creating")), Ok(Some("Failed"))], calls.clone());

        let err = creating_to_succeeded(Duration::from_secs(600))
            .wait_for_state(refresh)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WaitError::UnexpectedState {
                state: ProvisioningState::Failed,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "unexpected state 'Failed', wanted target 'Succeeded'"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_error_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(vec![Ok(Some("Creating")), Err(Boom)], calls.clone());

        let err = creating_to_succeeded(Duration::from_secs(600))
            .wait_for_state(refresh)
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::Refresh(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_flow_succeeds_when_gone() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![Ok(Some("Deleting")), Ok(Some("Deleting")), Ok(None)],
            calls.clone(),
        );

        let result = StateChangeConf::until_gone(
            vec![ProvisioningState::Deleting],
            Duration::from_secs(600),
        )
        .wait_for_state(refresh)
        .await
        .unwrap();

        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_while_waiting_for_target() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(vec![Ok(None)], calls.clone());

        let err = creating_to_succeeded(Duration::from_secs(3600))
            .with_not_found_checks(3)
            .wait_for_state(refresh)
            .await
            .unwrap_err();

        assert!(matches!(err, WaitError::NotFound { retries: 4 }));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_then_found_resets_counter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![Ok(None), Ok(None), Ok(Some("Creating")), Ok(None), Ok(None), Ok(Some("Succeeded"))],
            calls.clone(),
        );

        let result = creating_to_succeeded(Duration::from_secs(3600))
            .with_not_found_checks(2)
            .wait_for_state(refresh)
            .await
            .unwrap();

        assert_eq!(result, Some(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_target_occurrence() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![
                Ok(Some("Succeeded")),
                Ok(Some("Updating")),
                Ok(Some("Succeeded")),
                Ok(Some("Succeeded")),
                Ok(Some("Succeeded")),
            ],
            calls.clone(),
        );

        let result = StateChangeConf::new(
            vec![ProvisioningState::Updating],
            vec![ProvisioningState::Succeeded],
            Duration::from_secs(600),
        )
        .with_min_interval(Duration::from_secs(5))
        .with_continuous_target_occurrence(3)
        .wait_for_state(refresh)
        .await
        .unwrap();

        assert_eq!(result, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pending_tolerates_any_state() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![Ok(Some("Migrating")), Ok(Some("Whatever")), Ok(Some("Succeeded"))],
            calls.clone(),
        );

        let result = StateChangeConf::new(
            Vec::new(),
            vec![ProvisioningState::Succeeded],
            Duration::from_secs(600),
        )
        .wait_for_state(refresh)
        .await
        .unwrap();

        assert_eq!(result, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_state_ends_delete_flow() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(
            vec![Ok(Some("Succeeded")), Ok(Some("Deleting")), Ok(Some("Failed"))],
            calls.clone(),
        );

        let start = tokio::time::Instant::now();
        let err = StateChangeConf::until_gone(Vec::new(), Duration::from_secs(3600))
            .with_poll_interval(Duration::from_secs(1))
            .with_failure_states(vec![ProvisioningState::Failed, ProvisioningState::Canceled])
            .wait_for_state(refresh)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WaitError::UnexpectedState {
                state: ProvisioningState::Failed,
                ..
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_poll_interval_and_delay() {
        let calls = Arc::new(AtomicUsize::new(0));
        let refresh = scripted(vec![Ok(Some("Creating")), Ok(Some("Succeeded"))], calls.clone());

        let start = tokio::time::Instant::now();
        creating_to_succeeded(Duration::from_secs(600))
            .with_delay(Duration::from_secs(2))
            .with_poll_interval(Duration::from_secs(1))
            .wait_for_state(refresh)
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_up_to_cap() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut steps = vec![Ok(Some("Creating")); 10];
        steps.push(Ok(Some("Succeeded")));
        let refresh = scripted(steps, calls.clone());

        let start = tokio::time::Instant::now();
        StateChangeConf::new(
            vec![ProvisioningState::Creating],
            vec![ProvisioningState::Succeeded],
            Duration::from_secs(600),
        )
        .wait_for_state(refresh)
        .await
        .unwrap();

        // 0.2 + 0.4 + 0.8 + 1.6 + 3.2 + 6.4 + 4 * 10 seconds
        assert_eq!(start.elapsed(), Duration::from_millis(52_600));
    }

    #[test]
    fn test_timeout_error_display() {
        let err = WaitError::Timeout {
            last_state: Some(ProvisioningState::Creating),
            expected: vec![ProvisioningState::Succeeded, ProvisioningState::Consistent],
            timeout: Duration::from_secs(60),
        };
        assert_eq!(
            err.to_string(),
            "timeout while waiting for state to become 'Succeeded, Consistent' (last state: 'Creating', timeout: 60s)"
        );
    }
}
