use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::models::{RankError, Result};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker configuration
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout_duration: Duration,
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            timeout_duration: Duration::from_secs(60),
            half_open_max_calls: 3,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    half_open_calls: u32,
    opened_at: Option<Instant>,
}

/// Stops calling a failing explorer until it has had time to recover.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerState>,
    config: CircuitBreakerConfig,
    name: String,
}

impl CircuitBreaker {
    pub fn new(name: String, config: CircuitBreakerConfig) -> Self {
        Self {
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                half_open_calls: 0,
                opened_at: None,
            }),
            config,
            name,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // State is plain counters, a poisoned lock is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Execute a function with circuit breaker protection
    pub async fn call<F, T, Fut>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.try_acquire()?;

        match f().await {
            Ok(result) => {
                self.record_success();
                Ok(result)
            }
            Err(e) => {
                self.record_failure();
                Err(e)
            }
        }
    }

    /// Admits a call or rejects it while the circuit is open.
    pub fn try_acquire(&self) -> Result<()> {
        let mut inner = self.lock();

        if inner.state == CircuitState::Open {
            let elapsed = inner
                .opened_at
                .map(|at| at.elapsed() >= self.config.timeout_duration)
                .unwrap_or(true);
            if !elapsed {
                return Err(RankError::CircuitBreakerOpen(format!(
                    "Circuit breaker {} is open",
                    self.name
                )));
            }
            info!("Circuit breaker {} transitioning to half-open", self.name);
            inner.state = CircuitState::HalfOpen;
            inner.half_open_calls = 0;
            inner.success_count = 0;
        }

        if inner.state == CircuitState::HalfOpen {
            if inner.half_open_calls >= self.config.half_open_max_calls {
                return Err(RankError::CircuitBreakerOpen(format!(
                    "Circuit breaker {} half-open limit reached",
                    self.name
                )));
            }
            inner.half_open_calls += 1;
        }

        Ok(())
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    info!("Circuit breaker {} closed", self.name);
                    Self::close(&mut inner);
                }
            }
            _ => inner.failure_count = 0,
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count += 1;

        let should_open = match inner.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => inner.failure_count >= self.config.failure_threshold,
            CircuitState::Open => false,
        };

        if should_open {
            warn!(
                "Circuit breaker {} opened after {} failures",
                self.name, inner.failure_count
            );
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            inner.success_count = 0;
            inner.half_open_calls = 0;
        }
    }

    fn close(inner: &mut BreakerState) {
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.half_open_calls = 0;
        inner.opened_at = None;
    }

    /// Get current circuit breaker state for monitoring
    pub fn get_state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn get_failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

/// Retry with exponential backoff
pub async fn retry_with_backoff<F, T, Fut, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!("Operation {} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => {
                error!(
                    "Operation {} failed after {} attempts: {}",
                    operation_name, max_attempts, e
                );
                return Err(e);
            }
            Err(e) => {
                warn!("Operation {} failed on attempt {}: {}", operation_name, attempt, e);
                sleep(calculate_delay(config, attempt)).await;
                attempt += 1;
            }
        }
    }
}

fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let delay_ms = config.base_delay.as_millis() as f64
        * config.backoff_multiplier.powi((attempt - 1) as i32);

    Duration::from_millis(delay_ms as u64).min(config.max_delay)
}

/// Retry plus circuit breaker around explorer calls.
#[derive(Debug)]
pub struct ResilientClient {
    circuit_breaker: CircuitBreaker,
    retry_config: RetryConfig,
    client_name: String,
}

impl ResilientClient {
    pub fn new(
        client_name: String,
        circuit_config: CircuitBreakerConfig,
        retry_config: RetryConfig,
    ) -> Self {
        let circuit_breaker = CircuitBreaker::new(format!("{}_circuit", client_name), circuit_config);

        Self {
            circuit_breaker,
            retry_config,
            client_name,
        }
    }

    /// Runs `operation` with retries; the whole retry sequence counts as one
    /// call for the circuit breaker.
    pub async fn call<F, T, Fut>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let name = format!("{}:{}", self.client_name, operation_name);
        self.circuit_breaker
            .call(|| retry_with_backoff(&self.retry_config, &name, operation))
            .await
    }

    pub fn get_circuit_state(&self) -> CircuitState {
        self.circuit_breaker.get_state()
    }

    pub fn get_failure_count(&self) -> u32 {
        self.circuit_breaker.get_failure_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn explorer_error() -> RankError {
        RankError::Explorer {
            action: "txlist".to_string(),
            message: "test error".to_string(),
        }
    }

    #[tokio::test]
    async fn test_circuit_breaker_closed_to_open() {
        let config = CircuitBreakerConfig {
            failure_threshold: 2,
            ..Default::default()
        };

        let cb = CircuitBreaker::new("test".to_string(), config);
        assert_eq!(cb.get_state(), CircuitState::Closed);

        let result: Result<()> = cb.call(|| async { Err(explorer_error()) }).await;
        assert!(result.is_err());
        assert_eq!(cb.get_state(), CircuitState::Closed);

        let result: Result<()> = cb.call(|| async { Err(explorer_error()) }).await;
        assert!(result.is_err());
        assert_eq!(cb.get_state(), CircuitState::Open);

        let result = cb.call(|| async { Ok(1) }).await;
        assert!(matches!(result, Err(RankError::CircuitBreakerOpen(_))));
    }

    #[tokio::test]
    async fn test_circuit_breaker_recovers_through_half_open() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 2,
            timeout_duration: Duration::from_millis(5),
            half_open_max_calls: 5,
        };
        let cb = CircuitBreaker::new("test".to_string(), config);

        let _: Result<()> = cb.call(|| async { Err(explorer_error()) }).await;
        assert_eq!(cb.get_state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cb.call(|| async { Ok(1) }).await.unwrap(), 1);
        assert_eq!(cb.get_state(), CircuitState::HalfOpen);

        assert_eq!(cb.call(|| async { Ok(2) }).await.unwrap(), 2);
        assert_eq!(cb.get_state(), CircuitState::Closed);
        assert_eq!(cb.get_failure_count(), 0);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let config = CircuitBreakerConfig {
            failure_threshold: 1,
            timeout_duration: Duration::from_millis(5),
            ..Default::default()
        };
        let cb = CircuitBreaker::new("test".to_string(), config);

        let _: Result<()> = cb.call(|| async { Err(explorer_error()) }).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let _: Result<()> = cb.call(|| async { Err(explorer_error()) }).await;
        assert_eq!(cb.get_state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_retry_with_backoff() {
        let config = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            ..Default::default()
        };

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(&config, "test_operation", || {
            let c = counter_clone.clone();
            async move {
                let count = c.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err("Simulated failure")
                } else {
                    Ok("Success")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("Success"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let config = RetryConfig {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            ..Default::default()
        };
        let counter = AtomicU32::new(0);

        let result: std::result::Result<(), &str> = retry_with_backoff(&config, "always_fails", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;

        assert_eq!(result, Err("nope"));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resilient_client_counts_one_failure_per_call() {
        let client = ResilientClient::new(
            "explorer".to_string(),
            CircuitBreakerConfig {
                failure_threshold: 2,
                ..Default::default()
            },
            RetryConfig {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                ..Default::default()
            },
        );

        let result: Result<()> = client.call("txlist", || async { Err(explorer_error()) }).await;
        assert!(result.is_err());
        assert_eq!(client.get_failure_count(), 1);
        assert_eq!(client.get_circuit_state(), CircuitState::Closed);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(300),
            backoff_multiplier: 2.0,
            max_attempts: 10,
        };
        assert_eq!(calculate_delay(&config, 1), Duration::from_millis(100));
        assert_eq!(calculate_delay(&config, 2), Duration::from_millis(200));
        assert_eq!(calculate_delay(&config, 5), Duration::from_millis(300));
    }
}
