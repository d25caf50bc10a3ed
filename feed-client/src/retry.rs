use finder_core::{CoreError, ErrorExt, FeedApiError, RetrySettings};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Backoff and circuit breaker tuning for one service.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry, in ms.
    pub base_delay_ms: u64,
    /// Upper bound for any single delay, in ms.
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Extra random delay as a fraction of the computed one.
    pub jitter_factor: f64,
    /// Consecutive failed operations before the circuit opens
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before a trial request
    pub recovery_timeout_s: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay_ms: settings.base_delay_ms,
            max_delay_ms: settings.max_delay_ms,
            backoff_multiplier: 2.0,
            jitter_factor: settings.jitter_factor,
            failure_threshold: settings.failure_threshold.max(1),
            recovery_timeout_s: settings.recovery_timeout_s,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Stops calling a service that keeps failing, so searches fall back to
/// local results without waiting on it.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: CircuitBreakerState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    failure_threshold: u32,
    recovery_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            state: CircuitBreakerState::Closed,
            failure_count: 0,
            last_failure_time: None,
            failure_threshold: config.failure_threshold,
            recovery_timeout: Duration::from_secs(config.recovery_timeout_s),
        }
    }

    pub fn allow_request(&mut self) -> bool {
        match self.state {
            CircuitBreakerState::Closed | CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => match self.last_failure_time {
                Some(last_failure) if last_failure.elapsed() >= self.recovery_timeout => {
                    debug!("Circuit breaker half-open, allowing a trial request");
                    self.state = CircuitBreakerState::HalfOpen;
                    true
                }
                _ => false,
            },
        }
    }

    pub fn record_success(&mut self) {
        if self.state == CircuitBreakerState::HalfOpen {
            info!("Circuit breaker trial request succeeded, closing");
            self.state = CircuitBreakerState::Closed;
            self.last_failure_time = None;
        }
        self.failure_count = 0;
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
        self.last_failure_time = Some(Instant::now());

        match self.state {
            CircuitBreakerState::Closed if self.failure_count >= self.failure_threshold => {
                warn!(
                    "Circuit breaker opening after {} consecutive failures",
                    self.failure_count
                );
                self.state = CircuitBreakerState::Open;
            }
            CircuitBreakerState::HalfOpen => {
                warn!("Circuit breaker trial request failed, reopening");
                self.state = CircuitBreakerState::Open;
            }
            _ => {}
        }
    }

    pub fn get_state(&self) -> CircuitBreakerState {
        self.state.clone()
    }
}

/// Backoff before retry `attempt` (0-based), with up to `jitter_factor`
/// of random extra delay, capped at `max_delay_ms`.
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let multiplier = config.backoff_multiplier.powi(attempt as i32);
    let delay_ms = ((config.base_delay_ms as f64 * multiplier) as u64).min(config.max_delay_ms);

    let jitter_range = (delay_ms as f64 * config.jitter_factor) as u64;
    let jitter = fastrand::u64(0..=jitter_range);

    Duration::from_millis((delay_ms + jitter).min(config.max_delay_ms))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetryMetrics {
    pub total_retries: u64,
    pub successful_retries: u64,
    pub failed_operations: u64,
    pub circuit_breaker_trips: u64,
}

/// Runs an operation with retries for transient failures, guarded by a
/// circuit breaker for one service.
#[derive(Debug)]
pub struct RetryExecutor {
    service: String,
    config: RetryConfig,
    circuit_breaker: Mutex<CircuitBreaker>,
    metrics: Mutex<RetryMetrics>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RetryExecutor {
    pub fn new(service: impl Into<String>, config: RetryConfig) -> Self {
        let circuit_breaker = Mutex::new(CircuitBreaker::new(&config));
        Self {
            service: service.into(),
            config,
            circuit_breaker,
            metrics: Mutex::new(RetryMetrics::default()),
        }
    }

    pub async fn execute<F, Fut, T>(&self, operation_name: &str, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        if !lock(&self.circuit_breaker).allow_request() {
            lock(&self.metrics).circuit_breaker_trips += 1;
            warn!(
                "Circuit breaker is open for {}, skipping {}",
                self.service, operation_name
            );
            return Err(FeedApiError::CircuitOpen {
                service: self.service.clone(),
            }
            .into());
        }

        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => {
                    lock(&self.circuit_breaker).record_success();
                    if attempt > 0 {
                        let mut metrics = lock(&self.metrics);
                        metrics.total_retries += u64::from(attempt);
                        metrics.successful_retries += 1;
                        info!("{} succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    let has_attempts_left = attempt + 1 < self.config.max_attempts;
                    if !error.is_retryable() || !has_attempts_left {
                        // Only transient failures count against the service's health.
                        if error.is_retryable() {
                            debug!("Max retry attempts reached for {}", operation_name);
                            lock(&self.circuit_breaker).record_failure();
                        } else {
                            lock(&self.circuit_breaker).record_success();
                        }
                        let mut metrics = lock(&self.metrics);
                        metrics.total_retries += u64::from(attempt);
                        metrics.failed_operations += 1;
                        error!(
                            "{} failed after {} attempt(s): {}",
                            operation_name,
                            attempt + 1,
                            error
                        );
                        return Err(error);
                    }

                    let delay = calculate_delay(attempt, &self.config);
                    info!("Retrying {} in {:?} due to: {}", operation_name, delay, error);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    pub fn get_metrics(&self) -> RetryMetrics {
        lock(&self.metrics).clone()
    }

    pub fn get_circuit_breaker_state(&self) -> CircuitBreakerState {
        lock(&self.circuit_breaker).get_state()
    }
}
