use std::time::Duration;

#[derive(Clone)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            jitter_max: Some(Duration::from_millis(50)),
        }
    }
}

/// Retries an async operation with doubling backoff and optional jitter.
/// Returns the last error once attempts are exhausted.
pub async fn retry_async<F, Fut, T, E>(config: RetryConfig, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempts_left = config.max_attempts.max(1);
    let mut backoff = config.base_backoff;

    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(e);
                }

                let jitter = config
                    .jitter_max
                    .map(|max| {
                        let max_ms = max.as_millis() as u64;
                        if max_ms == 0 {
                            Duration::ZERO
                        } else {
                            Duration::from_millis(rand::random::<u64>() % (max_ms + 1))
                        }
                    })
                    .unwrap_or(Duration::ZERO);

                tokio::time::sleep(backoff + jitter).await;
                backoff = (backoff * 2).min(config.max_backoff);
            }
        }
    }
}
