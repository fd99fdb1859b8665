use std::cell::Cell;
use std::time::Duration;

use log::{error, warn};

use super::error::LoadError;
use super::loader::TableSource;
use super::model::ResultTable;

/// How an empty (zero-row) result is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyResultPolicy {
    /// Zero rows is a legitimate answer; return it at once.
    #[default]
    Accept,
    /// Zero rows means the acquisition went wrong; retry within the bound.
    Retry,
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    pub on_empty: EmptyResultPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            on_empty: EmptyResultPolicy::Accept,
        }
    }
}

/// Anything whose emptiness the retry policy can judge.
pub trait Populated {
    fn is_populated(&self) -> bool;
}

impl Populated for ResultTable {
    fn is_populated(&self) -> bool {
        !self.is_empty()
    }
}

impl Populated for [ResultTable] {
    fn is_populated(&self) -> bool {
        !self.is_empty() && self.iter().all(Populated::is_populated)
    }
}

impl Populated for Vec<ResultTable> {
    fn is_populated(&self) -> bool {
        self.as_slice().is_populated()
    }
}

impl RetryPolicy {
    pub fn with_empty_policy(mut self, on_empty: EmptyResultPolicy) -> Self {
        self.on_empty = on_empty;
        self
    }

    /// Backoff before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        Duration::from_secs_f64(secs)
    }

    /// Run `op` until it succeeds, fails permanently or the attempt bound is hit.
    ///
    /// `op` receives the 1-based attempt number.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, LoadError>
    where
        T: Populated,
        F: FnMut(u32) -> Result<T, LoadError>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = op(attempt).and_then(|value| {
                if self.on_empty == EmptyResultPolicy::Retry && !value.is_populated() {
                    Err(LoadError::EmptyResult {
                        what: what.to_string(),
                    })
                } else {
                    Ok(value)
                }
            });

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    error!("{what}: {err}");
                    return Err(err);
                }
                Err(err) => err,
            };

            if attempt >= max_attempts {
                error!("{what}: giving up after {attempt} attempts: {err}");
                return Err(LoadError::Exhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff_for(attempt);
            warn!("{what}: attempt {attempt}/{max_attempts} failed ({err}); retrying in {delay:?}");
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Retrying – a TableSource decorator
// ---------------------------------------------------------------------------

/// Wraps a [`TableSource`] with a [`RetryPolicy`].
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
    last_attempts: Cell<u32>,
}

impl<S: TableSource> Retrying<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            last_attempts: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Attempts made by the most recent call.
    pub fn last_attempts(&self) -> u32 {
        self.last_attempts.get()
    }
}

impl<S: TableSource> TableSource for Retrying<S> {
    fn load_named_tables(
        &self,
        archive_urls: &[String],
        table_names: &[String],
    ) -> Result<Vec<ResultTable>, LoadError> {
        let what = format!("loading tables {table_names:?}");
        self.policy.run(&what, |attempt| {
            self.last_attempts.set(attempt);
            self.inner.load_named_tables(archive_urls, table_names)
        })
    }

    fn load_via_query(&self, archive_url: &str, query: &str) -> Result<ResultTable, LoadError> {
        let what = format!("query against {archive_url}");
        self.policy.run(&what, |attempt| {
            self.last_attempts.set(attempt);
            self.inner.load_via_query(archive_url, query)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast(max_attempts: u32, on_empty: EmptyResultPolicy) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 2.0,
            on_empty,
        }
    }

    fn populated() -> ResultTable {
        ResultTable::new(
            vec!["n".into()],
            vec![vec![crate::data::model::CellValue::Integer(1)]],
        )
    }

    #[test]
    fn backoff_grows_and_caps() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_for(10), Duration::from_millis(350));
    }

    #[test]
    fn transient_failures_are_retried_until_success() {
        let mut calls = 0;
        let result = fast(5, EmptyResultPolicy::Accept).run("t", |_| {
            calls += 1;
            if calls < 3 {
                Err(LoadError::Network {
                    url: "u".into(),
                    reason: "reset".into(),
                })
            } else {
                Ok(populated())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let mut calls = 0;
        let err = fast(5, EmptyResultPolicy::Retry)
            .run("t", |_| -> Result<ResultTable, LoadError> {
                calls += 1;
                Err(LoadError::Query {
                    query: "SELECT".into(),
                    reason: "incomplete input".into(),
                })
            })
            .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, LoadError::Query { .. }));
    }

    #[test]
    fn empty_vec_of_tables_is_not_populated() {
        assert!(!Vec::<ResultTable>::new().is_populated());
        assert!(!vec![populated(), ResultTable::default()].is_populated());
        assert!(vec![populated()].is_populated());
    }
}
