use std::{future::Future, time::Duration};

use crate::{EngineError, LedgerStore, ResultEngine};

mod aggregation;
mod reports;

/// Budget shared by every query of one request.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct Engine<S> {
    store: S,
    query_timeout: Duration,
}

impl<S> Engine<S> {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder<S> {
        EngineBuilder {
            store: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }
}

impl<S: LedgerStore> Engine<S> {
    /// Runs `fut` under the request timeout. Elapsed time is measured from
    /// the call, so wrap the whole fan-out, not each branch.
    async fn bounded<T>(
        &self,
        what: &'static str,
        fut: impl Future<Output = ResultEngine<T>>,
    ) -> ResultEngine<T> {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    report = what,
                    timeout_ms = self.query_timeout.as_millis() as u64,
                    "ledger queries timed out"
                );
                Err(EngineError::Timeout(self.query_timeout))
            }
        }
    }
}

/// Trims a raw query token; blank counts as absent.
fn token(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// The builder for `Engine`
pub struct EngineBuilder<S> {
    store: Option<S>,
    query_timeout: Duration,
}

impl<S> EngineBuilder<S> {
    /// Pass the required ledger store
    pub fn store(mut self, store: S) -> EngineBuilder<S> {
        self.store = Some(store);
        self
    }

    /// Override [`DEFAULT_QUERY_TIMEOUT`]
    pub fn query_timeout(mut self, timeout: Duration) -> EngineBuilder<S> {
        self.query_timeout = timeout;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine<S>> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Store("ledger store not configured".to_string()))?;
        if self.query_timeout.is_zero() {
            return Err(EngineError::InvalidRange(
                "query timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Engine {
            store,
            query_timeout: self.query_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;

    #[test]
    fn builder_requires_store() {
        let err = Engine::<MemoryLedger>::builder().build().unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }

    #[test]
    fn builder_defaults_timeout() {
        let engine = Engine::builder().store(MemoryLedger::new()).build().unwrap();
        assert_eq!(engine.query_timeout(), DEFAULT_QUERY_TIMEOUT);

        let engine = Engine::builder()
            .store(MemoryLedger::new())
            .query_timeout(Duration::from_millis(250))
            .build()
            .unwrap();
        assert_eq!(engine.query_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = Engine::builder()
            .store(MemoryLedger::new())
            .query_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn blank_tokens_are_absent() {
        assert_eq!(token(None), None);
        assert_eq!(token(Some("  ")), None);
        assert_eq!(token(Some(" 2024 ")), Some("2024"));
    }
}
