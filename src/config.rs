use std::fmt;
use std::sync::Arc;

use crate::provider::{Heap, Provider};

/// Largest number of constructor parameters the injector can infer
pub const MAX_CTOR_ARITY: usize = 10;

/// Injector settings
#[derive(Clone)]
pub struct Config {
    ctor_limit: usize,
    provider: Arc<dyn Provider>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ctor_limit: MAX_CTOR_ARITY,
            provider: Arc::new(Heap),
        }
    }
}

impl Config {
    /// Ignore constructors with more parameters than `limit` (at most [MAX_CTOR_ARITY])
    pub fn with_ctor_limit(mut self, limit: usize) -> Self {
        self.ctor_limit = limit.min(MAX_CTOR_ARITY);
        self
    }

    /// Provider used by [Injector::create](crate::Injector::create)
    pub fn with_provider(mut self, provider: impl Provider + 'static) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    pub fn ctor_limit(&self) -> usize {
        self.ctor_limit
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ctor_limit", &self.ctor_limit)
            .finish_non_exhaustive()
    }
}
