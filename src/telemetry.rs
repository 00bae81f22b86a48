//! Tracing setup and per-invocation context.
//!
//! Logs are written to stderr so that rendered records on stdout stay clean.
//! `RUST_LOG` takes precedence over the `--verbose` default.

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Identifier attached to every log line of one process invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvocationId(pub Uuid);

impl InvocationId {
    /// Creates a new random invocation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Initialize the global subscriber
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

/// Span wrapping one invocation of a task
pub fn invocation_span(id: InvocationId, task: &str) -> tracing::Span {
    tracing::info_span!("invocation", invocation_id = %id, task = %task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_ids_are_unique() {
        let a = InvocationId::new();
        let b = InvocationId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.0.to_string());
    }
}
