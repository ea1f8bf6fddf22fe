//! Backend discovery and filtering.
//!
//! Backends are described by a flat key-value configuration surface:
//!
//! ```text
//! BACKEND_1_URL=http://one.internal/webhook
//! BACKEND_1_ACTIVE=true        # optional, defaults to true
//! BACKEND_2_URL=http://two.internal/webhook
//! ```
//!
//! Discovery walks the 1-indexed sequence and stops at the first missing
//! `_URL` key; gaps are not skipped. The snapshot is taken once per inbound
//! request and the resulting target list is immutable for the rest of that
//! request.

/// Upper bound on the discovery walk; a misconfigured source with a huge
/// contiguous run of keys cannot turn discovery into an unbounded scan.
pub const MAX_BACKENDS: usize = 100;

/// Source of backend configuration key-value pairs.
///
/// Injected into the service at construction time so tests can supply an
/// in-memory map instead of the process environment.
pub trait BackendSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Production source: reads the process environment.
pub struct ProcessEnv;

impl BackendSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A single configured delivery target, request-scoped and immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendTarget {
    /// 1-based position in the configuration sequence
    pub ordinal: usize,
    pub url: String,
    pub active: bool,
}

/// Discovers the contiguous run of configured backends.
///
/// `BACKEND_<n>_ACTIVE` set to any casing of "false" disables a target;
/// absent or any other value leaves it active. Discovery itself never fails.
pub fn discover(source: &dyn BackendSource) -> Vec<BackendTarget> {
    let mut targets = Vec::new();

    for ordinal in 1..=MAX_BACKENDS {
        let Some(url) = source.get(&format!("BACKEND_{ordinal}_URL")) else {
            break;
        };
        let active = source
            .get(&format!("BACKEND_{ordinal}_ACTIVE"))
            .is_none_or(|value| !value.eq_ignore_ascii_case("false"));

        targets.push(BackendTarget {
            ordinal,
            url,
            active,
        });
    }

    targets
}

/// Keeps the usable subsequence: active targets with a non-empty URL,
/// in discovery order.
pub fn active_targets(targets: &[BackendTarget]) -> Vec<BackendTarget> {
    targets
        .iter()
        .filter(|target| target.active && !target.url.is_empty())
        .cloned()
        .collect()
}
