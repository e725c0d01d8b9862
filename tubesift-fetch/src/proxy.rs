//! Proxy rotation.
//!
//! Outbound requests cycle through a configured pool of egress proxies so
//! no single address hammers the upstream. Rotation is best-effort
//! politeness, not a correctness requirement: an empty pool yields the
//! [`ProxyEndpoint::Direct`] sentinel instead of an error.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Proxy Endpoint
// ============================================================================

/// One egress identity for an outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProxyEndpoint {
    /// No proxy; connect directly.
    Direct,
    /// A proxy URL, e.g. `socks5://127.0.0.1:9050` or `http://host:3128`.
    Proxy(String),
}

impl ProxyEndpoint {
    /// Returns the proxy URL, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Direct => None,
            Self::Proxy(url) => Some(url),
        }
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Proxy(url) => write!(f, "{url}"),
        }
    }
}

// ============================================================================
// Proxy Rotator
// ============================================================================

/// Round-robin proxy selector shared by every adapter in a run.
///
/// The cursor is a single atomic counter: it lives for one run, starts at
/// zero, advances once per outbound call regardless of which provider makes
/// it, and wraps around the pool. N calls over a pool of size K hand out
/// each endpoint either `N/K` or `N/K + 1` times.
#[derive(Debug, Default)]
pub struct ProxyRotator {
    endpoints: Vec<String>,
    cursor: AtomicUsize,
}

impl ProxyRotator {
    /// Creates a rotator over the given pool. An empty pool is valid and
    /// means every call goes direct.
    pub fn new(endpoints: Vec<String>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// A rotator that always returns [`ProxyEndpoint::Direct`].
    pub fn direct() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the next endpoint in the cycle.
    pub fn next(&self) -> ProxyEndpoint {
        if self.endpoints.is_empty() {
            return ProxyEndpoint::Direct;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        ProxyEndpoint::Proxy(self.endpoints[idx].clone())
    }

    /// The configured pool, in order.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Pool size.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no proxies are configured.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_pool_goes_direct() {
        let rotator = ProxyRotator::direct();
        assert_eq!(rotator.next(), ProxyEndpoint::Direct);
        assert_eq!(rotator.next(), ProxyEndpoint::Direct);
    }

    #[test]
    fn test_round_robin_with_wraparound() {
        let rotator = ProxyRotator::new(vec!["p1".into(), "p2".into(), "p3".into()]);
        let picks: Vec<_> = (0..4).map(|_| rotator.next()).collect();
        assert_eq!(
            picks,
            vec![
                ProxyEndpoint::Proxy("p1".into()),
                ProxyEndpoint::Proxy("p2".into()),
                ProxyEndpoint::Proxy("p3".into()),
                ProxyEndpoint::Proxy("p1".into()),
            ]
        );
    }

    #[test]
    fn test_fair_cycling() {
        // N calls over a pool of K must hand out each endpoint either
        // floor(N/K) or ceil(N/K) times.
        let pool: Vec<String> = (0..3).map(|i| format!("proxy{i}")).collect();
        let rotator = ProxyRotator::new(pool);

        let n = 10;
        let mut counts: HashMap<ProxyEndpoint, usize> = HashMap::new();
        for _ in 0..n {
            *counts.entry(rotator.next()).or_default() += 1;
        }

        let k = rotator.len();
        for (_, count) in counts {
            assert!(count == n / k || count == n / k + 1);
        }
    }

    #[test]
    fn test_cursor_shared_across_threads() {
        use std::sync::Arc;

        let rotator = Arc::new(ProxyRotator::new(vec!["a".into(), "b".into()]));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let r = Arc::clone(&rotator);
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    r.next();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // 100 calls consumed; the next two picks continue the cycle evenly.
        let a = rotator.next();
        let b = rotator.next();
        assert_ne!(a, b);
    }
}
