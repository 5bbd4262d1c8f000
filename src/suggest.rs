//! Autocompletion of the search box.

use std::{net::IpAddr, time::Duration};

use anyhow::{Result, anyhow};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

use crate::{
    args::FinitePositiveF64, error::StoreError, model::Suggestion, sanitize::sanitize_search_query,
    store::Backend,
};

/// Database function returning the suggestions for a prefix.
pub const FUNCTION: &str = "search_suggestions";
/// Shorter queries get no suggestion.
pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 8;

/// Per client rate limiter of the suggestion endpoint.
///
/// Clients are keyed by the IP address of the socket peer. Behind a reverse proxy, every
/// client therefore shares the quota of the proxy.
pub type SuggestLimiter = DefaultKeyedRateLimiter<IpAddr>;

/// A limiter letting each client through once per `period` seconds.
///
/// Fails when `period` does not fit a non-zero [`Duration`].
pub fn limiter(period: FinitePositiveF64) -> Result<SuggestLimiter> {
    Duration::try_from_secs_f64(period.into())
        .ok()
        .and_then(Quota::with_period)
        .map(RateLimiter::keyed)
        .ok_or_else(|| anyhow!("{period}s is not a usable rate-limiting period"))
}

/// Forget the clients whose quota is fully replenished.
pub fn prune(limiter: &SuggestLimiter) {
    limiter.retain_recent();
    limiter.shrink_to_fit();
}

/// Suggestions for the raw text typed in the search box.
///
/// The text goes through the same sanitizer as searches. Failures yield no suggestion.
pub async fn suggestions<B: Backend>(backend: &B, raw: &str) -> Vec<Suggestion> {
    let query = sanitize_search_query(raw);
    if query.chars().count() < MIN_QUERY_CHARS {
        return vec![];
    }
    let args = json!({ "query": query, "max_results": MAX_SUGGESTIONS });
    match backend.rpc::<Suggestion>(FUNCTION, &args).await {
        Ok(mut suggestions) => {
            suggestions.truncate(MAX_SUGGESTIONS);
            suggestions
        }
        Err(StoreError::NotConfigured) => vec![],
        Err(err) => {
            log::error!("Error fetching suggestions for {query:?}: {err}");
            vec![]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{listing::test::FakeBackend, model::SuggestionKind, store::Store};
    use serde_json::Value;
    use test_case::test_case;

    fn backend(count: usize) -> FakeBackend {
        FakeBackend {
            suggestions: (0..count)
                .map(|i| json!({"kind": "repo", "label": format!("tokio-rs/tokio{i}"), "value": "tokio"}))
                .collect(),
            ..FakeBackend::default()
        }
    }

    #[test_case("" ; "empty")]
    #[test_case("a" ; "one char")]
    #[test_case(" ,a. " ; "one char after sanitizing")]
    #[tokio::test]
    async fn short_queries_are_not_sent(raw: &str) {
        let backend = backend(3);
        assert!(suggestions(&backend, raw).await.is_empty());
        assert!(backend.rpc_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_is_sanitized() {
        let backend = backend(1);
        let found = suggestions(&backend, " tokio-rs/tok ").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, SuggestionKind::Repo);
        let calls = backend.rpc_calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                FUNCTION.to_string(),
                json!({"query": "tokio-rstok", "max_results": 8})
            )]
        );
    }

    #[tokio::test]
    async fn at_most_eight() {
        assert_eq!(suggestions(&backend(20), "tokio").await.len(), MAX_SUGGESTIONS);
    }

    #[tokio::test]
    async fn unconfigured_store_suggests_nothing() {
        let store = Store::new(None, None).unwrap();
        assert!(suggestions(&store, "tokio").await.is_empty());
    }

    #[test]
    fn limiter_is_per_client() {
        let limiter = limiter(FinitePositiveF64::new_unchecked(60.0)).unwrap();
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        assert!(limiter.check_key(&a).is_ok());
        assert!(limiter.check_key(&a).is_err());
        assert!(limiter.check_key(&b).is_ok());
    }

    #[test_case(1e-12 ; "rounds to zero")]
    #[test_case(1e300 ; "overflows")]
    fn unusable_period(period: f64) {
        assert!(limiter(FinitePositiveF64::new(period).unwrap()).is_err());
    }

    #[test]
    fn prune_forgets_idle_clients() {
        let limiter = limiter(FinitePositiveF64::new_unchecked(0.01)).unwrap();
        for i in 0..100u8 {
            let ip = IpAddr::from([10, 0, 0, i]);
            assert!(limiter.check_key(&ip).is_ok());
        }
        assert_eq!(limiter.len(), 100);
        std::thread::sleep(Duration::from_millis(50));
        prune(&limiter);
        assert_eq!(limiter.len(), 0);
    }

    #[test]
    fn prune_keeps_throttled_clients() {
        let limiter = limiter(FinitePositiveF64::new_unchecked(60.0)).unwrap();
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        assert!(limiter.check_key(&ip).is_ok());
        prune(&limiter);
        assert_eq!(limiter.len(), 1);
        assert!(limiter.check_key(&ip).is_err());
    }

    #[test]
    fn suggestion_wire_format() {
        let value = serde_json::to_value(Suggestion {
            kind: SuggestionKind::Language,
            label: "Rust".into(),
            value: "Rust".into(),
        })
        .unwrap();
        assert_eq!(value["kind"], Value::from("language"));
    }
}
