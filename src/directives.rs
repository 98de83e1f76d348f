//! Control-directive parsing.
//!
//! # Responsibilities
//! - Resolve the artificial delay: `delay` header → `random-delay` range → 0
//! - Resolve the payload length: `data-length` → `random-data-length` → pool size
//! - Collect `response-*` headers to echo back with the prefix stripped
//!
//! # Design Decisions
//! - Pure function of the header map; the only side effect is a warning log
//!   on malformed input
//! - Malformed values never produce an HTTP error: they cascade to the next
//!   fallback exactly as if the header were absent
//! - Length resolution is separate from [`ControlDirectives::from_headers`]:
//!   only the payload endpoint pays for (and warns about) length headers

use axum::http::{HeaderMap, HeaderName, HeaderValue};

pub const DELAY_HEADER: &str = "delay";
pub const RANDOM_DELAY_HEADER: &str = "random-delay";
pub const DATA_LENGTH_HEADER: &str = "data-length";
pub const RANDOM_DATA_LENGTH_HEADER: &str = "random-data-length";
pub const RESPONSE_HEADER_PREFIX: &str = "response-";

/// Directives shared by every delay-aware endpoint. Immutable once built.
#[derive(Debug, Clone)]
pub struct ControlDirectives {
    /// Resolved artificial delay in milliseconds.
    pub delay_millis: u64,

    /// Request headers carrying the `response-` prefix, prefix stripped,
    /// ready to be inserted into the response.
    pub response_headers: Vec<(HeaderName, HeaderValue)>,
}

impl ControlDirectives {
    /// Parse the delay and pass-through directives from a request's headers.
    ///
    /// Length headers are left alone here; the payload endpoint resolves
    /// them with [`resolve_data_length`].
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            delay_millis: resolve(headers, DELAY_HEADER, RANDOM_DELAY_HEADER).unwrap_or(0),
            response_headers: pass_through_headers(headers),
        }
    }
}

/// Resolve the payload length for the data endpoint.
///
/// `default` is used when no length directive is present; callers pass the
/// content pool's length.
pub fn resolve_data_length(headers: &HeaderMap, default: usize) -> usize {
    resolve(headers, DATA_LENGTH_HEADER, RANDOM_DATA_LENGTH_HEADER)
        .map(|v| v as usize)
        .unwrap_or(default)
}

/// Fallback chain: exact numeric header, then sampled range header, then none.
fn resolve(headers: &HeaderMap, exact: &str, range: &str) -> Option<u64> {
    exact_value(headers, exact).or_else(|| sampled_value(headers, range))
}

fn exact_value(headers: &HeaderMap, name: &str) -> Option<u64> {
    let raw = header_str(headers, name)?;
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(header = name, value = raw, "Received invalid header");
            None
        }
    }
}

fn sampled_value(headers: &HeaderMap, name: &str) -> Option<u64> {
    let raw = header_str(headers, name)?;
    match parse_range(raw) {
        Some((min, max)) => Some(fastrand::u64(min..=max)),
        None => {
            tracing::warn!(header = name, value = raw, "Received invalid header");
            None
        }
    }
}

/// `<max>` means `[0, max]`; `<min>,<max>` is inclusive on both ends.
/// Whitespace around the components is ignored. Anything else, including an
/// inverted range, is malformed.
fn parse_range(raw: &str) -> Option<(u64, u64)> {
    let pieces: Vec<&str> = raw.split(',').collect();
    let (min, max) = match pieces.as_slice() {
        [max] => (0, max.trim().parse().ok()?),
        [min, max] => (min.trim().parse().ok()?, max.trim().parse().ok()?),
        _ => return None,
    };
    (min <= max).then_some((min, max))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

/// `response-<x>: v` on the request becomes `<x>: v` on the response.
/// Header names arrive lowercased, so the prefix match is case-insensitive.
fn pass_through_headers(headers: &HeaderMap) -> Vec<(HeaderName, HeaderValue)> {
    let mut out = Vec::new();
    for (name, value) in headers {
        let Some(stripped) = name.as_str().strip_prefix(RESPONSE_HEADER_PREFIX) else {
            continue;
        };
        match HeaderName::from_bytes(stripped.as_bytes()) {
            Ok(name) => out.push((name, value.clone())),
            Err(_) => {
                tracing::warn!(header = %name, "Received invalid pass-through header");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn exact_delay_wins_over_range() {
        let map = headers(&[("delay", "250"), ("random-delay", "1,2")]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.delay_millis, 250);
    }

    #[test]
    fn delay_defaults_to_zero() {
        let map = headers(&[]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.delay_millis, 0);
    }

    #[test]
    fn single_range_value_samples_from_zero() {
        let map = headers(&[("random-delay", "10")]);
        for _ in 0..100 {
            let directives = ControlDirectives::from_headers(&map);
            assert!(directives.delay_millis <= 10);
        }
    }

    #[test]
    fn two_range_values_are_inclusive() {
        let map = headers(&[("random-delay", "5,8")]);
        for _ in 0..100 {
            let directives = ControlDirectives::from_headers(&map);
            assert!((5..=8).contains(&directives.delay_millis));
        }
    }

    #[test]
    fn degenerate_range_is_deterministic() {
        let map = headers(&[("random-delay", "7,7")]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.delay_millis, 7);
    }

    #[test]
    fn range_whitespace_is_trimmed() {
        let map = headers(&[("random-delay", " 3 , 3 ")]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.delay_millis, 3);
    }

    #[test]
    fn malformed_exact_falls_back_to_range() {
        let map = headers(&[("delay", "soon"), ("random-delay", "9,9")]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.delay_millis, 9);
    }

    #[test]
    fn malformed_values_fall_back_to_default() {
        for value in ["abc", "-5", "1,2,3", "", "3,1"] {
            let map = headers(&[("delay", value), ("random-delay", value)]);
            let directives = ControlDirectives::from_headers(&map);
            assert_eq!(directives.delay_millis, 0, "value {value:?}");
        }
    }

    #[test]
    fn data_length_defaults_to_pool_length() {
        let map = headers(&[]);
        assert_eq!(resolve_data_length(&map, 1024), 1024);
    }

    #[test]
    fn exact_data_length_wins_over_range() {
        let map = headers(&[("data-length", "64"), ("random-data-length", "1,2")]);
        assert_eq!(resolve_data_length(&map, 1024), 64);
    }

    #[test]
    fn random_data_length_stays_in_bounds() {
        let map = headers(&[("random-data-length", "16,32")]);
        for _ in 0..100 {
            assert!((16..=32).contains(&resolve_data_length(&map, 1024)));
        }
    }

    #[test]
    fn malformed_data_length_falls_back_to_default() {
        let map = headers(&[("data-length", "lots"), ("random-data-length", "1,2,3")]);
        assert_eq!(resolve_data_length(&map, 1024), 1024);
    }

    #[test]
    fn length_headers_do_not_affect_shared_directives() {
        let map = headers(&[("data-length", "lots"), ("delay", "4")]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.delay_millis, 4);
        assert!(directives.response_headers.is_empty());
    }

    #[test]
    fn pass_through_headers_are_stripped() {
        let map = headers(&[("Response-X-Test", "bar"), ("delay", "1")]);
        let directives = ControlDirectives::from_headers(&map);
        assert_eq!(directives.response_headers.len(), 1);
        let (name, value) = &directives.response_headers[0];
        assert_eq!(name.as_str(), "x-test");
        assert_eq!(value.to_str().unwrap(), "bar");
    }

    #[test]
    fn bare_prefix_is_ignored() {
        let mut map = HeaderMap::new();
        map.append(
            HeaderName::from_static("response-"),
            HeaderValue::from_static("x"),
        );
        let directives = ControlDirectives::from_headers(&map);
        assert!(directives.response_headers.is_empty());
    }

    #[test]
    fn directive_headers_do_not_pass_through() {
        let map = headers(&[("delay", "1"), ("data-length", "2")]);
        let directives = ControlDirectives::from_headers(&map);
        assert!(directives.response_headers.is_empty());
    }
}
