//! HTTP date header value management service.
//!
//! Formatting a date on every response is wasteful, so the formatted value is cached
//! and only rebuilt once it is older than the refresh interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use bytes::Bytes;
use http::HeaderValue;
use once_cell::sync::Lazy;
use tracing::warn;

const REFRESH_INTERVAL: Duration = Duration::from_millis(800);

static DATE_SERVICE: Lazy<DateService> = Lazy::new(|| DateService::new_with_refresh_interval(REFRESH_INTERVAL));

/// A formatted date and the instant it was formatted at.
#[derive(Debug)]
struct CachedDate {
    at: Instant,
    value: Bytes,
}

impl CachedDate {
    fn now() -> Self {
        let mut buf = faf_http_date::get_date_buff_no_key();
        faf_http_date::get_date_no_key(&mut buf);
        Self { at: Instant::now(), value: Bytes::from_owner(buf) }
    }
}

/// Keeps the current HTTP date string, refreshed lazily on access.
#[derive(Debug)]
pub struct DateService {
    current: ArcSwap<CachedDate>,
    refresh_interval: Duration,
}

impl DateService {
    /// Returns the process wide instance.
    pub fn get_global_instance() -> &'static DateService {
        &DATE_SERVICE
    }

    fn new_with_refresh_interval(refresh_interval: Duration) -> Self {
        Self { current: ArcSwap::from_pointee(CachedDate::now()), refresh_interval }
    }

    /// Provides the current HTTP date as a header value.
    pub(crate) fn with_http_date<F>(&self, mut f: F)
    where
        F: FnMut(HeaderValue),
    {
        let mut current = self.current.load_full();
        if current.at.elapsed() >= self.refresh_interval {
            // racing refreshes store equivalent values
            current = Arc::new(CachedDate::now());
            self.current.store(Arc::clone(&current));
        }

        match HeaderValue::from_maybe_shared(current.value.clone()) {
            Ok(value) => f(value),
            Err(e) => warn!(cause = %e, "formatted date is not a valid header value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_an_imf_fixdate() {
        let mut date = None;
        DateService::get_global_instance().with_http_date(|value| date = Some(value));

        let date = date.unwrap();
        let date = date.to_str().unwrap();
        // e.g. "Sun, 06 Nov 1994 08:49:37 GMT"
        assert_eq!(date.len(), 29);
        assert!(date.ends_with(" GMT"));
    }

    #[test]
    fn refreshes_stale_value() {
        let service = DateService::new_with_refresh_interval(Duration::ZERO);
        let before = service.current.load_full();

        service.with_http_date(|_| {});
        assert!(!Arc::ptr_eq(&before, &service.current.load_full()));
    }
}
