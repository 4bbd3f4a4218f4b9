use chrono::{DateTime, Utc};

use crate::api::ApiError;

/// Published state of one cached resource.
///
/// Last result wins: a successful fetch replaces `data` and clears `error`;
/// a failed fetch sets `error` and leaves any earlier `data` in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
    /// When `data` was last replaced by a successful fetch
    pub updated_at: Option<DateTime<Utc>>,
    in_flight: usize,
}

impl<T> Default for CacheSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            in_flight: 0,
        }
    }
}

impl<T> CacheSnapshot<T> {
    /// A fetch is in flight and there is nothing to show yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0 && self.data.is_none()
    }

    /// A fetch is in flight, whether or not data is cached.
    pub fn is_validating(&self) -> bool {
        self.in_flight > 0
    }

    /// No fetch in flight.
    pub fn is_settled(&self) -> bool {
        self.in_flight == 0
    }

    pub(crate) fn begin_fetch(&mut self) {
        self.in_flight += 1;
    }

    /// Forget a fetch that will never settle.
    pub(crate) fn abandon_fetch(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub(crate) fn settle(&mut self, result: Result<T, ApiError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.updated_at = Some(Utc::now());
            }
            Err(error) => {
                self.error = Some(error);
            }
        }
    }

    fn age_minutes(&self) -> Option<i64> {
        self.updated_at.map(|at| (Utc::now() - at).num_minutes())
    }

    /// Human-readable age of the cached data ("just now", "5m ago", "2h ago"),
    /// or "never" when nothing has been fetched.
    pub fn age_display(&self) -> String {
        let minutes = match self.age_minutes() {
            Some(minutes) => minutes,
            None => return "never".to_string(),
        };

        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_first_fetch_is_loading() {
        let mut snapshot: CacheSnapshot<Vec<i32>> = CacheSnapshot::default();
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_settled());

        snapshot.begin_fetch();
        assert!(snapshot.is_loading());
        assert!(snapshot.is_validating());
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_none());

        snapshot.settle(Ok(vec![1, 2]));
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_settled());
        assert_eq!(snapshot.data, Some(vec![1, 2]));
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn test_revalidating_with_data_is_not_loading() {
        let mut snapshot = CacheSnapshot::default();
        snapshot.begin_fetch();
        snapshot.settle(Ok(vec![1]));

        snapshot.begin_fetch();
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_validating());
    }

    #[test]
    fn test_abandoned_fetch_is_not_loading() {
        let mut snapshot: CacheSnapshot<Vec<i32>> = CacheSnapshot::default();
        snapshot.begin_fetch();
        snapshot.begin_fetch();
        snapshot.abandon_fetch();
        assert!(snapshot.is_loading());

        snapshot.settle(Err(ApiError::new("http_500", "boom")));
        assert!(!snapshot.is_loading());
        assert!(snapshot.is_settled());
        assert!(snapshot.error.is_some());
    }

    #[test]
    fn test_failure_keeps_stale_data() {
        let mut snapshot = CacheSnapshot::default();
        snapshot.begin_fetch();
        snapshot.settle(Ok(vec![1]));

        snapshot.begin_fetch();
        snapshot.settle(Err(ApiError::new("http_500", "boom")));
        assert_eq!(snapshot.data, Some(vec![1]));
        assert_eq!(snapshot.error.as_ref().map(|e| e.message.as_str()), Some("boom"));

        // Next success clears the error
        snapshot.begin_fetch();
        snapshot.settle(Ok(vec![2]));
        assert_eq!(snapshot.data, Some(vec![2]));
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn test_age_display() {
        let mut snapshot: CacheSnapshot<()> = CacheSnapshot::default();
        assert_eq!(snapshot.age_display(), "never");

        snapshot.updated_at = Some(Utc::now());
        assert_eq!(snapshot.age_display(), "just now");

        snapshot.updated_at = Some(Utc::now() - Duration::minutes(5));
        assert_eq!(snapshot.age_display(), "5m ago");

        snapshot.updated_at = Some(Utc::now() - Duration::minutes(95));
        assert_eq!(snapshot.age_display(), "2h ago");

        snapshot.updated_at = Some(Utc::now() - Duration::hours(26));
        assert_eq!(snapshot.age_display(), "1d ago");
    }
}
