use crate::models::job::Job;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw query-string form of the feed filters. Every field arrives as an
/// optional string; values that fail to parse drop that filter dimension
/// instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
    pub min_pay: Option<String>,
    pub food_only: Option<String>,
    pub sort: Option<String>,
    pub lat: Option<String>,
    pub long: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Newest,
    HighPay,
    Nearby,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    pub query: Option<String>,
    pub min_pay: Option<Decimal>,
    pub food_only: bool,
    pub sort: SortMode,
}

impl FeedQuery {
    pub fn filter(&self) -> FeedFilter {
        let query = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let min_pay = self
            .min_pay
            .as_deref()
            .and_then(|s| s.trim().parse::<Decimal>().ok());

        let food_only = self
            .food_only
            .as_deref()
            .map(|s| matches!(s.trim(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let sort = match self.sort.as_deref().map(str::trim) {
            Some("high_pay") | Some("highpay") => SortMode::HighPay,
            Some("nearby") => SortMode::Nearby,
            _ => SortMode::Newest,
        };

        FeedFilter {
            query,
            min_pay,
            food_only,
            sort,
        }
    }

    /// Requester coordinates; only usable when both components parse.
    pub fn origin(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_deref().and_then(|s| s.trim().parse::<f64>().ok())?;
        let long = self.long.as_deref().and_then(|s| s.trim().parse::<f64>().ok())?;
        Some((lat, long))
    }
}

/// An open job as the feed presents it: the record itself, the poster's
/// public profile fields, and the per-request derived distance.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedJob {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub poster_username: String,
    pub poster_full_name: Option<String>,
    pub poster_avatar_url: Option<String>,
    #[sqlx(default)]
    pub distance_km: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_min_pay_drops_the_dimension() {
        let q = FeedQuery {
            min_pay: Some("abc".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().min_pay, None);
    }

    #[test]
    fn numeric_min_pay_is_kept() {
        let q = FeedQuery {
            min_pay: Some(" 600 ".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().min_pay, Some(Decimal::from(600)));
    }

    #[test]
    fn unknown_sort_falls_back_to_newest() {
        let q = FeedQuery {
            sort: Some("cheapest".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().sort, SortMode::Newest);

        let q = FeedQuery {
            sort: Some("nearby".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().sort, SortMode::Nearby);
    }

    #[test]
    fn blank_query_is_no_filter() {
        let q = FeedQuery {
            q: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(q.filter().query, None);
    }

    #[test]
    fn origin_requires_both_coordinates() {
        let q = FeedQuery {
            lat: Some("28.61".into()),
            ..Default::default()
        };
        assert_eq!(q.origin(), None);

        let q = FeedQuery {
            lat: Some("28.61".into()),
            long: Some("77.20".into()),
            ..Default::default()
        };
        assert_eq!(q.origin(), Some((28.61, 77.20)));

        let q = FeedQuery {
            lat: Some("28.61".into()),
            long: Some("not-a-number".into()),
            ..Default::default()
        };
        assert_eq!(q.origin(), None);
    }
}
