use crate::dto::feed_dto::{FeedFilter, FeedJob, SortMode};
use crate::utils::geo;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Annotate each job with the distance from the requester's position.
/// Jobs without stored coordinates (or when the requester sent none)
/// keep `distance_km = None`, which sorts after every known distance.
pub fn annotate_distances(mut jobs: Vec<FeedJob>, origin: Option<(f64, f64)>) -> Vec<FeedJob> {
    for entry in &mut jobs {
        entry.distance_km = geo::distance_km(origin, entry.job.coordinates());
    }
    jobs
}

/// Apply the filter dimensions (AND semantics) and the selected sort.
/// Pure transform: same input and filter always yield the same ordered
/// sequence, with the job id as the final tie-break in every mode.
pub fn build_feed(jobs: Vec<FeedJob>, filter: &FeedFilter) -> Vec<FeedJob> {
    let mut result: Vec<FeedJob> = jobs.into_iter().filter(|j| matches(j, filter)).collect();

    match filter.sort {
        SortMode::Newest => result.sort_by(cmp_newest),
        SortMode::HighPay => result.sort_by(|a, b| {
            b.job
                .amount
                .cmp(&a.job.amount)
                .then_with(|| cmp_newest(a, b))
        }),
        SortMode::Nearby => result.sort_by(|a, b| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x
                .partial_cmp(&y)
                .unwrap_or(Ordering::Equal)
                .then_with(|| cmp_newest(a, b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            // Unknown distances keep Newest order among themselves.
            (None, None) => cmp_newest(a, b),
        }),
    }

    result
}

/// Distance annotation followed by filtering and sorting: the feed as
/// the client renders it.
pub fn assemble(
    jobs: Vec<FeedJob>,
    origin: Option<(f64, f64)>,
    filter: &FeedFilter,
) -> Vec<FeedJob> {
    build_feed(annotate_distances(jobs, origin), filter)
}

fn matches(entry: &FeedJob, filter: &FeedFilter) -> bool {
    if let Some(q) = &filter.query {
        let needle = q.to_lowercase();
        let title_hit = entry.job.title.to_lowercase().contains(&needle);
        let location_hit = entry
            .job
            .location
            .as_deref()
            .map(|l| l.to_lowercase().contains(&needle))
            .unwrap_or(false);
        if !title_hit && !location_hit {
            return false;
        }
    }

    if let Some(min) = filter.min_pay {
        if entry.job.amount < min {
            return false;
        }
    }

    if filter.food_only && !entry.job.has_food {
        return false;
    }

    true
}

fn cmp_newest(a: &FeedJob, b: &FeedJob) -> Ordering {
    b.job
        .created_at
        .cmp(&a.job.created_at)
        .then_with(|| a.job.id.cmp(&b.job.id))
}

/// Generation counter for feed refreshes: a fetch started for an older
/// generation than the latest one is discarded on arrival instead of
/// overwriting newer state ("last request wins", independent of network
/// completion order).
#[derive(Debug, Default)]
pub struct FeedSequencer {
    current: AtomicU64,
}

impl FeedSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new refresh, superseding every outstanding one.
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.current.load(AtomicOrdering::SeqCst) == token
    }

    /// Keep a completed result only if no newer refresh began meanwhile.
    pub fn accept<T>(&self, token: u64, result: T) -> Option<T> {
        if self.is_current(token) {
            Some(result)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{Job, JobStatus};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn feed_job(
        n: u128,
        title: &str,
        amount: i64,
        created_hour: u32,
        coords: Option<(f64, f64)>,
        has_food: bool,
    ) -> FeedJob {
        let created_at = Utc
            .with_ymd_and_hms(2026, 7, 1, created_hour, 0, 0)
            .unwrap();
        FeedJob {
            job: Job {
                id: Uuid::from_u128(n),
                owner_id: Uuid::from_u128(900),
                title: title.to_string(),
                amount: Decimal::from(amount),
                location: Some("Connaught Place".to_string()),
                latitude: coords.map(|c| c.0),
                longitude: coords.map(|c| c.1),
                job_date: None,
                shift_start: None,
                shift_end: None,
                has_food,
                dress_code: None,
                status: JobStatus::Open,
                hired_applicant_id: None,
                created_at,
                updated_at: created_at,
            },
            poster_username: "poster".to_string(),
            poster_full_name: None,
            poster_avatar_url: None,
            distance_km: None,
        }
    }

    const ORIGIN: (f64, f64) = (28.6139, 77.2090);

    // Job J: pay 500, older, no coordinates. Job K: pay 800, newer,
    // coordinates a few km from the origin.
    fn j_and_k() -> Vec<FeedJob> {
        vec![
            feed_job(1, "Warehouse helper", 500, 8, None, false),
            feed_job(2, "Catering staff", 800, 10, Some((28.6304, 77.2177)), true),
        ]
    }

    #[test]
    fn high_pay_sorts_k_before_j() {
        let feed = assemble(j_and_k(), Some(ORIGIN), &FeedFilter {
            sort: SortMode::HighPay,
            ..Default::default()
        });
        let titles: Vec<&str> = feed.iter().map(|f| f.job.title.as_str()).collect();
        assert_eq!(titles, vec!["Catering staff", "Warehouse helper"]);
    }

    #[test]
    fn nearby_puts_unknown_distance_last() {
        let feed = assemble(j_and_k(), Some(ORIGIN), &FeedFilter {
            sort: SortMode::Nearby,
            ..Default::default()
        });
        assert_eq!(feed[0].job.title, "Catering staff");
        assert!(feed[0].distance_km.is_some());
        assert_eq!(feed[1].job.title, "Warehouse helper");
        assert_eq!(feed[1].distance_km, None);
    }

    #[test]
    fn min_pay_is_inclusive_and_filters_below() {
        let filter = FeedFilter {
            min_pay: Some(Decimal::from(600)),
            ..Default::default()
        };
        let feed = assemble(j_and_k(), Some(ORIGIN), &filter);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].job.title, "Catering staff");

        let at_threshold = FeedFilter {
            min_pay: Some(Decimal::from(500)),
            ..Default::default()
        };
        assert_eq!(assemble(j_and_k(), Some(ORIGIN), &at_threshold).len(), 2);
    }

    #[test]
    fn text_query_matches_title_or_location() {
        let filter = FeedFilter {
            query: Some("CATERING".to_string()),
            ..Default::default()
        };
        assert_eq!(build_feed(j_and_k(), &filter).len(), 1);

        // Both jobs share the location label.
        let filter = FeedFilter {
            query: Some("connaught".to_string()),
            ..Default::default()
        };
        assert_eq!(build_feed(j_and_k(), &filter).len(), 2);

        let filter = FeedFilter {
            query: Some("plumbing".to_string()),
            ..Default::default()
        };
        assert!(build_feed(j_and_k(), &filter).is_empty());
    }

    #[test]
    fn food_only_filters_jobs_without_food() {
        let filter = FeedFilter {
            food_only: true,
            ..Default::default()
        };
        let feed = build_feed(j_and_k(), &filter);
        assert_eq!(feed.len(), 1);
        assert!(feed[0].job.has_food);
    }

    #[test]
    fn pipeline_is_idempotent() {
        for sort in [SortMode::Newest, SortMode::HighPay, SortMode::Nearby] {
            let filter = FeedFilter {
                sort,
                ..Default::default()
            };
            let once = assemble(j_and_k(), Some(ORIGIN), &filter);
            let twice = build_feed(once.clone(), &filter);
            let ids_once: Vec<Uuid> = once.iter().map(|f| f.job.id).collect();
            let ids_twice: Vec<Uuid> = twice.iter().map(|f| f.job.id).collect();
            assert_eq!(ids_once, ids_twice);
        }
    }

    #[test]
    fn unknown_distances_keep_newest_order_among_themselves() {
        let jobs = vec![
            feed_job(1, "Old unplaced", 100, 6, None, false),
            feed_job(2, "New unplaced", 100, 12, None, false),
            feed_job(3, "Placed", 100, 9, Some((28.62, 77.21)), false),
        ];
        let feed = assemble(jobs, Some(ORIGIN), &FeedFilter {
            sort: SortMode::Nearby,
            ..Default::default()
        });
        let titles: Vec<&str> = feed.iter().map(|f| f.job.title.as_str()).collect();
        assert_eq!(titles, vec!["Placed", "New unplaced", "Old unplaced"]);
    }

    #[test]
    fn ties_break_by_job_id() {
        let a = feed_job(7, "Same", 300, 9, None, false);
        let b = feed_job(3, "Same", 300, 9, None, false);
        let filter = FeedFilter::default();
        let feed = build_feed(vec![a, b], &filter);
        assert_eq!(feed[0].job.id, Uuid::from_u128(3));
        assert_eq!(feed[1].job.id, Uuid::from_u128(7));
    }

    #[test]
    fn sequencer_discards_superseded_results() {
        let seq = FeedSequencer::new();
        let first = seq.begin();
        let second = seq.begin();

        // The older fetch completes after the newer one began.
        assert_eq!(seq.accept(first, "stale"), None);
        assert_eq!(seq.accept(second, "fresh"), Some("fresh"));

        // A third refresh supersedes the second even before completion.
        let third = seq.begin();
        assert!(!seq.is_current(second));
        assert_eq!(seq.accept(third, "latest"), Some("latest"));
    }
}
