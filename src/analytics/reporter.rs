//! Aggregation over the filter request log for `revlens stats`.

use std::collections::HashMap;

use super::events::FilterEvent;

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary of logged filter requests.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_requests: usize,
    pub outcomes: OutcomeDistribution,
    /// Mean latency of requests answered by the remote service.
    pub avg_remote_latency_ms: f64,
    /// Mean latency of requests answered from the cache.
    pub avg_cache_latency_ms: f64,
    pub range_stats: Vec<RangeStat>,
}

/// How requests ended.
#[derive(Debug, Default)]
pub struct OutcomeDistribution {
    pub cache_hits: usize,
    pub remote: usize,
    pub empty: usize,
    pub validation: usize,
    pub timeout: usize,
    pub remote_error: usize,
    pub superseded: usize,
}

impl OutcomeDistribution {
    pub fn applied(&self) -> usize {
        self.cache_hits + self.remote
    }

    pub fn total(&self) -> usize {
        self.applied()
            + self.empty
            + self.validation
            + self.timeout
            + self.remote_error
            + self.superseded
    }

    /// Percentage for a given count, returns 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (count as f64 / total as f64) * 100.0
        }
    }

    /// Share of applied requests served from the cache.
    pub fn cache_hit_rate(&self) -> f64 {
        let applied = self.applied();
        if applied == 0 {
            0.0
        } else {
            self.cache_hits as f64 / applied as f64 * 100.0
        }
    }
}

/// Per date-range request counts.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeStat {
    pub start: String,
    pub end: String,
    pub requests: usize,
    pub applied: usize,
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Aggregate logged events.
pub fn compute_stats(events: &[FilterEvent]) -> Stats {
    if events.is_empty() {
        return Stats::default();
    }

    let mut outcomes = OutcomeDistribution::default();
    let mut remote_latency = Vec::new();
    let mut cache_latency = Vec::new();

    for event in events {
        match (event.outcome.as_str(), event.source.as_deref()) {
            ("applied", Some("cache")) => {
                outcomes.cache_hits += 1;
                cache_latency.push(event.latency_ms);
            }
            ("applied", _) => {
                outcomes.remote += 1;
                remote_latency.push(event.latency_ms);
            }
            ("empty", _) => outcomes.empty += 1,
            ("validation", _) => outcomes.validation += 1,
            ("timeout", _) => outcomes.timeout += 1,
            ("superseded", _) => outcomes.superseded += 1,
            _ => outcomes.remote_error += 1,
        }
    }

    Stats {
        total_requests: events.len(),
        outcomes,
        avg_remote_latency_ms: mean(&remote_latency),
        avg_cache_latency_ms: mean(&cache_latency),
        range_stats: compute_range_stats(events),
    }
}

fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<u64>() as f64 / values.len() as f64
    }
}

/// Group by `(start, end)`; most requested first, ties by range.
fn compute_range_stats(events: &[FilterEvent]) -> Vec<RangeStat> {
    let mut groups: HashMap<(&str, &str), (usize, usize)> = HashMap::new();
    for e in events {
        let entry = groups.entry((e.start.as_str(), e.end.as_str())).or_default();
        entry.0 += 1;
        if e.succeeded() {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<RangeStat> = groups
        .into_iter()
        .map(|((start, end), (requests, applied))| RangeStat {
            start: start.to_string(),
            end: end.to_string(),
            requests,
            applied,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.requests
            .cmp(&a.requests)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.end.cmp(&b.end))
    });
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(start: &str, outcome: &str, source: Option<&str>, latency_ms: u64) -> FilterEvent {
        let mut e = FilterEvent::new(Utc::now(), start, "2024-12-31", outcome);
        e.source = source.map(str::to_string);
        e.latency_ms = latency_ms;
        e
    }

    #[test]
    fn empty_log_gives_zero_stats() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.outcomes.pct(0), 0.0);
    }

    #[test]
    fn splits_outcomes_and_latency() {
        let events = vec![
            event("2024-01-01", "applied", Some("remote"), 4000),
            event("2024-01-01", "applied", Some("cache"), 600),
            event("2024-06-01", "timeout", None, 90_000),
            event("2024-06-01", "remote_error", None, 100),
            event("2024-07-01", "empty", None, 600),
        ];
        let stats = compute_stats(&events);

        assert_eq!(stats.total_requests, 5);
        assert_eq!(stats.outcomes.applied(), 2);
        assert_eq!(stats.outcomes.cache_hit_rate(), 50.0);
        assert_eq!(stats.outcomes.timeout, 1);
        assert_eq!(stats.avg_remote_latency_ms, 4000.0);
        assert_eq!(stats.avg_cache_latency_ms, 600.0);
        assert_eq!(stats.range_stats[0].start, "2024-01-01");
        assert_eq!(stats.range_stats[0].applied, 2);
        assert_eq!(stats.range_stats[1].start, "2024-06-01");
    }
}
