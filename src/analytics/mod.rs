//! Query analytics
//!
//! In-memory counters shared by every conversation: total queries, sentiment
//! distribution, and a bounded log of recent queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::SentimentLabel;

/// Maximum number of recent queries retained and returned
pub const MAX_RECENT_QUERIES: usize = 50;

/// Per-label query counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub frustrated: usize,
    pub urgent: usize,
}

impl SentimentDistribution {
    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Frustrated => self.frustrated,
            SentimentLabel::Urgent => self.urgent,
        }
    }

    fn increment(&mut self, label: SentimentLabel) {
        let slot = match label {
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::Neutral => &mut self.neutral,
            SentimentLabel::Negative => &mut self.negative,
            SentimentLabel::Frustrated => &mut self.frustrated,
            SentimentLabel::Urgent => &mut self.urgent,
        };
        *slot += 1;
    }
}

/// One logged query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentQuery {
    pub message: String,
    pub sentiment: SentimentLabel,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate view returned by [`AnalyticsStore::overview`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOverview {
    pub total_queries: usize,
    pub sentiment_distribution: SentimentDistribution,
    /// positive = 1.0, neutral = 0.5, everything else 0.0; two decimals
    pub avg_sentiment_score: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct AnalyticsData {
    total_queries: usize,
    distribution: SentimentDistribution,
    recent: VecDeque<RecentQuery>,
}

/// Thread-safe analytics store; clones share the same counters
#[derive(Debug, Clone, Default)]
pub struct AnalyticsStore {
    data: Arc<Mutex<AnalyticsData>>,
}

impl AnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answered query
    pub fn record(&self, message: impl Into<String>, sentiment: SentimentLabel) {
        let mut data = self.lock();
        data.total_queries += 1;
        data.distribution.increment(sentiment);

        data.recent.push_back(RecentQuery {
            message: message.into(),
            sentiment,
            timestamp: Utc::now(),
        });
        while data.recent.len() > MAX_RECENT_QUERIES {
            data.recent.pop_front();
        }
    }

    pub fn overview(&self) -> AnalyticsOverview {
        let data = self.lock();
        AnalyticsOverview {
            total_queries: data.total_queries,
            sentiment_distribution: data.distribution,
            avg_sentiment_score: average_score(data.total_queries, &data.distribution),
            timestamp: Utc::now(),
        }
    }

    /// Up to `limit` (capped at 50) most recent queries, newest first
    pub fn recent(&self, limit: usize) -> Vec<RecentQuery> {
        let limit = limit.min(MAX_RECENT_QUERIES);
        self.lock().recent.iter().rev().take(limit).cloned().collect()
    }

    pub fn total_queries(&self) -> usize {
        self.lock().total_queries
    }

    // Counters stay consistent even if a recording thread panicked
    fn lock(&self) -> MutexGuard<'_, AnalyticsData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn average_score(total: usize, distribution: &SentimentDistribution) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let weighted = distribution.positive as f64 + distribution.neutral as f64 * 0.5;
    (weighted / total as f64 * 100.0).round() / 100.0
}
