//! Weekly metric structures produced by an analysis run
//!
//! Field names of the serialized forms are consumed by the report
//! templates and must not change.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The Sunday beginning a calendar week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// Week containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_sunday() as i64;
        Self(date - Duration::days(offset))
    }

    /// Week containing the UTC calendar day of `ts`
    pub fn of(ts: DateTime<Utc>) -> Self {
        Self::containing(ts.date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn previous(&self) -> Self {
        Self(self.0 - Duration::weeks(1))
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Slot index of `date` within its week (Sunday = 0)
pub fn day_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

/// State of one day in a review request's queue interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMark {
    /// Delisting day
    Resolved,
    /// Requested and delisted on the same day
    SameDay,
    /// Still waiting at the end of the day
    Waiting,
}

impl QueueMark {
    pub fn value(self) -> i8 {
        match self {
            QueueMark::Resolved => -1,
            QueueMark::SameDay => 0,
            QueueMark::Waiting => 1,
        }
    }
}

impl Serialize for QueueMark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

impl<'de> Deserialize<'de> for QueueMark {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match i8::deserialize(deserializer)? {
            -1 => Ok(QueueMark::Resolved),
            0 => Ok(QueueMark::SameDay),
            1 => Ok(QueueMark::Waiting),
            other => Err(de::Error::custom(format!(
                "queue mark must be -1, 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Seven slots, Sunday first; `None` for days outside the interval
pub type DayArray = [Option<QueueMark>; 7];

/// Lag samples and queue rows for one week
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekMetrics {
    pub open_to_review_request: Vec<i64>,
    pub review_request_to_first: Vec<i64>,
    pub review_request_to_approved: Vec<i64>,
    pub queue_size: Vec<DayArray>,
}

impl WeekMetrics {
    pub fn push_lags(&mut self, lags: &LagSample) {
        self.open_to_review_request.push(lags.open_to_review_request);
        self.review_request_to_first.push(lags.review_request_to_first);
        self.review_request_to_approved
            .push(lags.review_request_to_approved);
    }
}

/// One PR's three lag values, in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LagSample {
    pub open_to_review_request: i64,
    pub review_request_to_first: i64,
    pub review_request_to_approved: i64,
}

pub type WeekMap = BTreeMap<WeekKey, WeekMetrics>;

/// PRs tied for the longest wait on a first response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeastReviewedEntry {
    /// `-1` until a PR has been recorded
    pub days: i64,
    pub prs: Vec<String>,
}

impl LeastReviewedEntry {
    pub const NO_DATA: i64 = -1;

    pub fn has_data(&self) -> bool {
        self.days > Self::NO_DATA
    }
}

impl Default for LeastReviewedEntry {
    fn default() -> Self {
        Self {
            days: Self::NO_DATA,
            prs: Vec::new(),
        }
    }
}

pub type LeastReviewedMap = BTreeMap<WeekKey, LeastReviewedEntry>;
