//! Emotion buckets and the chart series derived from them.
//!
//! The backend reports raw per-bucket counts ([`EmotionBucket`]). The
//! dashboard shows each bucket as integer percentage shares plus an alert
//! count ([`ChartPoint`]), and keeps only the most recent buckets in time
//! order ([`Series`]).

use serde::{Deserialize, Deserializer, Serialize};

/// Number of chart points kept for display unless configured otherwise.
pub const DEFAULT_MAX_POINTS: usize = 6;

// ---------------------------------------------------------------------------
// Raw buckets
// ---------------------------------------------------------------------------

/// One time interval of emotion counts as reported by the backend.
///
/// Missing or `null` counts are read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionBucket {
    pub time: String,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub joy: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub anger: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub confusion: u64,
    #[serde(default, deserialize_with = "count_or_zero")]
    pub neutral: u64,
}

fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

impl EmotionBucket {
    /// Sum of all four counts, clamped at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.joy
            .saturating_add(self.anger)
            .saturating_add(self.confusion)
            .saturating_add(self.neutral)
    }

    /// Anger plus confusion, clamped at `u64::MAX`.
    fn negative(&self) -> u64 {
        self.anger.saturating_add(self.confusion)
    }
}

// ---------------------------------------------------------------------------
// Chart points
// ---------------------------------------------------------------------------

/// A bucket as displayed: percentage shares of the bucket total.
///
/// `negative` folds anger and confusion together. `alerts` is the raw anger
/// count, not a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: String,
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
    pub alerts: u64,
}

impl ChartPoint {
    fn new(time: &str, positive: u32, negative: u32, neutral: u32, alerts: u64) -> Self {
        Self {
            time: time.to_string(),
            positive,
            negative,
            neutral,
            alerts,
        }
    }

    /// Sum of the three shares. Within 100 ± 2 for a non-empty bucket whose
    /// total fits in a `u64`, 0 for an empty one.
    pub fn share_total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }
}

impl From<&EmotionBucket> for ChartPoint {
    fn from(bucket: &EmotionBucket) -> Self {
        let total = bucket.total();
        Self {
            time: bucket.time.clone(),
            positive: share(bucket.joy, total),
            negative: share(bucket.negative(), total),
            neutral: share(bucket.neutral, total),
            alerts: bucket.anger,
        }
    }
}

/// Percentage of `part` in `total`, rounded half away from zero. An empty
/// total yields 0.
fn share(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Chart points sorted ascending by `time`, newest last.
///
/// A series is built wholesale from a bucket list and never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series(Vec<ChartPoint>);

impl Series {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Transform raw buckets into a display series.
    ///
    /// Buckets arrive unordered; they are sorted by their `time` label
    /// (plain string order, so `"09:00"` sorts before `"10:00"`) and only the
    /// last `max_points` are kept.
    pub fn from_buckets(buckets: &[EmotionBucket], max_points: usize) -> Self {
        let mut points: Vec<ChartPoint> = buckets.iter().map(ChartPoint::from).collect();
        points.sort_by(|a, b| a.time.cmp(&b.time));
        let excess = points.len().saturating_sub(max_points);
        points.drain(..excess);
        Self(points)
    }

    /// Sample series shown until the backend has answered at least once.
    pub fn seed() -> Self {
        Self(vec![
            ChartPoint::new("09:00", 65, 20, 15, 2),
            ChartPoint::new("10:00", 70, 18, 12, 1),
            ChartPoint::new("11:00", 60, 25, 15, 3),
            ChartPoint::new("12:00", 55, 30, 15, 4),
            ChartPoint::new("13:00", 75, 15, 10, 1),
            ChartPoint::new("14:00", 80, 10, 10, 0),
        ])
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of `alerts` across the series.
    pub fn total_alerts(&self) -> u64 {
        self.0.iter().fold(0, |sum, p| sum.saturating_add(p.alerts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(time: &str, joy: u64, anger: u64, confusion: u64, neutral: u64) -> EmotionBucket {
        EmotionBucket {
            time: time.to_string(),
            joy,
            anger,
            confusion,
            neutral,
        }
    }

    #[test]
    fn bucket_converts_to_percentages() {
        let point = ChartPoint::from(&bucket("09:00", 65, 20, 0, 15));
        assert_eq!(point, ChartPoint::new("09:00", 65, 20, 15, 20));
    }

    #[test]
    fn confusion_counts_as_negative() {
        let point = ChartPoint::from(&bucket("10:00", 2, 1, 1, 0));
        assert_eq!(point.positive, 50);
        assert_eq!(point.negative, 50);
        assert_eq!(point.neutral, 0);
        assert_eq!(point.alerts, 1);
    }

    #[test]
    fn empty_bucket_yields_zero_shares() {
        let point = ChartPoint::from(&bucket("11:00", 0, 0, 0, 0));
        assert_eq!(point, ChartPoint::new("11:00", 0, 0, 0, 0));
    }

    #[test]
    fn shares_round_to_nearest() {
        // 1/3 = 33.3 → 33, 2/3 = 66.7 → 67
        let point = ChartPoint::from(&bucket("12:00", 1, 2, 0, 0));
        assert_eq!(point.positive, 33);
        assert_eq!(point.negative, 67);
    }

    #[test]
    fn shares_stay_near_one_hundred() {
        for joy in 0..12 {
            for anger in 0..12 {
                for neutral in 0..12 {
                    let b = bucket("t", joy, anger, (joy + anger) % 5, neutral);
                    if b.total() == 0 {
                        continue;
                    }
                    let sum = ChartPoint::from(&b).share_total();
                    assert!((98..=102).contains(&sum), "{b:?} summed to {sum}");
                }
            }
        }
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let json = r#"[{"time":"09:00","joy":18446744073709551615,"anger":1,"confusion":0,"neutral":0}]"#;
        let buckets: Vec<EmotionBucket> = serde_json::from_str(json).unwrap();
        assert_eq!(buckets[0].total(), u64::MAX);

        let series = Series::from_buckets(&buckets, DEFAULT_MAX_POINTS);
        let point = &series.points()[0];
        assert_eq!(point.positive, 100);
        assert_eq!(point.negative, 0);
        assert_eq!(point.alerts, 1);
        assert!(point.share_total() <= 102);

        let all_max = bucket("10:00", u64::MAX, u64::MAX, u64::MAX, u64::MAX);
        let point = ChartPoint::from(&all_max);
        assert_eq!((point.positive, point.negative, point.neutral), (100, 100, 100));
        let doubled = Series::from_buckets(&[all_max.clone(), all_max], DEFAULT_MAX_POINTS);
        assert_eq!(doubled.total_alerts(), u64::MAX);
    }

    #[test]
    fn series_sorts_by_time_and_keeps_latest() {
        let buckets: Vec<EmotionBucket> = ["13:00", "09:00", "11:00", "08:00", "12:00", "10:00", "14:00"]
            .iter()
            .map(|t| bucket(t, 1, 0, 0, 0))
            .collect();

        let series = Series::from_buckets(&buckets, DEFAULT_MAX_POINTS);
        let times: Vec<&str> = series.points().iter().map(|p| p.time.as_str()).collect();
        assert_eq!(times, ["09:00", "10:00", "11:00", "12:00", "13:00", "14:00"]);
    }

    #[test]
    fn short_bucket_list_is_kept_whole() {
        let buckets = vec![bucket("10:00", 1, 1, 0, 0), bucket("09:00", 0, 0, 0, 3)];
        let series = Series::from_buckets(&buckets, DEFAULT_MAX_POINTS);
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].time, "09:00");
    }

    #[test]
    fn empty_bucket_list_gives_empty_series() {
        assert!(Series::from_buckets(&[], DEFAULT_MAX_POINTS).is_empty());
    }

    #[test]
    fn seed_is_sorted_and_full() {
        let seed = Series::seed();
        assert_eq!(seed.len(), DEFAULT_MAX_POINTS);
        assert!(seed.points().windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(seed.total_alerts(), 11);
    }

    #[test]
    fn bucket_accepts_missing_and_null_counts() {
        let json = r#"{"time": "09:00", "joy": 3, "anger": null}"#;
        let b: EmotionBucket = serde_json::from_str(json).unwrap();
        assert_eq!(b, bucket("09:00", 3, 0, 0, 0));
    }

    #[test]
    fn series_serializes_as_plain_array() {
        let series = Series::from_buckets(&[bucket("09:00", 1, 0, 0, 0)], DEFAULT_MAX_POINTS);
        let json = serde_json::to_value(&series).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["positive"], 100);
    }
}
