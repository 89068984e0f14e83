//! Score classification for choropleth and donut coloring
//!
//! Maps a happiness score onto one of five ordered color buckets.
//! Thresholds are checked from the highest down and the first match wins:
//!
//! | score      | bucket      |
//! |------------|-------------|
//! | >= 7.0     | `high`      |
//! | >= 6.0     | `upper-mid` |
//! | >= 5.5     | `mid`       |
//! | >= 4.5     | `low`       |
//! | otherwise  | `unknown`   |
//!
//! Classification is total: NaN, missing and non-numeric input all land in
//! `unknown`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display bucket for a score
///
/// Variants are declared lowest first so the derived ordering matches
/// the threshold ordering (`Unknown < Low < Mid < UpperMid < High`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorBucket {
    /// Missing, NaN, or below 4.5
    Unknown,
    /// 4.5 up to 5.5
    Low,
    /// 5.5 up to 6.0
    Mid,
    /// 6.0 up to 7.0
    UpperMid,
    /// 7.0 and above
    High,
}

/// Lower bound of each bucket, highest first
const THRESHOLDS: [(f64, ColorBucket); 4] = [
    (7.0, ColorBucket::High),
    (6.0, ColorBucket::UpperMid),
    (5.5, ColorBucket::Mid),
    (4.5, ColorBucket::Low),
];

/// Classify a score
pub fn classify(score: Option<f64>) -> ColorBucket {
    let Some(score) = score else {
        return ColorBucket::Unknown;
    };

    // NaN fails every comparison and falls through
    THRESHOLDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, bucket)| *bucket)
        .unwrap_or(ColorBucket::Unknown)
}

/// Classify a raw JSON value
///
/// Accepts numbers and numeric strings (API payloads are not strict about
/// this); anything else is `Unknown`.
pub fn classify_json(value: &Value) -> ColorBucket {
    classify(score_from_json(value))
}

/// Extract a finite score from a JSON number or numeric string
pub fn score_from_json(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|s| s.is_finite())
}

impl ColorBucket {
    /// Stable identifier used in serialized chart data
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorBucket::High => "high",
            ColorBucket::UpperMid => "upper-mid",
            ColorBucket::Mid => "mid",
            ColorBucket::Low => "low",
            ColorBucket::Unknown => "unknown",
        }
    }

    /// Fill color for donut slices and map regions
    pub fn color(&self) -> &'static str {
        match self {
            ColorBucket::High => "#0E4F77",
            ColorBucket::UpperMid => "#118AB2",
            ColorBucket::Mid => "#73C2FB",
            ColorBucket::Low => "#A2D2FF",
            ColorBucket::Unknown => "#FFFFFF",
        }
    }

    /// Human readable legend label
    pub fn display_name(&self) -> &'static str {
        match self {
            ColorBucket::High => "High (7.0+)",
            ColorBucket::UpperMid => "Upper-mid (6.0-7.0)",
            ColorBucket::Mid => "Mid (5.5-6.0)",
            ColorBucket::Low => "Low (4.5-5.5)",
            ColorBucket::Unknown => "N/A",
        }
    }

    /// All buckets, highest first (legend order)
    pub fn all_variants() -> &'static [ColorBucket] {
        &[
            ColorBucket::High,
            ColorBucket::UpperMid,
            ColorBucket::Mid,
            ColorBucket::Low,
            ColorBucket::Unknown,
        ]
    }
}

impl std::fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(classify(Some(7.0)), ColorBucket::High);
        assert_eq!(classify(Some(6.99)), ColorBucket::UpperMid);
        assert_eq!(classify(Some(6.0)), ColorBucket::UpperMid);
        assert_eq!(classify(Some(5.5)), ColorBucket::Mid);
        assert_eq!(classify(Some(5.49)), ColorBucket::Low);
        assert_eq!(classify(Some(4.5)), ColorBucket::Low);
        assert_eq!(classify(Some(4.49)), ColorBucket::Unknown);
        assert_eq!(classify(Some(-3.0)), ColorBucket::Unknown);
    }

    #[test]
    fn test_nan_and_missing_are_unknown() {
        assert_eq!(classify(Some(f64::NAN)), ColorBucket::Unknown);
        assert_eq!(classify(None), ColorBucket::Unknown);
    }

    #[test]
    fn test_infinite_scores() {
        assert_eq!(classify(Some(f64::INFINITY)), ColorBucket::High);
        assert_eq!(classify(Some(f64::NEG_INFINITY)), ColorBucket::Unknown);
    }

    #[test]
    fn test_monotonic_over_range() {
        // Sweep 0.00..10.00 in steps of 0.01
        let mut previous = classify(Some(0.0));
        for step in 1..=1000 {
            let score = step as f64 / 100.0;
            let bucket = classify(Some(score));
            assert!(
                bucket >= previous,
                "bucket dropped from {} to {} at score {}",
                previous,
                bucket,
                score
            );
            previous = bucket;
        }
        assert_eq!(previous, ColorBucket::High);
    }

    #[test]
    fn test_classify_json() {
        assert_eq!(classify_json(&json!(7.3)), ColorBucket::High);
        assert_eq!(classify_json(&json!("5.6")), ColorBucket::Mid);
        assert_eq!(classify_json(&json!(" 4.8 ")), ColorBucket::Low);
        assert_eq!(classify_json(&json!("n/a")), ColorBucket::Unknown);
        assert_eq!(classify_json(&json!(null)), ColorBucket::Unknown);
        assert_eq!(classify_json(&json!({"score": 8.0})), ColorBucket::Unknown);
        assert_eq!(classify_json(&json!("NaN")), ColorBucket::Unknown);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&ColorBucket::UpperMid).unwrap(), "\"upper-mid\"");
        for bucket in ColorBucket::all_variants() {
            let json = serde_json::to_string(bucket).unwrap();
            assert_eq!(json, format!("\"{}\"", bucket.as_str()));
        }
    }

    #[test]
    fn test_legend_order_is_descending() {
        let variants = ColorBucket::all_variants();
        assert!(variants.windows(2).all(|w| w[0] > w[1]));
    }
}
