//! Reliability classification of prediction points.
//!
//! Two independent metric axes are scored onto `[0, 1]` (1 = most
//! trustworthy). Both axes put their best value at the lower raw endpoint:
//! low variance is good, and a more negative similarity (closer to the
//! training distribution) is good. A single formula therefore serves both.

use std::collections::HashSet;

use formats::PredictionProperties;

use crate::symbology::{Rgb, Tone};

/// Score above which an axis reads as good.
pub const GOOD_SCORE: f64 = 0.7;
/// Score above which an axis reads as a warning rather than bad.
pub const WARNING_SCORE: f64 = 0.4;

/// `clamp(1 - (value - min) / (max - min), 0, 1)`.
///
/// A non-finite value scores 0. A degenerate range scores 1 at or below
/// `min` and 0 above it.
pub fn reliability_score(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return if value <= min { 1.0 } else { 0.0 };
    }
    (1.0 - (value - min) / span).clamp(0.0, 1.0)
}

pub fn score_tone(score: f64) -> Tone {
    if score > GOOD_SCORE {
        Tone::Good
    } else if score > WARNING_SCORE {
        Tone::Warning
    } else {
        Tone::Bad
    }
}

/// One metric's documented range and thresholds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MetricAxis {
    pub metric: &'static str,
    pub title: &'static str,
    /// Raw value scoring 1.
    pub best: f64,
    /// Raw value scoring 0.
    pub worst: f64,
    /// Values above this are unreliable.
    pub threshold: f64,
    /// Values above this are extremely unreliable.
    pub extreme_threshold: f64,
}

pub const VARIANCE_AXIS: MetricAxis = MetricAxis {
    metric: "varianceScore",
    title: "Model Reliability",
    best: 0.0,
    worst: 0.264,
    threshold: 0.1,
    extreme_threshold: 0.45,
};

pub const SIMILARITY_AXIS: MetricAxis = MetricAxis {
    metric: "similarityScore",
    title: "Data Reliability",
    best: -8.22,
    worst: -1.87,
    threshold: -5.25,
    extreme_threshold: -1.87,
};

impl MetricAxis {
    pub fn score(&self, value: f64) -> f64 {
        reliability_score(value, self.best, self.worst)
    }

    pub fn exceeds(&self, value: f64) -> bool {
        value > self.threshold
    }

    pub fn is_extreme(&self, value: f64) -> bool {
        value > self.extreme_threshold
    }

    /// Raw values where the band changes: `[good/warning, warning/bad]`.
    pub fn band_cut_points(&self) -> [f64; 2] {
        let span = self.worst - self.best;
        [
            self.best + (1.0 - GOOD_SCORE) * span,
            self.best + (1.0 - WARNING_SCORE) * span,
        ]
    }

    pub fn assess(&self, value: Option<f64>) -> AxisReliability {
        match value {
            Some(v) if v.is_finite() => {
                let score = self.score(v);
                AxisReliability {
                    value: Some(v),
                    score,
                    tone: score_tone(score),
                }
            }
            _ => AxisReliability::unknown(),
        }
    }
}

/// Score and band for one axis of one point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisReliability {
    pub value: Option<f64>,
    pub score: f64,
    pub tone: Tone,
}

impl AxisReliability {
    /// Sentinel for a missing metric: score 0, neutral tone.
    pub fn unknown() -> Self {
        Self {
            value: None,
            score: 0.0,
            tone: Tone::Neutral,
        }
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some()
    }

    /// Bar fill, `round(score * 100)` clamped to `0..=100`.
    pub fn percent(&self) -> u8 {
        (self.score * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Short qualitative label.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub label: &'static str,
    pub tone: Tone,
}

pub const RELIABLE_PREDICTION: Tag = Tag {
    label: "Reliable prediction",
    tone: Tone::Good,
};
pub const VERY_UNRELIABLE: Tag = Tag {
    label: "Very unreliable",
    tone: Tone::Bad,
};
pub const TOO_MUCH_VARIANCE: Tag = Tag {
    label: "Too much variance",
    tone: Tone::Warning,
};
pub const EXTREMELY_UNRELIABLE_MODEL: Tag = Tag {
    label: "Extremely unreliable model",
    tone: Tone::Bad,
};
pub const NOT_ENOUGH_SIMILAR_DATA: Tag = Tag {
    label: "Not enough similar data",
    tone: Tone::Warning,
};
pub const EXTREMELY_UNRELIABLE_DATA: Tag = Tag {
    label: "Extremely unreliable data",
    tone: Tone::Bad,
};
pub const RELIABILITY_UNKNOWN: Tag = Tag {
    label: "Reliability unknown",
    tone: Tone::Neutral,
};

/// Removes repeated labels, keeping the first occurrence of each.
pub fn dedup_by_label(tags: impl IntoIterator<Item = Tag>) -> Vec<Tag> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.label)).collect()
}

/// Everything derived from a point's metrics. Recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityAssessment {
    pub variance: AxisReliability,
    pub similarity: AxisReliability,
    pub tags: Vec<Tag>,
    pub marker_tone: Tone,
}

impl ReliabilityAssessment {
    pub fn marker_color(&self) -> Rgb {
        self.marker_tone.color()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReliabilityClassifier {
    pub variance: MetricAxis,
    pub similarity: MetricAxis,
}

impl Default for ReliabilityClassifier {
    fn default() -> Self {
        Self {
            variance: VARIANCE_AXIS,
            similarity: SIMILARITY_AXIS,
        }
    }
}

impl ReliabilityClassifier {
    pub fn new(variance: MetricAxis, similarity: MetricAxis) -> Self {
        Self {
            variance,
            similarity,
        }
    }

    pub fn assess(&self, props: &PredictionProperties) -> ReliabilityAssessment {
        let (v, s) = (props.variance_score, props.similarity_score);
        ReliabilityAssessment {
            variance: self.variance.assess(v),
            similarity: self.similarity.assess(s),
            tags: self.tags(v, s),
            marker_tone: self.marker_tone(v, s),
        }
    }

    /// Bad if both axes exceed their thresholds, warning if exactly one does,
    /// good otherwise. Neutral when either metric is missing.
    pub fn marker_tone(&self, variance: Option<f64>, similarity: Option<f64>) -> Tone {
        let (Some(v), Some(s)) = (variance, similarity) else {
            return Tone::Neutral;
        };
        match (self.variance.exceeds(v), self.similarity.exceeds(s)) {
            (true, true) => Tone::Bad,
            (true, false) | (false, true) => Tone::Warning,
            (false, false) => Tone::Good,
        }
    }

    /// Ordered, duplicate-free tags.
    ///
    /// When both axes are over threshold the combined "Very unreliable" tag
    /// replaces the two per-axis tags. Extreme tags are always added.
    pub fn tags(&self, variance: Option<f64>, similarity: Option<f64>) -> Vec<Tag> {
        let var_over = variance.map(|v| self.variance.exceeds(v));
        let sim_over = similarity.map(|s| self.similarity.exceeds(s));
        let both_over = var_over == Some(true) && sim_over == Some(true);

        let mut tags = Vec::new();
        if var_over == Some(false) && sim_over == Some(false) {
            tags.push(RELIABLE_PREDICTION);
        }
        if both_over {
            tags.push(VERY_UNRELIABLE);
        }
        if var_over == Some(true) && !both_over {
            tags.push(TOO_MUCH_VARIANCE);
        }
        if variance.is_some_and(|v| self.variance.is_extreme(v)) {
            tags.push(EXTREMELY_UNRELIABLE_MODEL);
        }
        if sim_over == Some(true) && !both_over {
            tags.push(NOT_ENOUGH_SIMILAR_DATA);
        }
        if similarity.is_some_and(|s| self.similarity.is_extreme(s)) {
            tags.push(EXTREMELY_UNRELIABLE_DATA);
        }
        if variance.is_none() || similarity.is_none() {
            tags.push(RELIABILITY_UNKNOWN);
        }
        dedup_by_label(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EXTREMELY_UNRELIABLE_DATA, EXTREMELY_UNRELIABLE_MODEL, NOT_ENOUGH_SIMILAR_DATA,
        RELIABILITY_UNKNOWN, RELIABLE_PREDICTION, ReliabilityClassifier, SIMILARITY_AXIS,
        TOO_MUCH_VARIANCE, Tag, VARIANCE_AXIS, VERY_UNRELIABLE, dedup_by_label,
        reliability_score,
    };
    use crate::symbology::Tone;
    use formats::PredictionProperties;

    #[test]
    fn variance_score_endpoints_and_monotonic() {
        assert_eq!(VARIANCE_AXIS.score(0.0), 1.0);
        assert_eq!(VARIANCE_AXIS.score(0.264), 0.0);
        let mut prev = f64::INFINITY;
        for i in 0..=264 {
            let s = VARIANCE_AXIS.score(f64::from(i) / 1000.0);
            assert!(s <= prev, "score rose at {i}");
            assert!((0.0..=1.0).contains(&s));
            prev = s;
        }
    }

    #[test]
    fn similarity_best_at_most_negative() {
        assert_eq!(SIMILARITY_AXIS.score(-8.22), 1.0);
        assert_eq!(SIMILARITY_AXIS.score(-1.87), 0.0);
        assert!(SIMILARITY_AXIS.score(-7.0) > SIMILARITY_AXIS.score(-3.0));
    }

    #[test]
    fn score_clamps_and_handles_degenerate_input() {
        assert_eq!(reliability_score(-1.0, 0.0, 1.0), 1.0);
        assert_eq!(reliability_score(5.0, 0.0, 1.0), 0.0);
        assert_eq!(reliability_score(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(reliability_score(0.0, 1.0, 1.0), 1.0);
        assert_eq!(reliability_score(2.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn band_cut_points_are_distinct_per_axis() {
        let [v_good, v_bad] = VARIANCE_AXIS.band_cut_points();
        let [s_good, s_bad] = SIMILARITY_AXIS.band_cut_points();
        assert!(v_good < v_bad);
        assert!(s_good < s_bad);
        assert!((v_good - 0.0792).abs() < 1e-9);
        assert!((s_good - (-8.22 + 0.3 * 6.35)).abs() < 1e-9);
        assert_eq!(VARIANCE_AXIS.assess(Some(0.05)).tone, Tone::Good);
        assert_eq!(VARIANCE_AXIS.assess(Some(0.12)).tone, Tone::Warning);
        assert_eq!(VARIANCE_AXIS.assess(Some(0.2)).tone, Tone::Bad);
    }

    #[test]
    fn marker_tone_red_iff_both_exceed() {
        let c = ReliabilityClassifier::default();
        let vs = [0.0, 0.1, 0.1001, 0.2, 0.5];
        let ss = [-8.0, -5.25, -5.2499, -3.0, -1.0];
        for v in vs {
            for s in ss {
                let bad = c.marker_tone(Some(v), Some(s)) == Tone::Bad;
                assert_eq!(bad, v > 0.1 && s > -5.25, "v={v} s={s}");
            }
        }
        assert_eq!(c.marker_tone(Some(0.2), Some(-8.0)), Tone::Warning);
        assert_eq!(c.marker_tone(Some(0.05), Some(-3.0)), Tone::Warning);
        assert_eq!(c.marker_tone(Some(0.05), Some(-8.0)), Tone::Good);
        assert_eq!(c.marker_tone(None, Some(-3.0)), Tone::Neutral);
    }

    #[test]
    fn combined_tag_supersedes_axis_tags() {
        let c = ReliabilityClassifier::default();
        assert_eq!(
            c.tags(Some(0.5), Some(-2.0)),
            vec![VERY_UNRELIABLE, EXTREMELY_UNRELIABLE_MODEL]
        );
        assert_eq!(
            c.tags(Some(0.2), Some(-1.0)),
            vec![VERY_UNRELIABLE, EXTREMELY_UNRELIABLE_DATA]
        );
    }

    #[test]
    fn single_axis_tags() {
        let c = ReliabilityClassifier::default();
        assert_eq!(c.tags(Some(0.05), Some(-7.0)), vec![RELIABLE_PREDICTION]);
        assert_eq!(c.tags(Some(0.2), Some(-7.0)), vec![TOO_MUCH_VARIANCE]);
        assert_eq!(
            c.tags(Some(0.08), Some(-1.5)),
            vec![NOT_ENOUGH_SIMILAR_DATA, EXTREMELY_UNRELIABLE_DATA]
        );
        assert_eq!(
            c.tags(None, Some(-4.0)),
            vec![NOT_ENOUGH_SIMILAR_DATA, RELIABILITY_UNKNOWN]
        );
    }

    #[test]
    fn tags_are_idempotent_and_unique() {
        let c = ReliabilityClassifier::default();
        for (v, s) in [(Some(0.5), Some(-1.0)), (Some(0.0), Some(-8.0)), (None, None)] {
            let a = c.tags(v, s);
            assert_eq!(a, c.tags(v, s));
            let mut labels: Vec<&str> = a.iter().map(|t| t.label).collect();
            labels.sort_unstable();
            labels.dedup();
            assert_eq!(labels.len(), a.len());
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let other = Tag {
            label: "Too much variance",
            tone: Tone::Bad,
        };
        assert_eq!(
            dedup_by_label([TOO_MUCH_VARIANCE, VERY_UNRELIABLE, other]),
            vec![TOO_MUCH_VARIANCE, VERY_UNRELIABLE]
        );
    }

    #[test]
    fn missing_metrics_fail_open_to_neutral() {
        let c = ReliabilityClassifier::default();
        let a = c.assess(&PredictionProperties::default());
        assert_eq!(a.variance.score, 0.0);
        assert_eq!(a.variance.tone, Tone::Neutral);
        assert!(!a.similarity.is_known());
        assert_eq!(a.marker_tone, Tone::Neutral);
        assert_eq!(a.tags, vec![RELIABILITY_UNKNOWN]);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(VARIANCE_AXIS.assess(Some(0.0)).percent(), 100);
        assert_eq!(VARIANCE_AXIS.assess(Some(0.264)).percent(), 0);
        assert_eq!(VARIANCE_AXIS.assess(Some(0.132)).percent(), 50);
    }
}
