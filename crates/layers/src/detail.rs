//! View model for the detail panel of the selected point.

use formats::ImageSlot;
use foundation::{LonLat, PointId};
use scene::{FeatureIndex, LocationSource, SelectionPhase, SelectionState, SlotStatus};

use crate::land_cover::land_cover_label;
use crate::reliability::{AxisReliability, MetricAxis, ReliabilityClassifier, Tag};
use crate::symbology::Tone;

/// One axis of the panel: label, score bar and the raw metric beside its range.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliabilityGauge {
    pub title: &'static str,
    pub metric: &'static str,
    pub raw: Option<f64>,
    pub score: f64,
    pub tone: Tone,
    pub percent: u8,
    pub best: f64,
    pub worst: f64,
}

impl ReliabilityGauge {
    pub fn new(axis: &MetricAxis, reliability: &AxisReliability) -> Self {
        Self {
            title: axis.title,
            metric: axis.metric,
            raw: reliability.value,
            score: reliability.score,
            tone: reliability.tone,
            percent: reliability.percent(),
            best: axis.best,
            worst: axis.worst,
        }
    }

    pub fn score_text(&self) -> String {
        format!("{:.2}", self.score)
    }

    pub fn raw_text(&self) -> String {
        match self.raw {
            Some(v) => format!("{v:.3}"),
            None => "n/a".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageView {
    pub slot: ImageSlot,
    pub path: String,
    pub status: SlotStatus,
}

impl ImageView {
    pub fn is_visible(&self) -> bool {
        self.status != SlotStatus::Hidden
    }
}

/// Everything the panel renders for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDetail {
    pub point: PointId,
    pub coordinates: LonLat,
    pub phase: SelectionPhase,
    pub location_label: String,
    pub location_source: LocationSource,
    pub land_cover: String,
    pub gauges: [ReliabilityGauge; 2],
    pub tags: Vec<Tag>,
    pub marker_tone: Tone,
    pub images: Vec<ImageView>,
    pub spinner_visible: bool,
}

impl SelectionDetail {
    /// Returns `None` if the selected point is no longer in `index`.
    pub fn build(
        state: &SelectionState,
        index: &FeatureIndex,
        classifier: &ReliabilityClassifier,
    ) -> Option<Self> {
        let point = index.get(state.point)?;
        let assessment = classifier.assess(&point.properties);
        let images = ImageSlot::ALL
            .into_iter()
            .map(|slot| ImageView {
                slot,
                path: state.images.path(slot).to_string(),
                status: state.slot(slot),
            })
            .collect();

        Some(Self {
            point: point.id,
            coordinates: point.coordinates,
            phase: state.phase(),
            location_label: state.location_label.clone(),
            location_source: state.location_source,
            land_cover: land_cover_label(point.properties.land_cover_class),
            gauges: [
                ReliabilityGauge::new(&classifier.variance, &assessment.variance),
                ReliabilityGauge::new(&classifier.similarity, &assessment.similarity),
            ],
            tags: assessment.tags,
            marker_tone: assessment.marker_tone,
            images,
            spinner_visible: state.spinner_visible,
        })
    }

    pub fn visible_images(&self) -> impl Iterator<Item = &ImageView> {
        self.images.iter().filter(|i| i.is_visible())
    }
}
