use formats::{
    CollectionError, IngestReport, PredictionPoint, parse_point_collection,
    parse_point_collection_str,
};
use foundation::{GeoExtent, PointId};
use serde_json::Value;
use tracing::{debug, info, warn};

/// The ingested point set. Read-only after construction.
///
/// Ordering contract:
/// - Points are held in ascending `PointId` order, which is source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureIndex {
    points: Vec<PredictionPoint>,
    dropped: usize,
}

impl FeatureIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(mut points: Vec<PredictionPoint>) -> Self {
        points.sort_by_key(|p| p.id);
        points.dedup_by_key(|p| p.id);
        Self { points, dropped: 0 }
    }

    /// Builds the index from a raw collection value.
    ///
    /// Bad features are dropped one by one; a malformed collection yields an
    /// empty index rather than an error.
    pub fn ingest(value: &Value) -> Self {
        Self::from_report(parse_point_collection(value))
    }

    pub fn ingest_str(payload: &str) -> Self {
        Self::from_report(parse_point_collection_str(payload))
    }

    fn from_report(result: Result<IngestReport, CollectionError>) -> Self {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                warn!("point collection rejected, continuing with an empty index: {err}");
                return Self::new();
            }
        };

        for d in &report.dropped {
            debug!(index = d.index, "dropped feature: {}", d.reason);
        }
        info!(
            points = report.points.len(),
            dropped = report.dropped.len(),
            "point collection ingested"
        );

        Self {
            points: report.points,
            dropped: report.dropped.len(),
        }
    }

    pub fn points(&self) -> &[PredictionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of source features rejected during ingestion.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn get(&self, id: PointId) -> Option<&PredictionPoint> {
        self.points
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.points[i])
    }

    pub fn filter(&self, pred: impl Fn(&PredictionPoint) -> bool) -> Vec<&PredictionPoint> {
        self.points.iter().filter(|p| pred(p)).collect()
    }

    pub fn subsample(&self, stride: usize) -> Vec<&PredictionPoint> {
        subsample(&self.points, stride)
    }

    pub fn extent(&self) -> Option<GeoExtent> {
        extent_of(&self.points)
    }
}

/// Keeps every `stride`-th point by source index (`id % stride == 0`).
///
/// A stride of 0 is treated as 1.
pub fn subsample<'a, I>(points: I, stride: usize) -> Vec<&'a PredictionPoint>
where
    I: IntoIterator<Item = &'a PredictionPoint>,
{
    let stride = stride.max(1) as u64;
    points
        .into_iter()
        .filter(|p| u64::from(p.id.index()) % stride == 0)
        .collect()
}

/// Bounding box of the points' coordinates; `None` for an empty set.
pub fn extent_of<'a, I>(points: I) -> Option<GeoExtent>
where
    I: IntoIterator<Item = &'a PredictionPoint>,
{
    GeoExtent::from_points(points.into_iter().map(|p| p.coordinates))
}
