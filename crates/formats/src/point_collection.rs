use foundation::{LonLat, PointId};
use serde_json::Value;

use crate::prediction::{PredictionPoint, PredictionProperties};

/// Why a single feature was left out of the point set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    NotAnObject,
    MissingGeometry,
    NotAPoint(String),
    MalformedCoordinates,
    NonFiniteCoordinates,
    MissingProperties,
    IndexOutOfRange,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NotAnObject => write!(f, "feature must be an object"),
            DropReason::MissingGeometry => write!(f, "feature missing geometry"),
            DropReason::NotAPoint(ty) => write!(f, "unsupported geometry type: {ty}"),
            DropReason::MalformedCoordinates => {
                write!(f, "Point coordinates must be a [lon, lat] pair of numbers")
            }
            DropReason::NonFiniteCoordinates => write!(f, "Point coordinates must be finite"),
            DropReason::MissingProperties => write!(f, "feature missing properties object"),
            DropReason::IndexOutOfRange => write!(f, "feature index exceeds u32 range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFeature {
    pub index: usize,
    pub reason: DropReason,
}

/// Outcome of parsing a point collection: the surviving points in source
/// order, plus a record of every feature that was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub points: Vec<PredictionPoint>,
    pub dropped: Vec<DroppedFeature>,
}

/// Collection-level failure. Individual bad features never produce one.
#[derive(Debug)]
pub enum CollectionError {
    Json(serde_json::Error),
    NotAFeatureCollection,
    MissingFeatures,
}

impl std::fmt::Display for CollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionError::Json(e) => write!(f, "JSON parse error: {e}"),
            CollectionError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            CollectionError::MissingFeatures => {
                write!(f, "FeatureCollection has no features array")
            }
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Json(e) => Some(e),
            _ => None,
        }
    }
}

pub fn parse_point_collection_str(payload: &str) -> Result<IngestReport, CollectionError> {
    let value: Value = serde_json::from_str(payload).map_err(CollectionError::Json)?;
    parse_point_collection(&value)
}

/// Parses a GeoJSON `FeatureCollection` of `Point` features.
///
/// Each point's id is its index in the `features` array, including slots of
/// dropped features, so ids stay stable across partial exports.
pub fn parse_point_collection(value: &Value) -> Result<IngestReport, CollectionError> {
    let obj = value
        .as_object()
        .ok_or(CollectionError::NotAFeatureCollection)?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(CollectionError::NotAFeatureCollection)?;
    if ty != "FeatureCollection" {
        return Err(CollectionError::NotAFeatureCollection);
    }

    let features = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(CollectionError::MissingFeatures)?;

    let mut report = IngestReport {
        points: Vec::with_capacity(features.len()),
        dropped: Vec::new(),
    };
    for (index, feature) in features.iter().enumerate() {
        match parse_feature(index, feature) {
            Ok(point) => report.points.push(point),
            Err(reason) => report.dropped.push(DroppedFeature { index, reason }),
        }
    }
    Ok(report)
}

fn parse_feature(index: usize, value: &Value) -> Result<PredictionPoint, DropReason> {
    let obj = value.as_object().ok_or(DropReason::NotAnObject)?;
    let geometry = obj
        .get("geometry")
        .and_then(|v| v.as_object())
        .ok_or(DropReason::MissingGeometry)?;

    let ty = geometry.get("type").and_then(|v| v.as_str()).unwrap_or("");
    if ty != "Point" {
        return Err(DropReason::NotAPoint(ty.to_string()));
    }

    let coordinates = parse_coordinates(geometry.get("coordinates"))?;
    let properties = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .ok_or(DropReason::MissingProperties)?;

    let id = u32::try_from(index).map_err(|_| DropReason::IndexOutOfRange)?;
    Ok(PredictionPoint::new(
        PointId::new(id),
        coordinates,
        PredictionProperties::from_json(properties),
    ))
}

fn parse_coordinates(value: Option<&Value>) -> Result<LonLat, DropReason> {
    let arr = value
        .and_then(|v| v.as_array())
        .ok_or(DropReason::MalformedCoordinates)?;
    let [lon, lat] = arr.as_slice() else {
        return Err(DropReason::MalformedCoordinates);
    };
    let lon = lon.as_f64().ok_or(DropReason::MalformedCoordinates)?;
    let lat = lat.as_f64().ok_or(DropReason::MalformedCoordinates)?;
    let p = LonLat::new(lon, lat);
    if !p.is_finite() {
        return Err(DropReason::NonFiniteCoordinates);
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::{CollectionError, DropReason, parse_point_collection, parse_point_collection_str};
    use foundation::{LonLat, PointId};
    use serde_json::json;

    #[test]
    fn parses_fixture_collection() {
        let payload = include_str!("../../apps/viewer/assets/predictions.geojson");
        let report = parse_point_collection_str(payload).expect("parse collection");
        assert!(!report.points.is_empty());
        assert!(report.points.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn drops_bad_features_and_keeps_source_indices() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [-100.43, 30.97] },
                  "properties": { "varianceScore": 0.5 } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0] },
                  "properties": {} },
                { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                  "properties": {} },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [2.0, 3.0] } },
                "nonsense",
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [5.0, 6.0] },
                  "properties": {} }
            ]
        });
        let report = parse_point_collection(&value).expect("collection");
        let ids: Vec<PointId> = report.points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PointId(0), PointId(5)]);
        assert_eq!(report.points[0].coordinates, LonLat::new(-100.43, 30.97));

        let reasons: Vec<(usize, DropReason)> = report
            .dropped
            .iter()
            .map(|d| (d.index, d.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, DropReason::MalformedCoordinates),
                (2, DropReason::NotAPoint("LineString".to_string())),
                (3, DropReason::MissingProperties),
                (4, DropReason::NotAnObject),
            ]
        );
    }

    #[test]
    fn three_element_coordinates_are_malformed() {
        let value = json!({
            "type": "FeatureCollection",
            "features": [
                { "geometry": { "type": "Point", "coordinates": [1.0, 2.0, 3.0] }, "properties": {} },
                { "geometry": { "type": "Point", "coordinates": ["1", 2.0] }, "properties": {} }
            ]
        });
        let report = parse_point_collection(&value).expect("collection");
        assert!(report.points.is_empty());
        assert_eq!(report.dropped.len(), 2);
    }

    #[test]
    fn rejects_non_collections() {
        assert!(matches!(
            parse_point_collection(&json!({ "type": "Feature" })),
            Err(CollectionError::NotAFeatureCollection)
        ));
        assert!(matches!(
            parse_point_collection(&json!([1, 2, 3])),
            Err(CollectionError::NotAFeatureCollection)
        ));
        assert!(matches!(
            parse_point_collection(&json!({ "type": "FeatureCollection" })),
            Err(CollectionError::MissingFeatures)
        ));
        assert!(matches!(
            parse_point_collection_str("{ not json"),
            Err(CollectionError::Json(_))
        ));
    }
}
