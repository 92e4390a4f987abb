use foundation::{LonLat, PointId};
use serde_json::{Map, Value};

/// Property names accepted for each field, canonical name first.
///
/// The second spelling is what the model export pipeline writes.
pub const VARIANCE_KEYS: &[&str] = &["varianceScore", "Variance_pred_scaled"];
pub const SIMILARITY_KEYS: &[&str] = &["similarityScore", "ncdd_embeddings"];
pub const LAND_COVER_KEYS: &[&str] = &["landCoverClass", "glc_cl_smj"];
pub const ASSET_KEYS: &[&str] = &["assetKey", "filename"];

/// Validated per-point properties.
///
/// Every field is optional: a missing or non-numeric metric is carried as
/// `None` and classified as unknown downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionProperties {
    pub variance_score: Option<f64>,
    pub similarity_score: Option<f64>,
    pub land_cover_class: Option<i64>,
    pub asset_key: Option<String>,
}

impl PredictionProperties {
    /// Single coercion pass over a raw properties object.
    pub fn from_json(map: &Map<String, Value>) -> Self {
        Self {
            variance_score: lookup(map, VARIANCE_KEYS).and_then(coerce_metric),
            similarity_score: lookup(map, SIMILARITY_KEYS).and_then(coerce_metric),
            land_cover_class: lookup(map, LAND_COVER_KEYS).and_then(coerce_class),
            asset_key: lookup(map, ASSET_KEYS).and_then(coerce_key),
        }
    }
}

/// One geo-located prediction record. Coordinates are always finite.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPoint {
    pub id: PointId,
    pub coordinates: LonLat,
    pub properties: PredictionProperties,
}

impl PredictionPoint {
    pub fn new(id: PointId, coordinates: LonLat, properties: PredictionProperties) -> Self {
        Self {
            id,
            coordinates,
            properties,
        }
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

fn coerce_metric(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn coerce_class(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            // i64 spans [-2^63, 2^63); both bounds are exact in f64.
            let in_range = (-I64_BOUND..I64_BOUND).contains(&f);
            (in_range && f.fract() == 0.0).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_key(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}
