use crate::prediction::PredictionPoint;

/// File-name suffix of the predicted class mask image.
pub const PRIMARY_SUFFIX: &str = "_predicted_mask.png";
/// File-name suffix of the class probability image.
pub const SECONDARY_SUFFIX: &str = "_probabilities.png";

/// Suffixes stripped from an asset key before deriving companion names.
/// Includes the misspelled variant found in older exports.
const KNOWN_SUFFIXES: &[&str] = &[
    PRIMARY_SUFFIX,
    SECONDARY_SUFFIX,
    "_probabilites.png",
    ".png",
];

/// One of the two companion images shown for a selected point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Primary,
    Secondary,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 2] = [ImageSlot::Primary, ImageSlot::Secondary];

    pub fn name(self) -> &'static str {
        match self {
            ImageSlot::Primary => "predicted",
            ImageSlot::Secondary => "probabilities",
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            ImageSlot::Primary => PRIMARY_SUFFIX,
            ImageSlot::Secondary => SECONDARY_SUFFIX,
        }
    }
}

/// Formats `v` with `decimals` places, rounding halves toward +infinity so
/// negative longitudes match the exporter's file names.
pub fn round_fixed(v: f64, decimals: u32) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (v * scale + 0.5).floor() / scale;
    format!("{rounded:.prec$}", prec = decimals as usize)
}

/// Key both companion file names are built from.
///
/// Uses the point's asset key with any image suffix stripped, or
/// `{lon}_{lat}` at four decimals when the point has no asset key.
pub fn derived_key(point: &PredictionPoint) -> String {
    if let Some(key) = point.properties.asset_key.as_deref() {
        let stem = KNOWN_SUFFIXES
            .iter()
            .find_map(|s| key.strip_suffix(s))
            .unwrap_or(key);
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    let c = point.coordinates;
    format!("{}_{}", round_fixed(c.lon_deg, 4), round_fixed(c.lat_deg, 4))
}

/// Resolved locations of a point's two companion images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionImages {
    pub primary: String,
    pub secondary: String,
}

impl CompanionImages {
    /// Paths under `prefix` (e.g. `/gcp-imgs`); a trailing slash is ignored.
    pub fn for_point(point: &PredictionPoint, prefix: &str) -> Self {
        let key = derived_key(point);
        let prefix = prefix.trim_end_matches('/');
        Self {
            primary: format!("{prefix}/{key}{PRIMARY_SUFFIX}"),
            secondary: format!("{prefix}/{key}{SECONDARY_SUFFIX}"),
        }
    }

    pub fn path(&self, slot: ImageSlot) -> &str {
        match slot {
            ImageSlot::Primary => &self.primary,
            ImageSlot::Secondary => &self.secondary,
        }
    }
}
