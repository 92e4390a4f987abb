use foundation::LonLat;
use serde::Deserialize;

/// The subset of a reverse-geocoding response used for location labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub principal_subdivision: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl GeocodeAddress {
    /// `"{city or locality}, {subdivision}, {country}"` with empty parts
    /// omitted; `None` when nothing usable is present.
    pub fn label(&self) -> Option<String> {
        let place = non_empty(&self.city).or_else(|| non_empty(&self.locality));
        let parts: Vec<&str> = [
            place,
            non_empty(&self.principal_subdivision),
            non_empty(&self.country_code),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Label shown when no geocoded label is available.
pub fn fallback_label(p: LonLat) -> String {
    format!("Lat: {:.4}, Lng: {:.4}", p.lat_deg, p.lon_deg)
}

/// Reverse-geocode lookup failure. Never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    Transport(String),
    Status(u16),
    Decode(String),
    TimedOut,
}

impl std::fmt::Display for EnrichmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichmentError::Transport(e) => write!(f, "geocode request failed: {e}"),
            EnrichmentError::Status(code) => write!(f, "geocode service returned {code}"),
            EnrichmentError::Decode(e) => write!(f, "geocode response unreadable: {e}"),
            EnrichmentError::TimedOut => write!(f, "geocode request timed out"),
        }
    }
}

impl std::error::Error for EnrichmentError {}
