//! Headless map surface: every marker set and viewport command becomes one
//! JSON object per line.

use std::io::Write;

use foundation::{GeoExtent, LonLat};
use layers::detail::SelectionDetail;
use layers::markers::{MapRenderer, MarkerDescriptor};
use scene::{ViewportCommand, ViewportSink};
use serde_json::{json, Value};
use tracing::error;

pub struct JsonLinesRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn emit(&mut self, value: &Value) {
        if let Err(err) = writeln!(self.out, "{value}") {
            error!("renderer output failed: {err}");
        }
    }
}

impl<W: Write> ViewportSink for JsonLinesRenderer<W> {
    fn apply_viewport(&mut self, command: &ViewportCommand) {
        let value = match *command {
            ViewportCommand::FitBounds {
                extent,
                padding_px,
                max_zoom,
            } => json!({
                "type": "fitBounds",
                "bounds": bounds_json(extent),
                "padding": padding_px,
                "maxZoom": max_zoom,
            }),
            ViewportCommand::SetView { center, zoom } => json!({
                "type": "setView",
                "center": lat_lng(center),
                "zoom": zoom,
            }),
        };
        self.emit(&value);
    }
}

impl<W: Write> MapRenderer for JsonLinesRenderer<W> {
    fn set_markers(&mut self, markers: &[MarkerDescriptor]) {
        for m in markers {
            self.emit(&json!({
                "type": "marker",
                "id": m.point.0,
                "position": lat_lng(m.position),
                "tone": m.tone.name(),
                "color": m.tone.color().hex(),
                "icon": {
                    "url": m.icon.url,
                    "size": m.icon.size_px,
                    "anchor": m.icon.anchor_px,
                    "popupAnchor": m.icon.popup_anchor_px,
                },
            }));
        }
    }
}

/// `[lat, lng]`, the order map widgets expect.
pub fn lat_lng(p: LonLat) -> Value {
    json!([p.lat_deg, p.lon_deg])
}

/// `[[south, west], [north, east]]`.
pub fn bounds_json(extent: GeoExtent) -> Value {
    json!([lat_lng(extent.south_west), lat_lng(extent.north_east)])
}

pub fn detail_json(detail: &SelectionDetail) -> Value {
    let gauges: Vec<Value> = detail
        .gauges
        .iter()
        .map(|g| {
            json!({
                "title": g.title,
                "metric": g.metric,
                "raw": g.raw,
                "score": g.score_text(),
                "percent": g.percent,
                "tone": g.tone.name(),
                "range": [g.best, g.worst],
            })
        })
        .collect();
    let tags: Vec<Value> = detail
        .tags
        .iter()
        .map(|t| json!({ "label": t.label, "tone": t.tone.name() }))
        .collect();
    let images: Vec<Value> = detail
        .visible_images()
        .map(|i| json!({ "slot": i.slot.name(), "path": i.path }))
        .collect();

    json!({
        "type": "detail",
        "id": detail.point.0,
        "position": lat_lng(detail.coordinates),
        "ready": detail.phase == scene::SelectionPhase::Ready,
        "location": detail.location_label,
        "landCover": detail.land_cover,
        "markerColor": detail.marker_tone.color().hex(),
        "gauges": gauges,
        "tags": tags,
        "images": images,
    })
}
