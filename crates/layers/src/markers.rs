use base64::Engine as _;
use foundation::{LonLat, PointId};
use scene::{FeatureIndex, ViewportSink};
use tracing::debug;

use crate::layer::{Layer, LayerId};
use crate::reliability::ReliabilityClassifier;
use crate::symbology::{MarkerStyle, Tone};

/// Every second point gets a marker by default.
pub const DEFAULT_MARKER_STRIDE: usize = 2;

/// Ready-to-render icon: an image URL plus Leaflet-style pixel geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    pub url: String,
    pub size_px: [u32; 2],
    pub anchor_px: [i32; 2],
    pub popup_anchor_px: [i32; 2],
}

/// Produces the icon for a tone. Injected so tests and renderers can swap
/// the artwork.
pub trait IconFactory {
    fn icon(&self, tone: Tone) -> MarkerIcon;
}

/// Warning-triangle SVG icons, encoded once per tone as data URIs.
#[derive(Debug, Clone)]
pub struct SvgIconFactory {
    icons: [MarkerIcon; 4],
}

impl SvgIconFactory {
    pub fn new(style: MarkerStyle) -> Self {
        Self {
            icons: Tone::ALL.map(|tone| MarkerIcon {
                url: svg_data_uri(&triangle_svg(tone, &style)),
                size_px: style.size_px,
                anchor_px: style.anchor_px,
                popup_anchor_px: style.popup_anchor_px,
            }),
        }
    }
}

impl Default for SvgIconFactory {
    fn default() -> Self {
        Self::new(MarkerStyle::default())
    }
}

impl IconFactory for SvgIconFactory {
    fn icon(&self, tone: Tone) -> MarkerIcon {
        self.icons[tone.index()].clone()
    }
}

fn triangle_svg(tone: Tone, style: &MarkerStyle) -> String {
    let [w, h] = style.size_px;
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 24 24">"#,
            r#"<path d="M1 21h22L12 2 1 21z" fill="{fill}" stroke="{stroke}" stroke-width="{sw}"/>"#,
            r#"<path d="M13 18h-2v-2h2v2zm0-4h-2v-4h2v4z" fill="{stroke}"/>"#,
            "</svg>"
        ),
        w = w,
        h = h,
        fill = tone.color().hex(),
        stroke = style.stroke.hex(),
        sw = style.stroke_width,
    )
}

pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg.as_bytes())
    )
}

/// One marker as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDescriptor {
    pub point: PointId,
    pub position: LonLat,
    pub tone: Tone,
    pub icon: MarkerIcon,
}

/// The map surface: receives the marker set and viewport commands.
pub trait MapRenderer: ViewportSink {
    /// Replaces the displayed markers.
    fn set_markers(&mut self, markers: &[MarkerDescriptor]);
}

/// Turns the feature index into styled, subsampled markers.
#[derive(Debug, Clone)]
pub struct MarkerLayer<F = SvgIconFactory> {
    id: LayerId,
    stride: usize,
    classifier: ReliabilityClassifier,
    icons: F,
}

impl MarkerLayer<SvgIconFactory> {
    pub fn new(id: u64) -> Self {
        Self::with_icons(id, SvgIconFactory::default())
    }
}

impl<F: IconFactory> MarkerLayer<F> {
    pub fn with_icons(id: u64, icons: F) -> Self {
        Self {
            id: LayerId(id),
            stride: DEFAULT_MARKER_STRIDE,
            classifier: ReliabilityClassifier::default(),
            icons,
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_classifier(mut self, classifier: ReliabilityClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn classifier(&self) -> &ReliabilityClassifier {
        &self.classifier
    }

    /// Markers for every `stride`-th point, in index order.
    pub fn extract(&self, index: &FeatureIndex) -> Vec<MarkerDescriptor> {
        index
            .subsample(self.stride)
            .into_iter()
            .map(|p| {
                let props = &p.properties;
                let tone = self
                    .classifier
                    .marker_tone(props.variance_score, props.similarity_score);
                MarkerDescriptor {
                    point: p.id,
                    position: p.coordinates,
                    tone,
                    icon: self.icons.icon(tone),
                }
            })
            .collect()
    }

    /// Extracts and hands the marker set to `renderer`.
    pub fn publish(&self, index: &FeatureIndex, renderer: &mut dyn MapRenderer) -> usize {
        let markers = self.extract(index);
        renderer.set_markers(&markers);
        debug!(
            layer = self.name(),
            id = self.id.0,
            markers = markers.len(),
            points = index.len(),
            "markers published"
        );
        markers.len()
    }
}

impl<F> Layer for MarkerLayer<F> {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "reliability-markers"
    }
}
