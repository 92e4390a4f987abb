use foundation::math::{TILE_SIZE_PX, unproject};
use foundation::{GeoExtent, LonLat};
use tracing::debug;

/// Camera command handed to the map renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportCommand {
    FitBounds {
        extent: GeoExtent,
        padding_px: u32,
        max_zoom: f64,
    },
    SetView {
        center: LonLat,
        zoom: f64,
    },
}

/// Renderer surface that receives viewport commands.
pub trait ViewportSink {
    fn apply_viewport(&mut self, command: &ViewportCommand);
}

impl ViewportSink for Vec<ViewportCommand> {
    fn apply_viewport(&mut self, command: &ViewportCommand) {
        self.push(*command);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LonLat,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: LonLat, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub padding_px: u32,
    pub max_zoom: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding_px: 32,
            max_zoom: 10.0,
        }
    }
}

impl FitOptions {
    /// Replaces a non-finite `max_zoom` with the default.
    pub fn sanitized(self) -> Self {
        if self.max_zoom.is_finite() {
            self
        } else {
            Self {
                max_zoom: Self::default().max_zoom,
                ..self
            }
        }
    }
}

/// Clamps `zoom` to `[min, max]`. Non-finite limits are ignored.
fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    let hi = if max.is_finite() { max } else { f64::MAX };
    let lo = if min.is_finite() { min.min(hi) } else { f64::MIN };
    zoom.clamp(lo, hi)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    pub size_px: [u32; 2],
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub fit: FitOptions,
    pub focus_zoom: f64,
    /// Latitude shift applied when focusing a selection, so the point sits
    /// above the detail panel rather than under it.
    pub focus_lat_offset_deg: f64,
    pub initial: Viewport,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            size_px: [1280, 720],
            min_zoom: 2.0,
            max_zoom: 19.0,
            fit: FitOptions::default(),
            focus_zoom: 7.0,
            focus_lat_offset_deg: -2.0,
            initial: Viewport::new(LonLat::new(-98.5795, 39.8283), 5.0),
        }
    }
}

/// Viewport that results from fitting `extent` into a `size_px` canvas.
///
/// Zoom snaps down to an integer level so the padded extent fits entirely,
/// then clamps to `[min_zoom, fit.max_zoom]`. A zero-area extent goes
/// straight to `fit.max_zoom`.
pub fn fit_viewport(extent: GeoExtent, size_px: [u32; 2], fit: FitOptions, min_zoom: f64) -> Viewport {
    let fit = fit.sanitized();
    let (nw, se) = extent.projected();
    let pad = 2.0 * f64::from(fit.padding_px);
    let avail_w = (f64::from(size_px[0]) - pad).max(1.0);
    let avail_h = (f64::from(size_px[1]) - pad).max(1.0);

    let dx = (se.x - nw.x).abs();
    let dy = (se.y - nw.y).abs();
    let zoom_for = |span: f64, avail: f64| {
        if span > 0.0 {
            (avail / (span * TILE_SIZE_PX)).log2()
        } else {
            f64::INFINITY
        }
    };
    let raw = zoom_for(dx, avail_w).min(zoom_for(dy, avail_h));
    let zoom = if raw.is_finite() { raw.floor() } else { fit.max_zoom };

    Viewport::new(
        unproject(nw.midpoint(se)),
        clamp_zoom(zoom, min_zoom, fit.max_zoom),
    )
}

/// Tracks the resulting viewport and issues fit/focus commands.
#[derive(Debug, Clone)]
pub struct ViewportController {
    options: ViewportOptions,
    current: Viewport,
    fitted: Option<GeoExtent>,
}

impl ViewportController {
    pub fn new(options: ViewportOptions) -> Self {
        Self {
            current: options.initial,
            options,
            fitted: None,
        }
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    /// Fits the view to `extent`.
    ///
    /// Returns `false` without issuing anything when the view already shows
    /// the result of fitting this same extent.
    pub fn fit_to<S>(&mut self, extent: GeoExtent, fit: FitOptions, sink: &mut S) -> bool
    where
        S: ViewportSink + ?Sized,
    {
        let fit = fit.sanitized();
        let target = fit_viewport(extent, self.options.size_px, fit, self.options.min_zoom);
        if self.fitted == Some(extent) && self.current == target {
            debug!("viewport already fitted to extent");
            return false;
        }

        sink.apply_viewport(&ViewportCommand::FitBounds {
            extent,
            padding_px: fit.padding_px,
            max_zoom: fit.max_zoom,
        });
        debug!(zoom = target.zoom, "viewport fitted");
        self.current = target;
        self.fitted = Some(extent);
        true
    }

    /// Fits to the active point set using the configured fit options.
    /// An empty set (no extent) leaves the view alone.
    pub fn fit_to_data<S>(&mut self, extent: Option<GeoExtent>, sink: &mut S) -> bool
    where
        S: ViewportSink + ?Sized,
    {
        match extent {
            Some(extent) => self.fit_to(extent, self.options.fit, sink),
            None => false,
        }
    }

    /// Centers the view on `coordinate` at `zoom`.
    pub fn focus_on<S>(&mut self, coordinate: LonLat, zoom: f64, sink: &mut S)
    where
        S: ViewportSink + ?Sized,
    {
        let zoom = if zoom.is_finite() {
            zoom
        } else {
            self.options.focus_zoom
        };
        let zoom = clamp_zoom(zoom, self.options.min_zoom, self.options.max_zoom);
        let view = Viewport::new(coordinate, zoom);
        sink.apply_viewport(&ViewportCommand::SetView {
            center: view.center,
            zoom: view.zoom,
        });
        self.current = view;
    }

    /// Focus used on marker selection: configured zoom and latitude offset.
    pub fn focus_selection<S>(&mut self, coordinate: LonLat, sink: &mut S)
    where
        S: ViewportSink + ?Sized,
    {
        let shifted = LonLat::new(
            coordinate.lon_deg,
            coordinate.lat_deg + self.options.focus_lat_offset_deg,
        );
        self.focus_on(shifted, self.options.focus_zoom, sink);
    }

    /// Updates the canvas size. The next fit is always re-issued.
    pub fn resize(&mut self, size_px: [u32; 2]) {
        self.options.size_px = size_px;
        self.fitted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{FitOptions, ViewportCommand, ViewportController, ViewportOptions, fit_viewport};
    use foundation::{GeoExtent, LonLat};

    fn texas() -> GeoExtent {
        GeoExtent::from_points([
            LonLat::new(-101.123_39, 30.709_07),
            LonLat::new(-98.7, 34.657_56),
        ])
        .expect("extent")
    }

    #[test]
    fn fit_zoom_is_integer_and_within_limits() {
        let v = fit_viewport(texas(), [1280, 720], FitOptions::default(), 2.0);
        assert_eq!(v.zoom, v.zoom.floor());
        assert!(v.zoom >= 2.0 && v.zoom <= 10.0);
        assert!(texas().contains(v.center));
    }

    #[test]
    fn zero_area_extent_uses_max_zoom() {
        let e = GeoExtent::from_point(LonLat::new(-100.43, 30.97));
        let v = fit_viewport(e, [800, 600], FitOptions { padding_px: 32, max_zoom: 10.0 }, 2.0);
        assert_eq!(v.zoom, 10.0);
        assert!((v.center.lon_deg + 100.43).abs() < 1e-9);
        assert!((v.center.lat_deg - 30.97).abs() < 1e-9);
    }

    #[test]
    fn whole_world_clamps_to_min_zoom() {
        let e = GeoExtent::from_points([LonLat::new(-180.0, -80.0), LonLat::new(180.0, 80.0)])
            .expect("extent");
        let v = fit_viewport(e, [300, 300], FitOptions::default(), 2.0);
        assert_eq!(v.zoom, 2.0);
    }

    #[test]
    fn refit_same_extent_is_noop() {
        let mut ctl = ViewportController::new(ViewportOptions::default());
        let mut sink: Vec<ViewportCommand> = Vec::new();
        assert!(ctl.fit_to(texas(), FitOptions::default(), &mut sink));
        let fitted = ctl.current();
        assert!(!ctl.fit_to(texas(), FitOptions::default(), &mut sink));
        assert_eq!(sink.len(), 1);
        assert_eq!(ctl.current(), fitted);
    }

    #[test]
    fn refit_after_focus_restores_same_view() {
        let mut ctl = ViewportController::new(ViewportOptions::default());
        let mut sink: Vec<ViewportCommand> = Vec::new();
        ctl.fit_to_data(Some(texas()), &mut sink);
        let fitted = ctl.current();
        ctl.focus_selection(LonLat::new(-100.0, 31.0), &mut sink);
        assert_ne!(ctl.current(), fitted);
        assert!(ctl.fit_to_data(Some(texas()), &mut sink));
        assert_eq!(ctl.current(), fitted);
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn empty_data_issues_nothing() {
        let mut ctl = ViewportController::new(ViewportOptions::default());
        let mut sink: Vec<ViewportCommand> = Vec::new();
        assert!(!ctl.fit_to_data(None, &mut sink));
        assert!(sink.is_empty());
    }

    #[test]
    fn focus_selection_applies_offset_and_zoom() {
        let mut ctl = ViewportController::new(ViewportOptions::default());
        let mut sink: Vec<ViewportCommand> = Vec::new();
        ctl.focus_selection(LonLat::new(-100.43, 30.97), &mut sink);
        assert_eq!(
            sink,
            vec![ViewportCommand::SetView {
                center: LonLat::new(-100.43, 28.97),
                zoom: 7.0
            }]
        );
    }

    #[test]
    fn resize_forces_refit() {
        let mut ctl = ViewportController::new(ViewportOptions::default());
        let mut sink: Vec<ViewportCommand> = Vec::new();
        ctl.fit_to_data(Some(texas()), &mut sink);
        ctl.resize([400, 300]);
        assert!(ctl.fit_to_data(Some(texas()), &mut sink));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn non_finite_max_zoom_falls_back_to_default() {
        let bad = FitOptions {
            padding_px: 32,
            max_zoom: f64::NAN,
        };
        let point = GeoExtent::from_point(LonLat::new(-100.43, 30.97));
        assert_eq!(fit_viewport(point, [1280, 720], bad, 2.0).zoom, 10.0);
        let v = fit_viewport(texas(), [1280, 720], bad, 2.0);
        assert_eq!(v, fit_viewport(texas(), [1280, 720], FitOptions::default(), 2.0));

        let mut ctl = ViewportController::new(ViewportOptions::default());
        let mut sink: Vec<ViewportCommand> = Vec::new();
        assert!(ctl.fit_to(texas(), bad, &mut sink));
        assert!(matches!(
            sink[0],
            ViewportCommand::FitBounds { max_zoom, .. } if max_zoom == 10.0
        ));
    }

    #[test]
    fn focus_tolerates_non_finite_limits() {
        let mut ctl = ViewportController::new(ViewportOptions {
            max_zoom: f64::INFINITY,
            min_zoom: f64::NAN,
            ..ViewportOptions::default()
        });
        let mut sink: Vec<ViewportCommand> = Vec::new();
        ctl.focus_on(LonLat::new(-100.0, 30.0), f64::NAN, &mut sink);
        assert_eq!(ctl.current().zoom, 7.0);
        ctl.focus_on(LonLat::new(-100.0, 30.0), 25.0, &mut sink);
        assert_eq!(ctl.current().zoom, 25.0);
    }
}
