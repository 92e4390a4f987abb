//! One map session: the loaded points plus the viewport and selection
//! controllers, wired to a renderer.

use foundation::{PointId, Time};
use runtime::Event;
use scene::{
    Delivery, FeatureIndex, SelectionCommand, SelectionController, SelectionMessage,
    SelectionToken, ViewportController,
};
use tracing::{debug, info};

use crate::detail::SelectionDetail;
use crate::markers::{IconFactory, MapRenderer, MarkerLayer, SvgIconFactory};

pub struct MapSession<F = SvgIconFactory> {
    index: FeatureIndex,
    markers: MarkerLayer<F>,
    viewport: ViewportController,
    selection: SelectionController,
}

impl<F: IconFactory> MapSession<F> {
    pub fn new(
        index: FeatureIndex,
        markers: MarkerLayer<F>,
        viewport: ViewportController,
        selection: SelectionController,
    ) -> Self {
        Self {
            index,
            markers,
            viewport,
            selection,
        }
    }

    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    pub fn markers(&self) -> &MarkerLayer<F> {
        &self.markers
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Sends the marker set and fits the view to the data extent.
    /// Returns the number of markers.
    pub fn publish(&mut self, renderer: &mut dyn MapRenderer) -> usize {
        let count = self.markers.publish(&self.index, renderer);
        self.viewport.fit_to_data(self.index.extent(), renderer);
        count
    }

    /// Swaps in a new point set and republishes. The selection survives
    /// only if its id still names an identical point.
    pub fn replace_data(&mut self, index: FeatureIndex, renderer: &mut dyn MapRenderer) -> usize {
        if let Some(id) = self.selection.selected()
            && self.index.get(id) != index.get(id)
        {
            self.selection.dismiss();
        }
        self.index = index;
        info!(points = self.index.len(), "point set replaced");
        self.publish(renderer)
    }

    /// Marker click: selects the point and focuses the view on it.
    /// Unknown ids are ignored.
    pub fn click(
        &mut self,
        id: PointId,
        now: Time,
        renderer: &mut dyn MapRenderer,
    ) -> Option<SelectionToken> {
        let Some(point) = self.index.get(id) else {
            debug!(point = %id, "click on unknown point ignored");
            return None;
        };
        let token = self.selection.select(point, now);
        self.viewport.focus_selection(point.coordinates, renderer);
        Some(token)
    }

    pub fn deliver(&mut self, msg: SelectionMessage, now: Time) -> Delivery {
        self.selection.deliver(msg, now)
    }

    pub fn tick(&mut self, now: Time) -> bool {
        self.selection.tick(now)
    }

    pub fn next_deadline(&self) -> Option<Time> {
        self.selection.next_deadline()
    }

    pub fn drain_commands(&mut self) -> Vec<Event<SelectionCommand>> {
        self.selection.drain_commands()
    }

    pub fn dismiss(&mut self) -> Option<PointId> {
        self.selection.dismiss()
    }

    pub fn detail(&self) -> Option<SelectionDetail> {
        let state = self.selection.state()?;
        SelectionDetail::build(state, &self.index, self.markers.classifier())
    }
}

#[cfg(test)]
mod tests {
    use super::MapSession;
    use crate::markers::{MapRenderer, MarkerDescriptor, MarkerLayer};
    use foundation::{LonLat, PointId, Time};
    use formats::{PredictionPoint, PredictionProperties};
    use scene::{
        FeatureIndex, SelectionController, SelectionPhase, ViewportCommand, ViewportController,
        ViewportOptions, ViewportSink,
    };

    #[derive(Default)]
    struct Recorder {
        markers: Vec<Vec<PointId>>,
        viewport: Vec<ViewportCommand>,
    }

    impl ViewportSink for Recorder {
        fn apply_viewport(&mut self, command: &ViewportCommand) {
            self.viewport.push(*command);
        }
    }

    impl MapRenderer for Recorder {
        fn set_markers(&mut self, markers: &[MarkerDescriptor]) {
            self.markers.push(markers.iter().map(|m| m.point).collect());
        }
    }

    fn points(lons: &[f64]) -> FeatureIndex {
        FeatureIndex::from_points(
            lons.iter()
                .enumerate()
                .map(|(i, lon)| {
                    PredictionPoint::new(
                        PointId(i as u32),
                        LonLat::new(*lon, 30.0 + i as f64 * 0.5),
                        PredictionProperties::default(),
                    )
                })
                .collect(),
        )
    }

    fn session(index: FeatureIndex) -> MapSession {
        MapSession::new(
            index,
            MarkerLayer::new(1),
            ViewportController::new(ViewportOptions::default()),
            SelectionController::default(),
        )
    }

    #[test]
    fn publish_fits_once() {
        let mut s = session(points(&[-101.0, -100.0, -99.0]));
        let mut r = Recorder::default();
        assert_eq!(s.publish(&mut r), 2);
        assert_eq!(s.publish(&mut r), 2);
        assert_eq!(r.markers, vec![vec![PointId(0), PointId(2)]; 2]);
        let fits = r
            .viewport
            .iter()
            .filter(|c| matches!(c, ViewportCommand::FitBounds { .. }))
            .count();
        assert_eq!(fits, 1);
    }

    #[test]
    fn click_selects_and_focuses() {
        let mut s = session(points(&[-101.0, -100.0]));
        let mut r = Recorder::default();
        let token = s.click(PointId(1), Time::ZERO, &mut r);
        assert!(token.is_some());
        assert_eq!(s.selection().phase(), SelectionPhase::Selecting);
        assert_eq!(
            r.viewport.last(),
            Some(&ViewportCommand::SetView {
                center: LonLat::new(-100.0, 28.5),
                zoom: 7.0,
            })
        );
        assert_eq!(s.drain_commands().len(), 3);
        assert_eq!(s.detail().map(|d| d.point), Some(PointId(1)));

        assert!(s.click(PointId(9), Time(5), &mut r).is_none());
        assert_eq!(s.selection().selected(), Some(PointId(1)));
    }

    #[test]
    fn replace_data_drops_vanished_selection() {
        let mut s = session(points(&[-101.0, -100.0, -99.0]));
        let mut r = Recorder::default();
        s.click(PointId(2), Time::ZERO, &mut r);
        s.replace_data(points(&[-90.0]), &mut r);
        assert_eq!(s.selection().phase(), SelectionPhase::Idle);
        assert!(s.detail().is_none());
        assert_eq!(r.markers.last(), Some(&vec![PointId(0)]));
    }

    #[test]
    fn replace_data_drops_selection_when_id_names_another_point() {
        let mut s = session(points(&[-100.0]));
        let mut r = Recorder::default();
        s.click(PointId(0), Time::ZERO, &mut r);

        let moved = FeatureIndex::from_points(vec![PredictionPoint::new(
            PointId(0),
            LonLat::new(10.0, 50.0),
            PredictionProperties {
                variance_score: Some(0.2),
                ..Default::default()
            },
        )]);
        s.replace_data(moved, &mut r);
        assert_eq!(s.selection().phase(), SelectionPhase::Idle);
        assert!(s.detail().is_none());
    }

    #[test]
    fn replace_data_keeps_selection_of_identical_point() {
        let mut s = session(points(&[-101.0, -100.0]));
        let mut r = Recorder::default();
        s.click(PointId(1), Time::ZERO, &mut r);
        s.replace_data(points(&[-101.0, -100.0, -99.0]), &mut r);
        assert_eq!(s.selection().selected(), Some(PointId(1)));
        assert_eq!(s.detail().map(|d| d.coordinates), Some(LonLat::new(-100.0, 30.5)));
    }
}
