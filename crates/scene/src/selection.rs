//! Selection / detail state machine.
//!
//! ```text
//! Idle --select--> Selecting --both images settled--> Ready
//!   ^                 |  ^                               |
//!   +----dismiss------+  +------------select-------------+
//! ```
//!
//! Every selection gets a fresh [`SelectionToken`]. Outgoing work (reverse
//! geocode, two image loads) is queued as [`SelectionCommand`]s carrying that
//! token, and completions come back as [`SelectionMessage`]s. A completion
//! whose token is not the current one is ignored, which is the only
//! concurrency discipline this module needs.

use std::time::Duration;

use formats::{
    CompanionImages, EnrichmentError, GeocodeAddress, ImageSlot, PredictionPoint, fallback_label,
};
use foundation::{LonLat, PointId, Time};
use runtime::{Debounce, Event, EventBus};
use tracing::{debug, trace};

/// Delay before the loading spinner may appear.
pub const SPINNER_DEBOUNCE: Duration = Duration::from_millis(50);

/// URL prefix companion images are served from.
pub const DEFAULT_IMAGE_PREFIX: &str = "/gcp-imgs";

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionToken(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Selecting,
    Ready,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ImageLoadFlags {
    pub primary: bool,
    pub secondary: bool,
}

impl ImageLoadFlags {
    pub fn get(&self, slot: ImageSlot) -> bool {
        match slot {
            ImageSlot::Primary => self.primary,
            ImageSlot::Secondary => self.secondary,
        }
    }

    fn set(&mut self, slot: ImageSlot) {
        match slot {
            ImageSlot::Primary => self.primary = true,
            ImageSlot::Secondary => self.secondary = true,
        }
    }

    pub fn all_settled(&self) -> bool {
        self.primary && self.secondary
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Pending,
    Loaded,
    /// The image failed to load; its slot is not shown.
    Hidden,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LocationSource {
    Pending,
    Geocoded,
    Fallback,
}

/// Everything known about the current selection.
///
/// Replaced wholesale on every `select`; never carried over between points.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub token: SelectionToken,
    pub point: PointId,
    pub coordinates: LonLat,
    pub location_label: String,
    pub location_source: LocationSource,
    pub images: CompanionImages,
    pub image_load_flags: ImageLoadFlags,
    pub spinner_visible: bool,
    slots: [SlotStatus; 2],
}

impl SelectionState {
    pub fn phase(&self) -> SelectionPhase {
        if self.image_load_flags.all_settled() {
            SelectionPhase::Ready
        } else {
            SelectionPhase::Selecting
        }
    }

    pub fn slot(&self, slot: ImageSlot) -> SlotStatus {
        self.slots[slot_index(slot)]
    }
}

fn slot_index(slot: ImageSlot) -> usize {
    match slot {
        ImageSlot::Primary => 0,
        ImageSlot::Secondary => 1,
    }
}

/// Work requested by the controller, executed by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionCommand {
    ReverseGeocode {
        token: SelectionToken,
        coordinates: LonLat,
    },
    LoadImage {
        token: SelectionToken,
        slot: ImageSlot,
        path: String,
    },
}

impl SelectionCommand {
    pub fn token(&self) -> SelectionToken {
        match self {
            SelectionCommand::ReverseGeocode { token, .. } => *token,
            SelectionCommand::LoadImage { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    Geocoded(Result<GeocodeAddress, EnrichmentError>),
    ImageSettled { slot: ImageSlot, loaded: bool },
}

/// Completion of a [`SelectionCommand`], tagged with the token it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMessage {
    pub token: SelectionToken,
    pub event: SelectionEvent,
}

impl SelectionMessage {
    pub fn geocoded(token: SelectionToken, result: Result<GeocodeAddress, EnrichmentError>) -> Self {
        Self {
            token,
            event: SelectionEvent::Geocoded(result),
        }
    }

    pub fn image(token: SelectionToken, slot: ImageSlot, loaded: bool) -> Self {
        Self {
            token,
            event: SelectionEvent::ImageSettled { slot, loaded },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delivery {
    Applied,
    /// The message belonged to a superseded or dismissed selection.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOptions {
    pub spinner_delay: Duration,
    pub image_prefix: String,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            spinner_delay: SPINNER_DEBOUNCE,
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct SelectionController {
    options: SelectionOptions,
    next_token: u64,
    state: Option<SelectionState>,
    spinner: Debounce,
    commands: EventBus<SelectionCommand>,
}

impl SelectionController {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            spinner: Debounce::new(options.spinner_delay),
            options,
            next_token: 0,
            state: None,
            commands: EventBus::new(),
        }
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn phase(&self) -> SelectionPhase {
        self.state
            .as_ref()
            .map_or(SelectionPhase::Idle, SelectionState::phase)
    }

    pub fn state(&self) -> Option<&SelectionState> {
        self.state.as_ref()
    }

    pub fn selected(&self) -> Option<PointId> {
        self.state.as_ref().map(|s| s.point)
    }

    pub fn current_token(&self) -> Option<SelectionToken> {
        self.state.as_ref().map(|s| s.token)
    }

    pub fn spinner_visible(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.spinner_visible)
    }

    /// Starts inspecting `point`, discarding any previous selection.
    ///
    /// Queues one reverse-geocode and two image-load commands and arms the
    /// spinner debounce.
    pub fn select(&mut self, point: &PredictionPoint, now: Time) -> SelectionToken {
        self.spinner.cancel();
        let retracted = self.commands.retract(|_| true);
        if retracted > 0 {
            trace!(retracted, "dropped undispatched commands of previous selection");
        }

        let token = SelectionToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);

        let images = CompanionImages::for_point(point, &self.options.image_prefix);
        self.commands.emit(
            now,
            SelectionCommand::ReverseGeocode {
                token,
                coordinates: point.coordinates,
            },
        );
        for slot in ImageSlot::ALL {
            self.commands.emit(
                now,
                SelectionCommand::LoadImage {
                    token,
                    slot,
                    path: images.path(slot).to_string(),
                },
            );
        }

        self.state = Some(SelectionState {
            token,
            point: point.id,
            coordinates: point.coordinates,
            location_label: fallback_label(point.coordinates),
            location_source: LocationSource::Pending,
            images,
            image_load_flags: ImageLoadFlags::default(),
            spinner_visible: false,
            slots: [SlotStatus::Pending; 2],
        });
        self.spinner.arm(now);

        debug!(point = %point.id, token = token.0, "selection started");
        token
    }

    /// Applies a completion if it belongs to the current selection.
    ///
    /// Due timers are fired first, so a completion that arrives after the
    /// spinner deadline still observes the spinner as shown.
    pub fn deliver(&mut self, msg: SelectionMessage, now: Time) -> Delivery {
        self.tick(now);

        let Some(state) = self.state.as_mut().filter(|s| s.token == msg.token) else {
            trace!(token = msg.token.0, "ignoring stale completion");
            return Delivery::Stale;
        };

        match msg.event {
            SelectionEvent::Geocoded(Ok(address)) => match address.label() {
                Some(label) => {
                    state.location_label = label;
                    state.location_source = LocationSource::Geocoded;
                }
                None => state.location_source = LocationSource::Fallback,
            },
            SelectionEvent::Geocoded(Err(err)) => {
                debug!(point = %state.point, "reverse geocode failed, using coordinates: {err}");
                state.location_source = LocationSource::Fallback;
            }
            SelectionEvent::ImageSettled { slot, loaded } => {
                let was_ready = state.image_load_flags.all_settled();
                state.image_load_flags.set(slot);
                state.slots[slot_index(slot)] = if loaded {
                    SlotStatus::Loaded
                } else {
                    SlotStatus::Hidden
                };

                if !was_ready && state.image_load_flags.all_settled() {
                    state.spinner_visible = false;
                    self.spinner.cancel();
                    debug!(point = %state.point, "selection ready");
                }
            }
        }
        Delivery::Applied
    }

    pub fn image_settled(
        &mut self,
        token: SelectionToken,
        slot: ImageSlot,
        loaded: bool,
        now: Time,
    ) -> Delivery {
        self.deliver(SelectionMessage::image(token, slot, loaded), now)
    }

    /// Closes the detail view. Returns the point that was selected, if any.
    pub fn dismiss(&mut self) -> Option<PointId> {
        self.spinner.cancel();
        self.commands.retract(|_| true);
        let point = self.state.take().map(|s| s.point);
        if let Some(id) = point {
            debug!(point = %id, "selection dismissed");
        }
        point
    }

    /// Fires the spinner debounce if due. Returns `true` if the spinner
    /// became visible.
    pub fn tick(&mut self, now: Time) -> bool {
        if self.spinner.poll(now).is_none() {
            return false;
        }
        match self.state.as_mut() {
            Some(state) if state.phase() == SelectionPhase::Selecting => {
                state.spinner_visible = true;
                debug!(point = %state.point, "loading spinner shown");
                true
            }
            _ => false,
        }
    }

    /// When [`tick`](Self::tick) next needs to run, if at all.
    pub fn next_deadline(&self) -> Option<Time> {
        self.spinner.deadline()
    }

    pub fn pending_commands(&self) -> &[Event<SelectionCommand>] {
        self.commands.events()
    }

    pub fn drain_commands(&mut self) -> Vec<Event<SelectionCommand>> {
        self.commands.drain()
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(SelectionOptions::default())
    }
}
