//! Runs selection commands against the real collaborators and feeds the
//! completions back into the session until the selection settles.

use std::path::PathBuf;
use std::time::Duration;

use foundation::{PointId, Time};
use layers::detail::SelectionDetail;
use layers::markers::MapRenderer;
use layers::session::MapSession;
use reqwest::Client;
use runtime::{Clock, SessionClock};
use scene::{Delivery, LocationSource, SelectionCommand, SelectionMessage, SelectionPhase};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::assets::probe_image;
use crate::config::ViewerConfig;
use crate::geocode::reverse_geocode;

/// Handles to the outside world needed to execute selection commands.
#[derive(Clone)]
pub struct Collaborators {
    pub http: Client,
    pub geocode_url: String,
    pub geocode_timeout: Duration,
    pub assets_root: PathBuf,
    pub image_prefix: String,
}

impl Collaborators {
    pub fn from_config(config: &ViewerConfig, http: Client) -> Self {
        Self {
            http,
            geocode_url: config.geocode_url.clone(),
            geocode_timeout: config.geocode_timeout,
            assets_root: config.assets_root.clone(),
            image_prefix: config.image_prefix.clone(),
        }
    }

    fn dispatch(&self, command: SelectionCommand, tx: mpsc::Sender<SelectionMessage>) {
        let this = self.clone();
        match command {
            SelectionCommand::ReverseGeocode { token, coordinates } => {
                tokio::spawn(async move {
                    let result = reverse_geocode(
                        &this.http,
                        &this.geocode_url,
                        coordinates,
                        this.geocode_timeout,
                    )
                    .await;
                    let _ = tx.send(SelectionMessage::geocoded(token, result)).await;
                });
            }
            SelectionCommand::LoadImage { token, slot, path } => {
                tokio::spawn(async move {
                    let loaded = probe_image(&this.assets_root, &this.image_prefix, &path).await;
                    let _ = tx.send(SelectionMessage::image(token, slot, loaded)).await;
                });
            }
        }
    }
}

/// Selects `point` and drives it to completion: both images settled and the
/// location resolved. Returns `None` for an unknown point.
pub async fn inspect(
    session: &mut MapSession,
    point: PointId,
    clock: &SessionClock,
    collaborators: &Collaborators,
    renderer: &mut dyn MapRenderer,
) -> Option<SelectionDetail> {
    session.click(point, clock.now(), renderer)?;

    let (tx, mut rx) = mpsc::channel(8);
    for event in session.drain_commands() {
        collaborators.dispatch(event.payload, tx.clone());
    }
    drop(tx);

    while !settled(session) {
        let deadline = session.next_deadline();
        tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                if session.deliver(msg, clock.now()) == Delivery::Stale {
                    debug!("stale completion dropped");
                }
            }
            _ = sleep_until(clock, deadline) => {
                if session.tick(clock.now()) {
                    info!("still loading");
                }
            }
        }
    }

    session.detail()
}

fn settled(session: &MapSession) -> bool {
    session.selection().state().is_some_and(|s| {
        s.phase() == SelectionPhase::Ready && s.location_source != LocationSource::Pending
    })
}

async fn sleep_until(clock: &SessionClock, deadline: Option<Time>) {
    match deadline {
        Some(t) => tokio::time::sleep_until(clock.instant_at(t).into()).await,
        None => std::future::pending().await,
    }
}
