use std::sync::Arc;

use tokio::sync::watch;

use crate::{BridgeCountryData, BridgePingResult, DisplayState};

/// Publish side of everything a session reports.
///
/// Each channel keeps its last value, so a late subscriber starts from the
/// complete current state. Only the session's components hold the senders.
pub struct EventChannels {
    timeouts: Arc<watch::Sender<Vec<BridgePingResult>>>,
    countries: Arc<watch::Sender<Vec<BridgeCountryData>>>,
    display: Arc<watch::Sender<DisplayState>>,
    errors: Arc<watch::Sender<Option<String>>>,
    relay_bridges: Arc<watch::Sender<Vec<String>>>,
}

/// Read-only view on a session's [`EventChannels`].
#[derive(Debug, Clone)]
pub struct EventObservers {
    pub timeouts: watch::Receiver<Vec<BridgePingResult>>,
    pub countries: watch::Receiver<Vec<BridgeCountryData>>,
    pub display: watch::Receiver<DisplayState>,
    pub errors: watch::Receiver<Option<String>>,
    pub relay_bridges: watch::Receiver<Vec<String>>,
}

impl EventChannels {
    pub fn new() -> Self {
        Self {
            timeouts: Arc::new(watch::channel(Vec::new()).0),
            countries: Arc::new(watch::channel(Vec::new()).0),
            display: Arc::new(watch::channel(DisplayState::NoDisplay).0),
            errors: Arc::new(watch::channel(None).0),
            relay_bridges: Arc::new(watch::channel(Vec::new()).0),
        }
    }

    pub fn observers(&self) -> EventObservers {
        EventObservers {
            timeouts: self.timeouts.subscribe(),
            countries: self.countries.subscribe(),
            display: self.display.subscribe(),
            errors: self.errors.subscribe(),
            relay_bridges: self.relay_bridges.subscribe(),
        }
    }

    pub(crate) fn timeouts(&self) -> Arc<watch::Sender<Vec<BridgePingResult>>> {
        self.timeouts.clone()
    }

    pub(crate) fn countries(&self) -> Arc<watch::Sender<Vec<BridgeCountryData>>> {
        self.countries.clone()
    }

    pub(crate) fn display(&self) -> Arc<watch::Sender<DisplayState>> {
        self.display.clone()
    }

    pub(crate) fn errors(&self) -> Arc<watch::Sender<Option<String>>> {
        self.errors.clone()
    }

    pub(crate) fn relay_bridges(&self) -> Arc<watch::Sender<Vec<String>>> {
        self.relay_bridges.clone()
    }
}

impl Default for EventChannels {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes `next` unless it equals the state already shown.
pub(crate) fn publish_display(display: &watch::Sender<DisplayState>, next: &DisplayState) -> bool {
    display.send_if_modified(|current| {
        if current == next {
            return false;
        }
        *current = next.clone();
        true
    })
}
