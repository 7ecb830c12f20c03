use std::sync::Arc;

use bridges_logging::{bridges_debug, bridges_info, bridges_warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::{
    BridgeCountryData, BridgeCountryLookup, CancellationGroup, EventChannels, ObfsBridge,
    ResultAccumulator,
};

/// Country lookup of a bridge set; every result is kept.
pub struct CountrySearchCoordinator {
    lookup: Arc<dyn BridgeCountryLookup>,
    countries: ResultAccumulator<BridgeCountryData>,
}

impl CountrySearchCoordinator {
    pub fn new(
        name: &str,
        lookup: Arc<dyn BridgeCountryLookup>,
        channels: &EventChannels,
        group: CancellationGroup,
        runtime: Handle,
    ) -> Self {
        let countries = ResultAccumulator::new(
            format!("{name}/countries"),
            ResultAccumulator::accept_all(),
            channels.countries(),
            group,
            runtime,
        );
        Self { lookup, countries }
    }

    /// Restarts the search; an empty set leaves a running search untouched.
    pub fn search_bridge_countries(&mut self, bridges: &[ObfsBridge]) -> Option<JoinHandle<()>> {
        if bridges.is_empty() {
            bridges_debug!("Country search skipped, no bridges");
            return None;
        }
        if self.countries.is_closed() {
            bridges_warn!("Country search requested after teardown");
            return None;
        }
        bridges_info!("Searching countries of {} bridges", bridges.len());
        let run = self.lookup.lookup(bridges.to_vec());
        self.countries.start(run)
    }

    pub fn cancel_searching_bridge_countries(&mut self) {
        self.countries.cancel_children();
    }

    pub fn is_observing(&self) -> bool {
        self.countries.is_observing()
    }

    pub(crate) fn shutdown(&mut self) {
        self.countries.cancel_full();
    }
}
