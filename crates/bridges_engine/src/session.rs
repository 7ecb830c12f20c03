use std::sync::Arc;

use bridges_logging::{bridges_debug, bridges_info};
use tokio::task::JoinHandle;

use crate::{
    BridgeCountryLookup, BridgeDistributionClient, BridgeLatencyProbe, BridgeProvisioning,
    CancellationGroup, CountrySearchCoordinator, DisplayState, EventChannels, EventObservers,
    ObfsBridge, RelayBridgeRequester, RelayDirectoryClient, SessionConfig, SessionError,
    TimeoutMeasurementCoordinator,
};

/// Network services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub latency_probe: Arc<dyn BridgeLatencyProbe>,
    pub country_lookup: Arc<dyn BridgeCountryLookup>,
    pub relay_directory: Arc<dyn RelayDirectoryClient>,
    pub distribution: Arc<dyn BridgeDistributionClient>,
}

/// Owner of all bridge background work for one settings screen.
///
/// Every task the session starts lives in a group nested under the
/// session's own, so [`BridgesSession::shutdown`] (or dropping the session)
/// stops all of them, including the long-lived result observers.
pub struct BridgesSession {
    name: String,
    group: CancellationGroup,
    channels: EventChannels,
    timeouts: TimeoutMeasurementCoordinator,
    countries: CountrySearchCoordinator,
    relays: RelayBridgeRequester,
    provisioning: BridgeProvisioning,
}

impl BridgesSession {
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Result<Self, SessionError> {
        let runtime = config.resolve_runtime()?;
        if let Some(settings) = &config.log {
            if !bridges_logging::initialize(settings) {
                bridges_debug!("{}: keeping the logger already installed", config.name);
            }
        }
        let name = config.name;
        let group = CancellationGroup::new();
        let channels = EventChannels::new();

        let timeouts = TimeoutMeasurementCoordinator::new(
            &name,
            collaborators.latency_probe,
            &channels,
            group.child_group(),
            runtime.clone(),
        );
        let countries = CountrySearchCoordinator::new(
            &name,
            collaborators.country_lookup,
            &channels,
            group.child_group(),
            runtime.clone(),
        );
        let relays = RelayBridgeRequester::new(
            collaborators.relay_directory,
            &channels,
            group.child_group(),
            runtime.clone(),
        );
        let provisioning = BridgeProvisioning::new(
            &name,
            collaborators.distribution,
            &channels,
            group.child_group(),
            runtime,
        );

        bridges_info!("{}: session started", name);
        Ok(Self {
            name,
            group,
            channels,
            timeouts,
            countries,
            relays,
            provisioning,
        })
    }

    pub fn observe(&self) -> EventObservers {
        self.channels.observers()
    }

    pub fn measure_timeouts(&mut self, bridges: &[ObfsBridge]) -> Option<JoinHandle<()>> {
        self.timeouts.measure_timeouts(bridges)
    }

    pub fn cancel_measuring_timeouts(&mut self) {
        self.timeouts.cancel_measuring_timeouts();
    }

    pub fn search_bridge_countries(&mut self, bridges: &[ObfsBridge]) -> Option<JoinHandle<()>> {
        self.countries.search_bridge_countries(bridges)
    }

    pub fn cancel_searching_bridge_countries(&mut self) {
        self.countries.cancel_searching_bridge_countries();
    }

    pub fn request_relay_bridges(&mut self, allow_ipv6: bool) -> JoinHandle<()> {
        self.relays.request_relay_bridges(allow_ipv6)
    }

    pub fn cancel_requesting_relay_bridges(&mut self) {
        self.relays.cancel_requesting_relay_bridges();
    }

    pub fn show_selector(&self) {
        self.provisioning.show_selector();
    }

    pub fn request_challenge(&self, transport: &str, ipv6: bool) -> Option<JoinHandle<()>> {
        self.provisioning.request_challenge(transport, ipv6)
    }

    pub fn submit(&self, captcha_text: &str) -> Option<JoinHandle<()>> {
        self.provisioning.submit(captcha_text)
    }

    pub fn dismiss(&self) {
        self.provisioning.dismiss();
    }

    pub fn cancel_request(&self) {
        self.provisioning.cancel_request();
    }

    pub fn display(&self) -> DisplayState {
        self.provisioning.display()
    }

    pub fn is_shut_down(&self) -> bool {
        self.group.is_cancelled()
    }

    /// Stops every task of the session; later calls start nothing.
    pub fn shutdown(&mut self) {
        if self.group.is_cancelled() {
            return;
        }
        self.timeouts.shutdown();
        self.countries.shutdown();
        self.relays.cancel_requesting_relay_bridges();
        self.provisioning.shutdown();
        self.group.cancel();
        bridges_info!("{}: session shut down", self.name);
    }
}

impl Drop for BridgesSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
