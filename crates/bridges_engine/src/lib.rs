//! Bridges engine: background bridge acquisition and task orchestration.
mod accumulator;
mod cancel;
mod channels;
mod collaborators;
mod config;
mod countries;
mod error;
mod provisioning;
mod relays;
mod session;
mod timeouts;
mod types;

pub use accumulator::{ItemFilter, ResultAccumulator};
pub use cancel::CancellationGroup;
pub use channels::{EventChannels, EventObservers};
pub use collaborators::{
    BridgeCountryLookup, BridgeDistributionClient, BridgeLatencyProbe, RelayDirectoryClient,
};
pub use config::SessionConfig;
pub use countries::CountrySearchCoordinator;
pub use error::{ServiceError, SessionError, TaskOutcome};
pub use provisioning::BridgeProvisioning;
pub use relays::{format_relay_line, RelayBridgeRequester};
pub use session::{BridgesSession, Collaborators};
pub use timeouts::TimeoutMeasurementCoordinator;
pub use types::{BridgeCountryData, BridgePingResult, ObfsBridge, RelayDescriptor};

pub use bridges_core::{CaptchaImage, DisplayState, ParseBridgesResult};
pub use bridges_logging::{LevelFilter, LogDestination, LogSettings};
