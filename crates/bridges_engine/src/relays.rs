use std::sync::Arc;

use bridges_logging::{bridges_debug, bridges_error, bridges_info};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cancel::guarded;
use crate::{CancellationGroup, EventChannels, RelayDescriptor, RelayDirectoryClient, TaskOutcome};

/// Formats a relay as a vanilla bridge line, bracketing IPv6 literals.
pub fn format_relay_line(relay: &RelayDescriptor) -> String {
    if relay.address.contains(':') {
        format!("[{}]:{} {}", relay.address, relay.port, relay.fingerprint)
    } else {
        format!("{}:{} {}", relay.address, relay.port, relay.fingerprint)
    }
}

/// One-shot request of relays usable as vanilla bridges.
pub struct RelayBridgeRequester {
    client: Arc<dyn RelayDirectoryClient>,
    session: CancellationGroup,
    request: Option<CancellationGroup>,
    relay_bridges: Arc<watch::Sender<Vec<String>>>,
    errors: Arc<watch::Sender<Option<String>>>,
    runtime: Handle,
}

impl RelayBridgeRequester {
    pub fn new(
        client: Arc<dyn RelayDirectoryClient>,
        channels: &EventChannels,
        session: CancellationGroup,
        runtime: Handle,
    ) -> Self {
        Self {
            client,
            session,
            request: None,
            relay_bridges: channels.relay_bridges(),
            errors: channels.errors(),
            runtime,
        }
    }

    /// Replaces any running request with a new one.
    ///
    /// Lines are published only when the whole request succeeds.
    pub fn request_relay_bridges(&mut self, allow_ipv6: bool) -> JoinHandle<()> {
        self.cancel_requesting_relay_bridges();
        let group = self.session.child_group();
        let token = group.scope_token();
        self.request = Some(group);

        let client = self.client.clone();
        let relay_bridges = self.relay_bridges.clone();
        let errors = self.errors.clone();
        self.runtime.spawn(async move {
            match guarded(&token, client.fetch_relays(allow_ipv6)).await {
                TaskOutcome::Completed(relays) => {
                    let lines: Vec<String> = relays.iter().map(format_relay_line).collect();
                    bridges_info!("Received {} relay bridges", lines.len());
                    relay_bridges.send_replace(lines);
                }
                TaskOutcome::Cancelled => bridges_debug!("Relay bridges request cancelled"),
                TaskOutcome::Failed(err) => {
                    if let Some(message) = err.message() {
                        errors.send_replace(Some(message.to_string()));
                    }
                    bridges_error!("Relay bridges request failed: {}", err);
                }
            }
        })
    }

    pub fn cancel_requesting_relay_bridges(&mut self) {
        if let Some(request) = self.request.take() {
            request.cancel();
        }
    }
}
