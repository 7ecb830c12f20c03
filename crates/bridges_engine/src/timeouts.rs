use std::sync::Arc;

use bridges_logging::{bridges_info, bridges_warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::{
    BridgeLatencyProbe, BridgePingResult, CancellationGroup, EventChannels, ItemFilter,
    ObfsBridge, ResultAccumulator,
};

/// Latency probing of a bridge set with a restartable measurement run.
pub struct TimeoutMeasurementCoordinator {
    probe: Arc<dyn BridgeLatencyProbe>,
    timeouts: ResultAccumulator<BridgePingResult>,
}

impl TimeoutMeasurementCoordinator {
    pub fn new(
        name: &str,
        probe: Arc<dyn BridgeLatencyProbe>,
        channels: &EventChannels,
        group: CancellationGroup,
        runtime: Handle,
    ) -> Self {
        let filter: ItemFilter<BridgePingResult> = Arc::new(BridgePingResult::is_reportable);
        let timeouts = ResultAccumulator::new(
            format!("{name}/timeouts"),
            filter,
            channels.timeouts(),
            group,
            runtime,
        );
        Self { probe, timeouts }
    }

    /// Restarts measurement for `bridges`, dropping results of any earlier run.
    pub fn measure_timeouts(&mut self, bridges: &[ObfsBridge]) -> Option<JoinHandle<()>> {
        if self.timeouts.is_closed() {
            bridges_warn!("Timeout measurement requested after teardown");
            return None;
        }
        bridges_info!("Measuring timeouts of {} bridges", bridges.len());
        let run = self.probe.probe(bridges.to_vec());
        self.timeouts.start(run)
    }

    pub fn cancel_measuring_timeouts(&mut self) {
        self.timeouts.cancel_children();
    }

    pub fn is_observing(&self) -> bool {
        self.timeouts.is_observing()
    }

    pub(crate) fn shutdown(&mut self) {
        self.timeouts.cancel_full();
    }
}
