use crate::DisplayState;

pub type RoundId = u64;

/// Parameters of the round whose task is still running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InFlight {
    pub(crate) round: RoundId,
    pub(crate) transport: String,
    pub(crate) ipv6: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProvisioningState {
    display: DisplayState,
    last_round: RoundId,
    in_flight: Option<InFlight>,
    dirty: bool,
}

impl ProvisioningState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Round of the task still awaiting a reply, if any.
    pub fn in_flight_round(&self) -> Option<RoundId> {
        self.in_flight.as_ref().map(|flight| flight.round)
    }

    /// Returns whether the display changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replaces the display; an identical state is not a change.
    pub(crate) fn set_display(&mut self, display: DisplayState) {
        if self.display != display {
            self.display = display;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_round(&mut self, transport: String, ipv6: bool) -> RoundId {
        self.last_round += 1;
        self.in_flight = Some(InFlight {
            round: self.last_round,
            transport,
            ipv6,
        });
        self.last_round
    }

    /// Forgets the in-flight round so its reply will be ignored.
    pub(crate) fn abandon_round(&mut self) -> Option<RoundId> {
        self.in_flight.take().map(|flight| flight.round)
    }

    /// Takes the in-flight round if `round` is the one still awaited.
    pub(crate) fn finish_round(&mut self, round: RoundId) -> Option<InFlight> {
        match &self.in_flight {
            Some(flight) if flight.round == round => self.in_flight.take(),
            _ => None,
        }
    }
}
