use crate::RoundId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fully cancel the task launched for `round`.
    CancelRound { round: RoundId },
    FetchChallenge {
        round: RoundId,
        transport: String,
        ipv6: bool,
    },
    Verify {
        round: RoundId,
        transport: String,
        ipv6: bool,
        captcha_text: String,
        secret_code: String,
    },
}

impl Effect {
    pub fn round(&self) -> RoundId {
        match self {
            Effect::CancelRound { round }
            | Effect::FetchChallenge { round, .. }
            | Effect::Verify { round, .. } => *round,
        }
    }
}
