use crate::{CaptchaImage, ParseBridgesResult, RoundId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User opened the transport selector.
    ShowSelector,
    /// User picked a transport and asked for a captcha.
    RequestChallenge { transport: String, ipv6: bool },
    /// User typed a captcha solution into the current prompt.
    Submit { captcha_text: String },
    /// User closed whatever dialog is shown.
    Dismiss,
    /// Challenge fetch of `round` succeeded.
    ChallengeReceived {
        round: RoundId,
        image: CaptchaImage,
        secret_code: String,
    },
    /// Verification of `round` produced a reply.
    Verified {
        round: RoundId,
        result: ParseBridgesResult,
    },
    /// Task of `round` failed; `message` is shown when present.
    RoundFailed {
        round: RoundId,
        message: Option<String>,
    },
    /// Task of `round` was cancelled.
    RoundCancelled { round: RoundId },
}
