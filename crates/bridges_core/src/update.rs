use crate::state::InFlight;
use crate::{DisplayState, Effect, Msg, ParseBridgesResult, ProvisioningState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Replies carry the round they belong to; a reply for any round other than
/// the one in flight is dropped without touching the display.
pub fn update(mut state: ProvisioningState, msg: Msg) -> (ProvisioningState, Vec<Effect>) {
    let effects = match msg {
        Msg::ShowSelector => {
            state.set_display(DisplayState::SelectTransportPrompt);
            Vec::new()
        }
        Msg::RequestChallenge { transport, ipv6 } => {
            let mut effects = cancel_in_flight(&mut state);
            let round = state.begin_round(transport.clone(), ipv6);
            state.set_display(DisplayState::PleaseWait);
            effects.push(Effect::FetchChallenge {
                round,
                transport,
                ipv6,
            });
            effects
        }
        Msg::Submit { captcha_text } => {
            let DisplayState::CaptchaPrompt {
                transport,
                ipv6,
                secret_code,
                ..
            } = state.display().clone()
            else {
                return (state, Vec::new());
            };
            let mut effects = cancel_in_flight(&mut state);
            let round = state.begin_round(transport.clone(), ipv6);
            state.set_display(DisplayState::PleaseWait);
            effects.push(Effect::Verify {
                round,
                transport,
                ipv6,
                captcha_text,
                secret_code,
            });
            effects
        }
        Msg::Dismiss => {
            let effects = cancel_in_flight(&mut state);
            state.set_display(DisplayState::NoDisplay);
            effects
        }
        Msg::ChallengeReceived {
            round,
            image,
            secret_code,
        } => {
            if let Some(InFlight {
                transport, ipv6, ..
            }) = state.finish_round(round)
            {
                state.set_display(DisplayState::CaptchaPrompt {
                    transport,
                    ipv6,
                    image,
                    secret_code,
                });
            }
            Vec::new()
        }
        Msg::Verified { round, result } => {
            if let Some(InFlight {
                transport, ipv6, ..
            }) = state.finish_round(round)
            {
                let display = match result {
                    ParseBridgesResult::BridgesReady(bridges) => {
                        DisplayState::BridgesReadyPrompt(bridges)
                    }
                    ParseBridgesResult::RecaptchaChallenge { image, secret_code } => {
                        DisplayState::CaptchaPrompt {
                            transport,
                            ipv6,
                            image,
                            secret_code,
                        }
                    }
                };
                state.set_display(display);
            }
            Vec::new()
        }
        Msg::RoundFailed { round, message } => {
            // A failure without a message is only logged; the display stays put.
            if state.finish_round(round).is_some() {
                if let Some(message) = message {
                    state.set_display(DisplayState::ErrorPrompt(message));
                }
            }
            Vec::new()
        }
        Msg::RoundCancelled { round } => {
            if state.finish_round(round).is_some() {
                state.set_display(DisplayState::NoDisplay);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn cancel_in_flight(state: &mut ProvisioningState) -> Vec<Effect> {
    match state.abandon_round() {
        Some(round) => vec![Effect::CancelRound { round }],
        None => Vec::new(),
    }
}
