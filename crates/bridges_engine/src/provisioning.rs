use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bridges_core::{update, Effect, Msg, ProvisioningState, RoundId};
use bridges_logging::{bridges_debug, bridges_error, bridges_info};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cancel::guarded;
use crate::channels::publish_display;
use crate::{
    BridgeDistributionClient, CancellationGroup, DisplayState, EventChannels, ServiceError,
    TaskOutcome,
};

/// Drives the captcha-gated bridge request dialog flow.
///
/// User actions and task replies are applied to [`ProvisioningState`] by the
/// pure `update` function; the effects it returns are executed here. Each
/// round runs in its own cancellation group, which is fully cancelled when
/// the round is replaced or dismissed.
#[derive(Clone)]
pub struct BridgeProvisioning {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    client: Arc<dyn BridgeDistributionClient>,
    state: Mutex<ProvisioningState>,
    round: Mutex<Option<(RoundId, CancellationGroup)>>,
    session: CancellationGroup,
    display: Arc<watch::Sender<DisplayState>>,
    runtime: Handle,
}

impl BridgeProvisioning {
    pub fn new(
        name: &str,
        client: Arc<dyn BridgeDistributionClient>,
        channels: &EventChannels,
        session: CancellationGroup,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name: format!("{name}/provisioning"),
                client,
                state: Mutex::new(ProvisioningState::new()),
                round: Mutex::new(None),
                session,
                display: channels.display(),
                runtime,
            }),
        }
    }

    pub fn display(&self) -> DisplayState {
        lock(&self.inner.state).display().clone()
    }

    pub fn show_selector(&self) {
        self.dispatch(Msg::ShowSelector);
    }

    pub fn request_challenge(&self, transport: &str, ipv6: bool) -> Option<JoinHandle<()>> {
        self.dispatch(Msg::RequestChallenge {
            transport: transport.to_string(),
            ipv6,
        })
    }

    /// Sends a captcha solution; ignored unless a captcha prompt is shown.
    pub fn submit(&self, captcha_text: &str) -> Option<JoinHandle<()>> {
        self.dispatch(Msg::Submit {
            captcha_text: captcha_text.to_string(),
        })
    }

    pub fn dismiss(&self) {
        self.dispatch(Msg::Dismiss);
    }

    /// Cancels the running round; the dialog closes once the task reports back.
    pub fn cancel_request(&self) {
        if let Some((round, group)) = lock(&self.inner.round).as_ref() {
            bridges_debug!("{}: cancelling round {}", self.inner.name, round);
            group.cancel();
        }
    }

    pub(crate) fn shutdown(&self) {
        if let Some((_, group)) = lock(&self.inner.round).take() {
            group.cancel();
        }
    }

    fn dispatch(&self, msg: Msg) -> Option<JoinHandle<()>> {
        let effects = {
            let mut guard = lock(&self.inner.state);
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update(state, msg);
            if state.consume_dirty() && publish_display(&self.inner.display, state.display()) {
                bridges_debug!("{}: showing {}", self.inner.name, state.display().label());
            }
            *guard = state;
            effects
        };

        let mut launched = None;
        for effect in effects {
            if let Some(task) = self.run_effect(effect) {
                launched = Some(task);
            }
        }
        launched
    }

    fn run_effect(&self, effect: Effect) -> Option<JoinHandle<()>> {
        match effect {
            Effect::CancelRound { round } => {
                let mut current = lock(&self.inner.round);
                if matches!(current.as_ref(), Some((running, _)) if *running == round) {
                    if let Some((_, group)) = current.take() {
                        group.cancel();
                    }
                }
                None
            }
            Effect::FetchChallenge {
                round,
                transport,
                ipv6,
            } => {
                bridges_info!(
                    "{}: requesting {} captcha (ipv6={}), round {}",
                    self.inner.name,
                    transport,
                    ipv6,
                    round
                );
                let client = self.inner.client.clone();
                Some(self.launch(round, "captcha challenge request", async move {
                    let (image, secret_code) = client.fetch_challenge(&transport, ipv6).await?;
                    Ok(Msg::ChallengeReceived {
                        round,
                        image,
                        secret_code,
                    })
                }))
            }
            Effect::Verify {
                round,
                transport,
                ipv6,
                captcha_text,
                secret_code,
            } => {
                bridges_info!(
                    "{}: verifying {} captcha (ipv6={}), round {}",
                    self.inner.name,
                    transport,
                    ipv6,
                    round
                );
                let client = self.inner.client.clone();
                Some(self.launch(round, "bridges request", async move {
                    let result = client
                        .verify(&transport, ipv6, &captcha_text, &secret_code)
                        .await?;
                    Ok(Msg::Verified { round, result })
                }))
            }
        }
    }

    fn launch<F>(&self, round: RoundId, what: &'static str, work: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<Msg, ServiceError>> + Send + 'static,
    {
        let group = self.inner.session.child_group();
        let token = group.scope_token();
        install_round(&mut lock(&self.inner.round), round, group);

        let this = self.clone();
        self.inner.runtime.spawn(async move {
            let name = &this.inner.name;
            let reply = match guarded(&token, work).await {
                TaskOutcome::Completed(reply) => reply,
                TaskOutcome::Cancelled => {
                    bridges_debug!("{}: {} of round {} cancelled", name, what, round);
                    Msg::RoundCancelled { round }
                }
                TaskOutcome::Failed(err) => {
                    bridges_error!("{}: {} of round {} failed: {}", name, what, round, err);
                    Msg::RoundFailed {
                        round,
                        message: err.message().map(str::to_owned),
                    }
                }
            };
            this.release_round(round);
            this.dispatch(reply);
        })
    }

    fn release_round(&self, round: RoundId) {
        let mut current = lock(&self.inner.round);
        if matches!(current.as_ref(), Some((running, _)) if *running == round) {
            current.take();
        }
    }
}

/// Makes `group` the running round unless a newer round already runs, in
/// which case the late launch is cancelled before it starts.
fn install_round(
    slot: &mut Option<(RoundId, CancellationGroup)>,
    round: RoundId,
    group: CancellationGroup,
) {
    if matches!(slot.as_ref(), Some((running, _)) if *running > round) {
        group.cancel();
        return;
    }
    if let Some((_, previous)) = slot.replace((round, group)) {
        previous.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
