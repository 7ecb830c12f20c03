#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use bridges_engine::{
    BridgeCountryData, BridgeCountryLookup, BridgeDistributionClient, BridgeLatencyProbe,
    BridgePingResult, BridgesSession, CaptchaImage, Collaborators, ObfsBridge,
    ParseBridgesResult, RelayDescriptor, RelayDirectoryClient, ServiceError, SessionConfig,
};
use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::{oneshot, watch};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(bridges_logging::initialize_for_tests);
}

/// Waits until the channel value satisfies `done`, failing the test after 5s.
pub async fn wait_until<T: Clone>(
    receiver: &mut watch::Receiver<T>,
    done: impl FnMut(&T) -> bool,
) -> T {
    tokio::time::timeout(Duration::from_secs(5), receiver.wait_for(done))
        .await
        .expect("timed out waiting for channel value")
        .expect("channel closed")
        .clone()
}

/// Lets every spawned task run until it blocks.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

pub fn bridges(lines: &[&str]) -> Vec<ObfsBridge> {
    lines.iter().copied().map(ObfsBridge::from).collect()
}

pub fn ping(bridge: &str, ping_millis: u32) -> BridgePingResult {
    BridgePingResult::Measured {
        bridge: bridge.to_string(),
        ping_millis,
    }
}

pub fn country(bridge: &str, code: &str) -> BridgeCountryData {
    BridgeCountryData {
        bridge: bridge.to_string(),
        country_code: code.to_string(),
        country_name: code.to_uppercase(),
    }
}

pub fn relay(address: &str, port: u16, fingerprint: &str) -> RelayDescriptor {
    RelayDescriptor {
        address: address.to_string(),
        port,
        fingerprint: fingerprint.to_string(),
    }
}

pub fn image(tag: &str) -> CaptchaImage {
    CaptchaImage::new(tag.as_bytes().to_vec())
}

/// Items of one scripted producer run.
pub struct ScriptedRun<T> {
    items: Vec<T>,
    gate: Option<(oneshot::Receiver<()>, Vec<T>)>,
    hold_open: bool,
}

impl<T: Send + 'static> ScriptedRun<T> {
    pub fn finishing(items: Vec<T>) -> Self {
        Self {
            items,
            gate: None,
            hold_open: false,
        }
    }

    /// Emits `items`, then never ends.
    pub fn hanging(items: Vec<T>) -> Self {
        Self {
            items,
            gate: None,
            hold_open: true,
        }
    }

    /// Emits `items`, then `after` once the returned sender fires.
    pub fn gated(items: Vec<T>, after: Vec<T>) -> (Self, oneshot::Sender<()>) {
        let (open, gate) = oneshot::channel();
        let run = Self {
            items,
            gate: Some((gate, after)),
            hold_open: false,
        };
        (run, open)
    }

    fn into_stream(self) -> BoxStream<'static, T> {
        let head = stream::iter(self.items);
        let stream = match self.gate {
            Some((gate, after)) => head
                .chain(
                    stream::once(async move {
                        let _ = gate.await;
                        stream::iter(after)
                    })
                    .flatten(),
                )
                .boxed(),
            None => head.boxed(),
        };
        if self.hold_open {
            stream.chain(stream::pending()).boxed()
        } else {
            stream
        }
    }
}

pub struct ScriptedSource<T> {
    runs: Mutex<VecDeque<ScriptedRun<T>>>,
    calls: Mutex<Vec<Vec<ObfsBridge>>>,
}

impl<T: Send + 'static> ScriptedSource<T> {
    pub fn new(runs: Vec<ScriptedRun<T>>) -> Arc<Self> {
        Arc::new(Self {
            runs: Mutex::new(runs.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Vec<ObfsBridge>> {
        self.calls.lock().unwrap().clone()
    }

    fn next_run(&self, bridges: Vec<ObfsBridge>) -> BoxStream<'static, T> {
        self.calls.lock().unwrap().push(bridges);
        match self.runs.lock().unwrap().pop_front() {
            Some(run) => run.into_stream(),
            None => stream::empty().boxed(),
        }
    }
}

impl BridgeLatencyProbe for ScriptedSource<BridgePingResult> {
    fn probe(&self, bridges: Vec<ObfsBridge>) -> BoxStream<'static, BridgePingResult> {
        self.next_run(bridges)
    }
}

impl BridgeCountryLookup for ScriptedSource<BridgeCountryData> {
    fn lookup(&self, bridges: Vec<ObfsBridge>) -> BoxStream<'static, BridgeCountryData> {
        self.next_run(bridges)
    }
}

/// One scripted reply, optionally held back until a gate opens.
pub struct Reply<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, ServiceError>,
}

impl<T> Reply<T> {
    pub fn now(result: Result<T, ServiceError>) -> Self {
        Self { gate: None, result }
    }

    pub fn gated(result: Result<T, ServiceError>) -> (Self, oneshot::Sender<()>) {
        let (open, gate) = oneshot::channel();
        (
            Self {
                gate: Some(gate),
                result,
            },
            open,
        )
    }

    async fn resolve(self) -> Result<T, ServiceError> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        self.result
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> Reply<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Reply::now(Err(ServiceError::failed("no scripted reply"))))
}

pub struct FakeRelayDirectory {
    replies: Mutex<VecDeque<Reply<Vec<RelayDescriptor>>>>,
    calls: Mutex<Vec<bool>>,
}

impl FakeRelayDirectory {
    pub fn new(replies: Vec<Reply<Vec<RelayDescriptor>>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RelayDirectoryClient for FakeRelayDirectory {
    async fn fetch_relays(&self, allow_ipv6: bool) -> Result<Vec<RelayDescriptor>, ServiceError> {
        self.calls.lock().unwrap().push(allow_ipv6);
        let reply = pop(&self.replies);
        reply.resolve().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCall {
    pub transport: String,
    pub ipv6: bool,
    pub captcha_text: String,
    pub secret_code: String,
}

pub struct FakeDistribution {
    challenges: Mutex<VecDeque<Reply<(CaptchaImage, String)>>>,
    verifications: Mutex<VecDeque<Reply<ParseBridgesResult>>>,
    verify_calls: Mutex<Vec<VerifyCall>>,
}

impl FakeDistribution {
    pub fn new(
        challenges: Vec<Reply<(CaptchaImage, String)>>,
        verifications: Vec<Reply<ParseBridgesResult>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            challenges: Mutex::new(challenges.into()),
            verifications: Mutex::new(verifications.into()),
            verify_calls: Mutex::new(Vec::new()),
        })
    }

    pub fn verify_calls(&self) -> Vec<VerifyCall> {
        self.verify_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BridgeDistributionClient for FakeDistribution {
    async fn fetch_challenge(
        &self,
        _transport: &str,
        _ipv6: bool,
    ) -> Result<(CaptchaImage, String), ServiceError> {
        let reply = pop(&self.challenges);
        reply.resolve().await
    }

    async fn verify(
        &self,
        transport: &str,
        ipv6: bool,
        captcha_text: &str,
        secret_code: &str,
    ) -> Result<ParseBridgesResult, ServiceError> {
        self.verify_calls.lock().unwrap().push(VerifyCall {
            transport: transport.to_string(),
            ipv6,
            captcha_text: captcha_text.to_string(),
            secret_code: secret_code.to_string(),
        });
        let reply = pop(&self.verifications);
        reply.resolve().await
    }
}

/// Collaborators for a session; unspecified ones have nothing scripted.
pub struct Fakes {
    pub probe: Arc<ScriptedSource<BridgePingResult>>,
    pub lookup: Arc<ScriptedSource<BridgeCountryData>>,
    pub relays: Arc<FakeRelayDirectory>,
    pub distribution: Arc<FakeDistribution>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            probe: ScriptedSource::new(Vec::new()),
            lookup: ScriptedSource::new(Vec::new()),
            relays: FakeRelayDirectory::new(Vec::new()),
            distribution: FakeDistribution::new(Vec::new(), Vec::new()),
        }
    }
}

impl Fakes {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            latency_probe: self.probe.clone(),
            country_lookup: self.lookup.clone(),
            relay_directory: self.relays.clone(),
            distribution: self.distribution.clone(),
        }
    }

    pub fn session(&self) -> BridgesSession {
        BridgesSession::new(SessionConfig::named("test"), self.collaborators()).expect("session")
    }
}
