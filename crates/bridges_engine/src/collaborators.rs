use futures_util::stream::BoxStream;

use crate::{
    BridgeCountryData, BridgePingResult, CaptchaImage, ObfsBridge, ParseBridgesResult,
    RelayDescriptor, ServiceError,
};

pub trait BridgeLatencyProbe: Send + Sync {
    /// Lazily measures `bridges`; the stream ends after a `Complete` item.
    fn probe(&self, bridges: Vec<ObfsBridge>) -> BoxStream<'static, BridgePingResult>;
}

pub trait BridgeCountryLookup: Send + Sync {
    fn lookup(&self, bridges: Vec<ObfsBridge>) -> BoxStream<'static, BridgeCountryData>;
}

#[async_trait::async_trait]
pub trait RelayDirectoryClient: Send + Sync {
    async fn fetch_relays(&self, allow_ipv6: bool) -> Result<Vec<RelayDescriptor>, ServiceError>;
}

#[async_trait::async_trait]
pub trait BridgeDistributionClient: Send + Sync {
    async fn fetch_challenge(
        &self,
        transport: &str,
        ipv6: bool,
    ) -> Result<(CaptchaImage, String), ServiceError>;

    async fn verify(
        &self,
        transport: &str,
        ipv6: bool,
        captcha_text: &str,
        secret_code: &str,
    ) -> Result<ParseBridgesResult, ServiceError>;
}
