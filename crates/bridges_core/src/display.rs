use std::fmt;

/// Raw captcha artifact as served by the distribution service.
///
/// The bytes are never decoded here; rendering belongs to the UI layer.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CaptchaImage(Vec<u8>);

impl CaptchaImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for CaptchaImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptchaImage({} bytes)", self.0.len())
    }
}

/// Reply of the distribution service to a captcha solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseBridgesResult {
    /// Newline separated bridge lines.
    BridgesReady(String),
    /// The solution was rejected and a new challenge issued.
    RecaptchaChallenge {
        image: CaptchaImage,
        secret_code: String,
    },
}

/// The single dialog currently shown by the provisioning flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    NoDisplay,
    SelectTransportPrompt,
    PleaseWait,
    CaptchaPrompt {
        transport: String,
        ipv6: bool,
        image: CaptchaImage,
        secret_code: String,
    },
    BridgesReadyPrompt(String),
    ErrorPrompt(String),
}

impl DisplayState {
    /// Short name used in log lines; payloads may be large or sensitive.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayState::NoDisplay => "no-display",
            DisplayState::SelectTransportPrompt => "select-transport",
            DisplayState::PleaseWait => "please-wait",
            DisplayState::CaptchaPrompt { .. } => "captcha",
            DisplayState::BridgesReadyPrompt(_) => "bridges-ready",
            DisplayState::ErrorPrompt(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captcha_debug_hides_bytes() {
        let image = CaptchaImage::new(vec![0x89, b'P', b'N', b'G']);
        assert_eq!(format!("{image:?}"), "CaptchaImage(4 bytes)");
    }

    #[test]
    fn default_display_is_no_display() {
        assert_eq!(DisplayState::default(), DisplayState::NoDisplay);
        assert_eq!(DisplayState::default().label(), "no-display");
    }
}
