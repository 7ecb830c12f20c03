use std::fmt;

/// One bridge configuration line as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObfsBridge {
    line: String,
}

impl ObfsBridge {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into().trim().to_string(),
        }
    }

    pub fn line(&self) -> &str {
        &self.line
    }
}

impl From<&str> for ObfsBridge {
    fn from(line: &str) -> Self {
        Self::new(line)
    }
}

impl fmt::Display for ObfsBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgePingResult {
    /// Round trip to `bridge`; zero means it could not be measured.
    Measured { bridge: String, ping_millis: u32 },
    /// End of one measurement run.
    Complete,
}

impl BridgePingResult {
    /// Unmeasured entries never reach the published list.
    pub fn is_reportable(&self) -> bool {
        match self {
            BridgePingResult::Measured { ping_millis, .. } => *ping_millis != 0,
            BridgePingResult::Complete => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeCountryData {
    pub bridge: String,
    pub country_code: String,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayDescriptor {
    pub address: String,
    pub port: u16,
    pub fingerprint: String,
}
