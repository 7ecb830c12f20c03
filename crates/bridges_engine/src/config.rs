use bridges_logging::LogSettings;
use tokio::runtime::Handle;

use crate::SessionError;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix of every log line the session writes.
    pub name: String,
    /// Runtime the session spawns its tasks on; defaults to the caller's.
    pub runtime: Option<Handle>,
    /// Global logger to install when the session starts. `None` leaves
    /// logging to the host process.
    pub log: Option<LogSettings>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "bridges".to_string(),
            runtime: None,
            log: None,
        }
    }
}

impl SessionConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn resolve_runtime(&self) -> Result<Handle, SessionError> {
        match &self.runtime {
            Some(handle) => Ok(handle.clone()),
            None => Handle::try_current().map_err(|_| SessionError::NoRuntime),
        }
    }
}
