//! Bridges core: pure provisioning state machine and display states.
mod display;
mod effect;
mod msg;
mod state;
mod update;

pub use display::{CaptchaImage, DisplayState, ParseBridgesResult};
pub use effect::Effect;
pub use msg::Msg;
pub use state::{ProvisioningState, RoundId};
pub use update::update;
