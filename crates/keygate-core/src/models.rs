//! Response shapes returned across the process boundary to a front-end.

use serde::{Deserialize, Serialize};

use crate::fingerprint::DeviceIdentity;
use crate::gate::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<SessionState> for AuthStatus {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Authenticated { token } => Self {
                is_authenticated: true,
                token: Some(token),
            },
            SessionState::Unauthenticated => Self {
                is_authenticated: false,
                token: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MachineCodeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<DeviceIdentity> for MachineCodeResponse {
    fn from(identity: DeviceIdentity) -> Self {
        match identity {
            DeviceIdentity::Stable(code) => Self {
                success: true,
                machine_code: Some(code),
                message: None,
            },
            DeviceIdentity::Fallback(code) => Self {
                success: true,
                machine_code: Some(code),
                message: Some(
                    "Hardware information unavailable, showing a temporary code".to_string(),
                ),
            },
        }
    }
}
