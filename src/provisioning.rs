use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a long-running operation on a remote resource currently stands.
///
/// Transitions are owned by the remote service. Strings this crate does not
/// know are kept verbatim in `Other`; comparison is always exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProvisioningState {
    Creating,
    Updating,
    Scaling,
    Provisioning,
    Succeeded,
    Deleting,
    Failed,
    Canceled,
    UpgradingRedisServerVersion,
    ActivatingWorkspace,
    Consistent,
    AwaitingUserAction,
    Other(String),
}

impl ProvisioningState {
    pub fn as_str(&self) -> &str {
        match self {
            ProvisioningState::Creating => "Creating",
            ProvisioningState::Updating => "Updating",
            ProvisioningState::Scaling => "Scaling",
            ProvisioningState::Provisioning => "Provisioning",
            ProvisioningState::Succeeded => "Succeeded",
            ProvisioningState::Deleting => "Deleting",
            ProvisioningState::Failed => "Failed",
            ProvisioningState::Canceled => "Canceled",
            ProvisioningState::UpgradingRedisServerVersion => "UpgradingRedisServerVersion",
            ProvisioningState::ActivatingWorkspace => "ActivatingWorkspace",
            ProvisioningState::Consistent => "Consistent",
            ProvisioningState::AwaitingUserAction => "AwaitingUserAction",
            ProvisioningState::Other(s) => s,
        }
    }

    /// ARM's terminal states: nothing further will happen without a new request.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProvisioningState::Succeeded | ProvisioningState::Failed | ProvisioningState::Canceled
        )
    }
}

impl FromStr for ProvisioningState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Creating" => ProvisioningState::Creating,
            "Updating" => ProvisioningState::Updating,
            "Scaling" => ProvisioningState::Scaling,
            "Provisioning" => ProvisioningState::Provisioning,
            "Succeeded" => ProvisioningState::Succeeded,
            "Deleting" => ProvisioningState::Deleting,
            "Failed" => ProvisioningState::Failed,
            "Canceled" => ProvisioningState::Canceled,
            "UpgradingRedisServerVersion" => ProvisioningState::UpgradingRedisServerVersion,
            "ActivatingWorkspace" => ProvisioningState::ActivatingWorkspace,
            "Consistent" => ProvisioningState::Consistent,
            "AwaitingUserAction" => ProvisioningState::AwaitingUserAction,
            other => ProvisioningState::Other(other.to_string()),
        })
    }
}

impl From<String> for ProvisioningState {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<ProvisioningState> for String {
    fn from(state: ProvisioningState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads the state string at `pointer` (a JSON pointer such as
/// `/properties/provisioningState`) from an ARM payload.
pub fn state_at(model: &serde_json::Value, pointer: &str) -> Option<ProvisioningState> {
    model
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| ProvisioningState::from(s.to_string()))
}
