//! azrm - Azure Resource Manager lifecycle toolkit
//!
//! Typed ARM resource IDs, provisioning-state polling and the create, read,
//! update and delete flows built on them.

pub mod error;
pub mod ids;
pub mod lifecycle;
pub mod locks;
pub mod poller;
pub mod providers;
pub mod provisioning;
pub mod resource;
pub mod terraform;
pub mod timeouts;

pub use error::AzrmError;
pub use ids::{IdError, ParseMode, ParsedId, ResourceId};
pub use lifecycle::Lifecycle;
pub use poller::{Snapshot, StateChangeConf, WaitError};
pub use providers::azure::{ArmClient, ArmError, AzureProvider};
pub use providers::{ProviderError, ResourceManager};
pub use provisioning::ProvisioningState;
pub use resource::{ResourceDefinition, WaitProfile, lookup, supported_resources};
pub use timeouts::{Operation, ResourceTimeouts};
