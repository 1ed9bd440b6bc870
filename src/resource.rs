//! The resource types this crate knows how to manage.

use std::sync::LazyLock;
use std::time::Duration;

use crate::ids::{
    CacheId, FirewallRuleId, IdError, LinkedServerId, ParseMode, ParsedId, RedisId, ResourceId,
    Segment, SparkPoolId, SqlPoolId, StorageTargetId, WorkspaceId, parse_erased,
};
use crate::poller::StateChangeConf;
use crate::provisioning::ProvisioningState;
use crate::timeouts::ResourceTimeouts;

pub const PROVISIONING_STATE_POINTER: &str = "/properties/provisioningState";

const REDIS_API_VERSION: &str = "2024-03-01";
const STORAGE_CACHE_API_VERSION: &str = "2021-09-01";
const SYNAPSE_API_VERSION: &str = "2021-03-01";

/// How to wait for a resource after a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitProfile {
    pub pending: Vec<ProvisioningState>,
    pub target: Vec<ProvisioningState>,
    pub min_interval: Duration,
    pub continuous_target_occurrence: u32,
    /// JSON pointer to the state string in the resource model.
    pub state_pointer: &'static str,
    /// State assumed when the pointer resolves to nothing.
    pub absent_state: Option<ProvisioningState>,
}

impl WaitProfile {
    fn provisioning(
        pending: Vec<ProvisioningState>,
        target: Vec<ProvisioningState>,
        min_interval: Duration,
    ) -> Self {
        Self {
            pending,
            target,
            min_interval,
            continuous_target_occurrence: 1,
            state_pointer: PROVISIONING_STATE_POINTER,
            absent_state: None,
        }
    }

    /// The poller configuration for this profile under `timeout`.
    pub fn conf(&self, timeout: Duration) -> StateChangeConf {
        StateChangeConf::new(self.pending.clone(), self.target.clone(), timeout)
            .with_min_interval(self.min_interval)
            .with_continuous_target_occurrence(self.continuous_target_occurrence)
    }

    /// Reads this profile's state from a resource model.
    pub fn state_of(&self, model: &serde_json::Value) -> Option<ProvisioningState> {
        crate::provisioning::state_at(model, self.state_pointer).or_else(|| self.absent_state.clone())
    }
}

/// Parses an ID string into its type-erased form.
pub type ParseFn = fn(&str, ParseMode) -> Result<ParsedId, IdError>;

#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    /// Terraform type name, e.g. `azurerm_redis_cache`.
    pub name: &'static str,
    pub id_type: &'static str,
    pub api_version: &'static str,
    pub segments: &'static [Segment],
    pub parse_id: ParseFn,
    pub timeouts: ResourceTimeouts,
    pub create_wait: Option<WaitProfile>,
    pub update_wait: Option<WaitProfile>,
    /// JSON pointer to a subnet ID in the request body. Creating or deleting
    /// the resource locks that subnet and its virtual network.
    pub subnet_property: Option<&'static str>,
}

impl ResourceDefinition {
    fn new<T: ResourceId>(name: &'static str, api_version: &'static str) -> Self {
        Self {
            name,
            id_type: T::ID_TYPE,
            api_version,
            segments: T::SEGMENTS,
            parse_id: parse_erased::<T>,
            timeouts: ResourceTimeouts::default(),
            create_wait: None,
            update_wait: None,
            subnet_property: None,
        }
    }

    fn with_timeouts(mut self, timeouts: ResourceTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn with_create_wait(mut self, profile: WaitProfile) -> Self {
        self.create_wait = Some(profile);
        self
    }

    fn with_update_wait(mut self, profile: WaitProfile) -> Self {
        self.update_wait = Some(profile);
        self
    }

    fn with_subnet_property(mut self, pointer: &'static str) -> Self {
        self.subnet_property = Some(pointer);
        self
    }

    pub fn parse(&self, input: &str, mode: ParseMode) -> Result<ParsedId, IdError> {
        (self.parse_id)(input, mode)
    }

    pub fn template(&self) -> String {
        crate::ids::template(self.segments)
    }
}

static REGISTRY: LazyLock<Vec<ResourceDefinition>> = LazyLock::new(build_registry);

/// Every supported resource type, in a stable order.
pub fn supported_resources() -> &'static [ResourceDefinition] {
    &REGISTRY
}

pub fn lookup(name: &str) -> Option<&'static ResourceDefinition> {
    supported_resources().iter().find(|def| def.name == name)
}

fn build_registry() -> Vec<ResourceDefinition> {
    use ProvisioningState::*;

    let redis_create = WaitProfile::provisioning(
        vec![Scaling, Updating, Creating],
        vec![Succeeded],
        Duration::from_secs(15),
    );
    let redis_update = WaitProfile::provisioning(
        vec![Scaling, Updating, Creating, UpgradingRedisServerVersion],
        vec![Succeeded],
        Duration::from_secs(15),
    );
    let linked_server = WaitProfile::provisioning(
        vec![Creating, Updating],
        vec![Succeeded],
        Duration::from_secs(15),
    );
    let hpc_cache = WaitProfile::provisioning(
        vec![Creating, Updating],
        vec![Succeeded],
        Duration::from_secs(15),
    );
    let synapse_pool = WaitProfile::provisioning(
        vec![Provisioning, Creating, Updating, Scaling],
        vec![Succeeded],
        Duration::from_secs(15),
    );
    let workspace_cmk = WaitProfile {
        pending: vec![Updating, ActivatingWorkspace],
        target: vec![Succeeded, Consistent, AwaitingUserAction],
        min_interval: Duration::from_secs(5),
        continuous_target_occurrence: 5,
        state_pointer: "/properties/encryption/cmk/status",
        absent_state: Some(Succeeded),
    };

    vec![
        ResourceDefinition::new::<RedisId>("azurerm_redis_cache", REDIS_API_VERSION)
            .with_timeouts(ResourceTimeouts::mutating_minutes(90))
            .with_create_wait(redis_create)
            .with_update_wait(redis_update)
            .with_subnet_property("/properties/subnetId"),
        ResourceDefinition::new::<FirewallRuleId>("azurerm_redis_firewall_rule", REDIS_API_VERSION),
        ResourceDefinition::new::<LinkedServerId>("azurerm_redis_linked_server", REDIS_API_VERSION)
            .with_timeouts(ResourceTimeouts::mutating_minutes(90))
            .with_create_wait(linked_server),
        ResourceDefinition::new::<CacheId>("azurerm_hpc_cache", STORAGE_CACHE_API_VERSION)
            .with_timeouts(ResourceTimeouts::mutating_minutes(60))
            .with_create_wait(hpc_cache)
            .with_subnet_property("/properties/subnet"),
        ResourceDefinition::new::<StorageTargetId>(
            "azurerm_hpc_cache_blob_target",
            STORAGE_CACHE_API_VERSION,
        ),
        ResourceDefinition::new::<WorkspaceId>("azurerm_synapse_workspace", SYNAPSE_API_VERSION)
            .with_update_wait(workspace_cmk),
        ResourceDefinition::new::<SqlPoolId>("azurerm_synapse_sql_pool", SYNAPSE_API_VERSION)
            .with_timeouts(ResourceTimeouts::mutating_minutes(60))
            .with_create_wait(synapse_pool.clone())
            .with_update_wait(synapse_pool.clone()),
        ResourceDefinition::new::<SparkPoolId>("azurerm_synapse_spark_pool", SYNAPSE_API_VERSION)
            .with_timeouts(ResourceTimeouts::mutating_minutes(60))
            .with_create_wait(synapse_pool.clone())
            .with_update_wait(synapse_pool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeouts::Operation;

    #[test]
    fn test_registry_order() {
        let names: Vec<&str> = supported_resources().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "azurerm_redis_cache",
                "azurerm_redis_firewall_rule",
                "azurerm_redis_linked_server",
                "azurerm_hpc_cache",
                "azurerm_hpc_cache_blob_target",
                "azurerm_synapse_workspace",
                "azurerm_synapse_sql_pool",
                "azurerm_synapse_spark_pool",
            ]
        );
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        assert!(lookup("azurerm_resource_group").is_none());
    }

    #[test]
    fn test_lookup_parses_with_its_own_layout() {
        let def = lookup("azurerm_redis_linked_server").unwrap();
        let parsed = def
            .parse(
                "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Cache/Redis/r1/linkedServers/l1",
                ParseMode::Strict,
            )
            .unwrap();
        assert_eq!(parsed.id_type, "Redis Linked Server");
        assert_eq!(parsed.value("redisName"), Some("r1"));
        assert_eq!(parsed.value("linkedServerName"), Some("l1"));
    }

    #[test]
    fn test_redis_timeouts_and_waits() {
        let def = lookup("azurerm_redis_cache").unwrap();
        assert_eq!(
            def.timeouts.for_operation(Operation::Create),
            Duration::from_secs(90 * 60)
        );
        let update = def.update_wait.as_ref().unwrap();
        assert!(update.pending.contains(&ProvisioningState::UpgradingRedisServerVersion));
        let create = def.create_wait.as_ref().unwrap();
        assert!(!create.pending.contains(&ProvisioningState::UpgradingRedisServerVersion));
        assert_eq!(create.min_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_workspace_cmk_absent_state_counts_as_succeeded() {
        let def = lookup("azurerm_synapse_workspace").unwrap();
        let profile = def.update_wait.as_ref().unwrap();
        let model = serde_json::json!({"properties": {"provisioningState": "Succeeded"}});
        assert_eq!(profile.state_of(&model), Some(ProvisioningState::Succeeded));

        let model = serde_json::json!({"properties": {"encryption": {"cmk": {"status": "ActivatingWorkspace"}}}});
        assert_eq!(
            profile.state_of(&model),
            Some(ProvisioningState::ActivatingWorkspace)
        );
    }

    #[test]
    fn test_conf_carries_profile_settings() {
        let def = lookup("azurerm_synapse_workspace").unwrap();
        let conf = def
            .update_wait
            .as_ref()
            .unwrap()
            .conf(Duration::from_secs(60));
        assert_eq!(conf.continuous_target_occurrence, 5);
        assert_eq!(conf.min_interval, Duration::from_secs(5));
        assert_eq!(conf.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_template_matches_segments() {
        let def = lookup("azurerm_hpc_cache").unwrap();
        assert_eq!(
            def.template(),
            "/subscriptions/{subscriptionId}/resourceGroups/{resourceGroupName}/providers/Microsoft.StorageCache/caches/{cacheName}"
        );
    }
}
