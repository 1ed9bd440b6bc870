//! Create, read, update and delete flows shared by every resource type.
//!
//! Each flow validates the ID against the resource's layout, takes any
//! subnet locks the body implies, issues the ARM call and then waits for the
//! resource to settle.

use std::time::Duration;

use serde_json::Value;

use crate::ids::{ParseMode, ResourceId, SubnetId};
use crate::locks::{self, LockRegistry, NamedLockGuard};
use crate::poller::{Snapshot, StateChangeConf};
use crate::providers::{ProviderError, ResourceManager};
use crate::provisioning::ProvisioningState;
use crate::resource::{PROVISIONING_STATE_POINTER, ResourceDefinition, WaitProfile};
use crate::timeouts::Operation;

const DELETE_MIN_INTERVAL: Duration = Duration::from_secs(10);

pub struct Lifecycle<'a, M: ResourceManager + ?Sized> {
    manager: &'a M,
    locks: &'a LockRegistry,
    poll_interval: Option<Duration>,
}

impl<'a, M: ResourceManager + ?Sized> Lifecycle<'a, M> {
    pub fn new(manager: &'a M) -> Self {
        Self {
            manager,
            locks: locks::global(),
            poll_interval: None,
        }
    }

    pub fn with_locks(mut self, locks: &'a LockRegistry) -> Self {
        self.locks = locks;
        self
    }

    /// Poll at a fixed interval instead of the profile's backoff.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Reads the resource. `None` means it is gone and should be dropped
    /// from state.
    pub async fn read_or_remove(
        &self,
        def: &ResourceDefinition,
        id: &str,
    ) -> Result<Option<Value>, ProviderError> {
        let id = def.parse(id, ParseMode::Strict)?.canonical;

        match self.manager.get(&id, def.api_version).await? {
            Some(model) => Ok(Some(model)),
            None => {
                tracing::warn!(%id, resource_type = def.name, "resource was not found - removing from state");
                Ok(None)
            }
        }
    }

    pub async fn create(
        &self,
        def: &ResourceDefinition,
        id: &str,
        body: &Value,
    ) -> Result<Value, ProviderError> {
        let id = def.parse(id, ParseMode::Strict)?.canonical;

        if self.manager.get(&id, def.api_version).await?.is_some() {
            return Err(ProviderError::AlreadyExists {
                resource_type: def.name.to_string(),
                id,
            });
        }

        let _guards = self.subnet_locks(def, body, ParseMode::Strict).await?;

        tracing::info!(%id, resource_type = def.name, "creating");
        self.manager.put(&id, def.api_version, body).await?;

        self.settle(def, &id, Operation::Create).await
    }

    pub async fn update(
        &self,
        def: &ResourceDefinition,
        id: &str,
        body: &Value,
    ) -> Result<Value, ProviderError> {
        let id = def.parse(id, ParseMode::Strict)?.canonical;

        tracing::info!(%id, resource_type = def.name, "updating");
        self.manager.put(&id, def.api_version, body).await?;

        self.settle(def, &id, Operation::Update).await
    }

    /// Waits for an existing resource to reach the target of the profile
    /// registered for `operation`. Without a profile the current model is
    /// returned as is.
    pub async fn wait(
        &self,
        def: &ResourceDefinition,
        id: &str,
        operation: Operation,
    ) -> Result<Value, ProviderError> {
        let id = def.parse(id, ParseMode::Strict)?.canonical;
        self.settle(def, &id, operation).await
    }

    pub async fn delete(&self, def: &ResourceDefinition, id: &str) -> Result<(), ProviderError> {
        let id = def.parse(id, ParseMode::Strict)?.canonical;

        let Some(existing) = self.manager.get(&id, def.api_version).await? else {
            tracing::info!(%id, "already deleted");
            return Ok(());
        };

        // ARM echoes the subnet ID back with lower-cased static segments.
        let _guards = self
            .subnet_locks(def, &existing, ParseMode::Insensitive)
            .await?;

        tracing::info!(%id, resource_type = def.name, "deleting");
        self.manager.delete(&id, def.api_version).await?;

        let mut conf = StateChangeConf::until_gone(
            Vec::new(),
            def.timeouts.for_operation(Operation::Delete),
        )
        .with_min_interval(DELETE_MIN_INTERVAL)
        .with_failure_states(vec![ProvisioningState::Failed, ProvisioningState::Canceled]);
        if let Some(interval) = self.poll_interval {
            conf = conf.with_poll_interval(interval);
        }

        let manager = self.manager;
        let api_version = def.api_version;
        let id_ref = id.as_str();
        conf.wait_for_state(move || async move {
            let model = manager.get(id_ref, api_version).await?;
            Ok::<_, ProviderError>(model.map(|model| {
                let state = crate::provisioning::state_at(&model, PROVISIONING_STATE_POINTER)
                    .unwrap_or(ProvisioningState::Deleting);
                Snapshot::new(model, state)
            }))
        })
        .await
        .map_err(|source| ProviderError::Wait {
            id: id.clone(),
            operation: "be deleted".to_string(),
            source,
        })?;

        tracing::info!(%id, "deleted");
        Ok(())
    }

    async fn settle(
        &self,
        def: &ResourceDefinition,
        id: &str,
        operation: Operation,
    ) -> Result<Value, ProviderError> {
        let profile = match operation {
            Operation::Create => def.create_wait.as_ref(),
            Operation::Update => def.update_wait.as_ref(),
            Operation::Read | Operation::Delete => None,
        };

        let Some(profile) = profile else {
            return self
                .manager
                .get(id, def.api_version)
                .await?
                .ok_or_else(|| ProviderError::NotFound { id: id.to_string() });
        };

        let mut conf = profile.conf(def.timeouts.for_operation(operation));
        if let Some(interval) = self.poll_interval {
            conf = conf.with_poll_interval(interval);
        }

        tracing::debug!(%id, %operation, expected = ?profile.target, "waiting for provisioning state");
        let model = conf
            .wait_for_state(refresh(self.manager, id, def.api_version, profile))
            .await
            .map_err(|source| ProviderError::Wait {
                id: id.to_string(),
                operation: describe(operation).to_string(),
                source,
            })?;

        model.ok_or_else(|| ProviderError::NotFound { id: id.to_string() })
    }

    async fn subnet_locks(
        &self,
        def: &ResourceDefinition,
        model: &Value,
        mode: ParseMode,
    ) -> Result<Vec<NamedLockGuard>, ProviderError> {
        let Some(pointer) = def.subnet_property else {
            return Ok(Vec::new());
        };
        let Some(raw) = model.pointer(pointer).and_then(Value::as_str) else {
            return Ok(Vec::new());
        };

        let subnet = match mode {
            ParseMode::Strict => SubnetId::parse(raw)?,
            ParseMode::Insensitive => SubnetId::parse_insensitively(raw)?,
        };
        Ok(self.locks.by_subnet(&subnet).await)
    }
}

fn refresh<'r, M: ResourceManager + ?Sized>(
    manager: &'r M,
    id: &'r str,
    api_version: &'r str,
    profile: &'r WaitProfile,
) -> impl FnMut() -> std::pin::Pin<
    Box<dyn Future<Output = Result<Option<Snapshot<Value>>, ProviderError>> + Send + 'r>,
> {
    move || {
        Box::pin(async move {
            let Some(model) = manager.get(id, api_version).await? else {
                return Ok(None);
            };
            let state = profile
                .state_of(&model)
                .ok_or_else(|| ProviderError::MissingField {
                    id: id.to_string(),
                    field: profile.state_pointer.to_string(),
                })?;
            Ok(Some(Snapshot::new(model, state)))
        })
    }
}

fn describe(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "be created",
        Operation::Read => "be read",
        Operation::Update => "be updated",
        Operation::Delete => "be deleted",
    }
}
