use super::{Segment, define_resource_id};

define_resource_id! {
    /// A Synapse workspace.
    WorkspaceId("Synapse Workspace") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Synapse"),
            Segment::Static("workspaces"),
            Segment::Value("workspaceName"),
        ],
        fields: { subscription_id, resource_group, name }
    }
}

define_resource_id! {
    /// A dedicated SQL pool in a Synapse workspace.
    SqlPoolId("Synapse SQL Pool") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Synapse"),
            Segment::Static("workspaces"),
            Segment::Value("workspaceName"),
            Segment::Static("sqlPools"),
            Segment::Value("sqlPoolName"),
        ],
        fields: { subscription_id, resource_group, workspace_name, name }
    }
}

define_resource_id! {
    /// An Apache Spark pool. ARM still calls these "big data pools".
    SparkPoolId("Synapse Spark Pool") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Synapse"),
            Segment::Static("workspaces"),
            Segment::Value("workspaceName"),
            Segment::Static("bigDataPools"),
            Segment::Value("bigDataPoolName"),
        ],
        fields: { subscription_id, resource_group, workspace_name, name }
    }
}

impl SqlPoolId {
    pub fn workspace(&self) -> WorkspaceId {
        WorkspaceId::new(&self.subscription_id, &self.resource_group, &self.workspace_name)
    }
}

impl SparkPoolId {
    pub fn workspace(&self) -> WorkspaceId {
        WorkspaceId::new(&self.subscription_id, &self.resource_group, &self.workspace_name)
    }
}
