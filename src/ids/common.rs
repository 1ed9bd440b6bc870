use super::{Segment, define_resource_id};

define_resource_id! {
    /// A subscription, the root scope of every other ID.
    SubscriptionId("Subscription") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
        ],
        fields: { subscription_id }
    }
}

define_resource_id! {
    ResourceGroupId("Resource Group") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
        ],
        fields: { subscription_id, resource_group }
    }
}

impl ResourceGroupId {
    pub fn subscription(&self) -> SubscriptionId {
        SubscriptionId::new(&self.subscription_id)
    }
}
