use super::{Segment, define_resource_id};

define_resource_id! {
    /// A Redis Cache.
    RedisId("Redis") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Cache"),
            Segment::Static("Redis"),
            Segment::Value("redisName"),
        ],
        fields: { subscription_id, resource_group, name }
    }
}

define_resource_id! {
    /// A geo-replication link from one Redis Cache to another.
    LinkedServerId("Redis Linked Server") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Cache"),
            Segment::Static("Redis"),
            Segment::Value("redisName"),
            Segment::Static("linkedServers"),
            Segment::Value("linkedServerName"),
        ],
        fields: { subscription_id, resource_group, redis_name, name }
    }
}

define_resource_id! {
    FirewallRuleId("Redis Firewall Rule") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Cache"),
            Segment::Static("Redis"),
            Segment::Value("redisName"),
            Segment::Static("firewallRules"),
            Segment::Value("firewallRuleName"),
        ],
        fields: { subscription_id, resource_group, redis_name, name }
    }
}

impl LinkedServerId {
    pub fn redis(&self) -> RedisId {
        RedisId::new(&self.subscription_id, &self.resource_group, &self.redis_name)
    }
}

impl FirewallRuleId {
    pub fn redis(&self) -> RedisId {
        RedisId::new(&self.subscription_id, &self.resource_group, &self.redis_name)
    }
}
