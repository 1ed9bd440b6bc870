use super::{Segment, define_resource_id};

define_resource_id! {
    /// An HPC Cache.
    CacheId("HPC Cache") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.StorageCache"),
            Segment::Static("caches"),
            Segment::Value("cacheName"),
        ],
        fields: { subscription_id, resource_group, name }
    }
}

define_resource_id! {
    StorageTargetId("HPC Cache Storage Target") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.StorageCache"),
            Segment::Static("caches"),
            Segment::Value("cacheName"),
            Segment::Static("storageTargets"),
            Segment::Value("storageTargetName"),
        ],
        fields: { subscription_id, resource_group, cache_name, name }
    }
}

impl StorageTargetId {
    pub fn cache(&self) -> CacheId {
        CacheId::new(&self.subscription_id, &self.resource_group, &self.cache_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{FormatError, ResourceId};

    #[test]
    fn test_cache_id_parse() {
        let input = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.StorageCache/caches/hpc1";
        let id = CacheId::parse(input).unwrap();
        assert_eq!(id, CacheId::new("sub1", "rg1", "hpc1"));
        assert_eq!(id.to_string(), input);
    }

    #[test]
    fn test_storage_target_id_parent() {
        let id = StorageTargetId::parse(
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.StorageCache/caches/hpc1/storageTargets/blob1",
        )
        .unwrap();
        assert_eq!(id.name, "blob1");
        assert_eq!(id.cache(), CacheId::new("sub1", "rg1", "hpc1"));
    }

    #[test]
    fn test_cache_id_wrong_provider() {
        let err = CacheId::parse(
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Cache/caches/hpc1",
        )
        .unwrap_err();
        assert_eq!(
            err.reason(),
            &FormatError::UnexpectedSegment {
                expected: "Microsoft.StorageCache",
                found: "Microsoft.Cache".to_string()
            }
        );
    }
}
