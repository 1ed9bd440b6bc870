use super::{Segment, define_resource_id};

define_resource_id! {
    /// A subnet within a virtual network. Caches deployed into a subnet lock
    /// both names while they are created or deleted.
    SubnetId("Subnet") {
        segments: [
            Segment::Static("subscriptions"),
            Segment::Value("subscriptionId"),
            Segment::Static("resourceGroups"),
            Segment::Value("resourceGroupName"),
            Segment::Static("providers"),
            Segment::Static("Microsoft.Network"),
            Segment::Static("virtualNetworks"),
            Segment::Value("virtualNetworkName"),
            Segment::Static("subnets"),
            Segment::Value("subnetName"),
        ],
        fields: { subscription_id, resource_group, virtual_network_name, subnet_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ResourceId;

    #[test]
    fn test_subnet_id_parse() {
        let id = SubnetId::parse(
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/default",
        )
        .unwrap();
        assert_eq!(id.virtual_network_name, "vnet1");
        assert_eq!(id.subnet_name, "default");
    }

    #[test]
    fn test_subnet_id_insensitive_normalizes_casing() {
        // The API echoes subnet IDs back with lower-cased static segments.
        let id = SubnetId::parse_insensitively(
            "/subscriptions/sub1/resourcegroups/rg1/providers/microsoft.network/virtualnetworks/vnet1/subnets/default",
        )
        .unwrap();
        assert_eq!(
            id.to_string(),
            "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/default"
        );
    }

    #[test]
    fn test_subnet_id_strict_rejects_lowercase() {
        assert!(
            SubnetId::parse(
                "/subscriptions/sub1/resourcegroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/default",
            )
            .is_err()
        );
    }
}
