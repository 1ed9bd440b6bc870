use std::fmt;
use std::time::Duration;

const MINUTE: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Default upper bound for each operation on a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl ResourceTimeouts {
    /// Same duration for create, update and delete; reads get five minutes.
    pub const fn mutating_minutes(minutes: u64) -> Self {
        Self {
            create: Duration::from_secs(minutes * MINUTE),
            read: Duration::from_secs(5 * MINUTE),
            update: Duration::from_secs(minutes * MINUTE),
            delete: Duration::from_secs(minutes * MINUTE),
        }
    }

    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self::mutating_minutes(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutating_minutes() {
        let timeouts = ResourceTimeouts::mutating_minutes(90);
        assert_eq!(timeouts.for_operation(Operation::Create), Duration::from_secs(5400));
        assert_eq!(timeouts.for_operation(Operation::Update), Duration::from_secs(5400));
        assert_eq!(timeouts.for_operation(Operation::Delete), Duration::from_secs(5400));
        assert_eq!(timeouts.for_operation(Operation::Read), Duration::from_secs(300));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
