use std::path::PathBuf;

use azrm::Operation;
use azrm::providers::azure::ARM_ENDPOINT;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Work with resource IDs offline.
    Id {
        #[command(subcommand)]
        command: IdCommand,
    },
    /// Show the current provisioning state of a resource.
    Status(ResourceArgs),
    /// Wait for a resource to settle after a create or update.
    Wait(WaitArgs),
    /// Create a resource from a JSON body and wait for it.
    Create(CreateArgs),
    /// Delete a resource and wait until it is gone.
    Delete(ResourceArgs),
    /// Inspect Terraform state files.
    State {
        #[command(subcommand)]
        command: StateCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum IdCommand {
    /// Parse an ID and print its segments.
    Parse(ParseArgs),
    /// List the supported resource types and their ID layouts.
    Types,
}

#[derive(Subcommand, Debug)]
pub enum StateCommand {
    /// Validate every supported resource ID in a state file.
    Audit(AuditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    pub id: String,

    /// Resource type to parse as. Every supported type is tried when omitted.
    #[arg(long = "type")]
    pub resource_type: Option<String>,

    /// Accept static segments in any casing.
    #[arg(long)]
    pub insensitive: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConnectionArgs {
    #[arg(long, env = "ARM_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "ARM_ENDPOINT", default_value = ARM_ENDPOINT)]
    pub endpoint: String,
}

#[derive(clap::Args, Debug)]
pub struct ResourceArgs {
    pub id: String,

    #[arg(long = "type")]
    pub resource_type: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOperation {
    Create,
    Update,
}

impl From<WaitOperation> for Operation {
    fn from(op: WaitOperation) -> Self {
        match op {
            WaitOperation::Create => Operation::Create,
            WaitOperation::Update => Operation::Update,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct WaitArgs {
    #[command(flatten)]
    pub target: ResourceArgs,

    #[arg(long, value_enum, default_value_t = WaitOperation::Create)]
    pub operation: WaitOperation,

    /// Overrides the resource type's default timeout.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: ResourceArgs,

    /// Path to the JSON request body.
    #[arg(long)]
    pub body: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct AuditArgs {
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    const REDIS: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Cache/Redis/redis1";

    #[test]
    fn test_id_parse_args() {
        let cli = Cli::parse_from(["azrm", "id", "parse", REDIS, "--insensitive"]);

        if let Command::Id {
            command: IdCommand::Parse(args),
        } = cli.command
        {
            assert_eq!(args.id, REDIS);
            assert!(args.insensitive);
            assert!(args.resource_type.is_none());
        } else {
            panic!("Expected Id Parse command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_wait_defaults_to_create() {
        let cli = Cli::parse_from([
            "azrm",
            "wait",
            REDIS,
            "--type=azurerm_redis_cache",
            "--token=t",
        ]);

        if let Command::Wait(args) = cli.command {
            assert_eq!(args.operation, WaitOperation::Create);
            assert_eq!(args.timeout_secs, None);
            assert_eq!(args.target.resource_type, "azurerm_redis_cache");
        } else {
            panic!("Expected Wait command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_wait_update_with_timeout() {
        let cli = Cli::parse_from([
            "azrm",
            "wait",
            REDIS,
            "--type=azurerm_redis_cache",
            "--operation=update",
            "--timeout-secs=120",
        ]);

        if let Command::Wait(args) = cli.command {
            assert_eq!(Operation::from(args.operation), Operation::Update);
            assert_eq!(args.timeout_secs, Some(120));
        } else {
            panic!("Expected Wait command, got {:?}", cli.command);
        }
    }

    #[test]
    fn test_create_requires_body() {
        let result = Cli::try_parse_from(["azrm", "create", REDIS, "--type=azurerm_redis_cache"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_state_audit_path() {
        let cli = Cli::parse_from(["azrm", "state", "audit", "terraform.tfstate"]);

        if let Command::State {
            command: StateCommand::Audit(args),
        } = cli.command
        {
            assert_eq!(args.path, PathBuf::from("terraform.tfstate"));
        } else {
            panic!("Expected State Audit command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_no_token_and_default_endpoint() {
        let token_backup = std::env::var("ARM_ACCESS_TOKEN").ok();
        let endpoint_backup = std::env::var("ARM_ENDPOINT").ok();
        unsafe {
            std::env::remove_var("ARM_ACCESS_TOKEN");
            std::env::remove_var("ARM_ENDPOINT");
        }

        let cli = Cli::parse_from(["azrm", "status", REDIS, "--type=azurerm_redis_cache"]);

        unsafe {
            if let Some(token) = token_backup {
                std::env::set_var("ARM_ACCESS_TOKEN", token);
            }
            if let Some(endpoint) = endpoint_backup {
                std::env::set_var("ARM_ENDPOINT", endpoint);
            }
        }

        if let Command::Status(args) = cli.command {
            assert!(args.connection.token.is_none());
            assert_eq!(args.connection.endpoint, "https://management.azure.com");
        } else {
            panic!("Expected Status command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_cli_flag_takes_precedence_over_env() {
        let token_backup = std::env::var("ARM_ACCESS_TOKEN").ok();

        unsafe {
            std::env::set_var("ARM_ACCESS_TOKEN", "env_token");
        }

        let cli = Cli::parse_from([
            "azrm",
            "delete",
            REDIS,
            "--type=azurerm_redis_cache",
            "--token=cli_token",
        ]);

        unsafe {
            match token_backup {
                Some(token) => std::env::set_var("ARM_ACCESS_TOKEN", token),
                None => std::env::remove_var("ARM_ACCESS_TOKEN"),
            }
        }

        if let Command::Delete(args) = cli.command {
            assert_eq!(args.connection.token, Some("cli_token".to_string()));
        } else {
            panic!("Expected Delete command, got {:?}", cli.command);
        }
    }

    #[test]
    #[serial]
    fn test_endpoint_from_env_var_fallback() {
        let endpoint_backup = std::env::var("ARM_ENDPOINT").ok();

        unsafe {
            std::env::set_var("ARM_ENDPOINT", "https://management.chinacloudapi.cn");
        }

        let cli = Cli::parse_from(["azrm", "status", REDIS, "--type=azurerm_redis_cache"]);

        unsafe {
            match endpoint_backup {
                Some(endpoint) => std::env::set_var("ARM_ENDPOINT", endpoint),
                None => std::env::remove_var("ARM_ENDPOINT"),
            }
        }

        if let Command::Status(args) = cli.command {
            assert_eq!(args.connection.endpoint, "https://management.chinacloudapi.cn");
        } else {
            panic!("Expected Status command, got {:?}", cli.command);
        }
    }
}
