mod cli;
mod output;

use std::path::Path;
use std::time::Duration;

use azrm::ids::ParseMode;
use azrm::provisioning::state_at;
use azrm::resource::{PROVISIONING_STATE_POINTER, ResourceDefinition};
use azrm::terraform::state::TerraformState;
use azrm::{AzrmError, AzureProvider, Lifecycle, Operation, ProviderError};
use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConnectionArgs, IdCommand, ParseArgs, StateCommand};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli.command).await?;

    Ok(())
}

async fn run(command: Command) -> Result<(), AzrmError> {
    match command {
        Command::Id { command } => match command {
            IdCommand::Parse(args) => parse_id(&args)?,
            IdCommand::Types => {
                println!("{}", output::registry_tree(azrm::supported_resources()));
            }
        },
        Command::Status(args) => {
            let def = definition(&args.resource_type)?;
            let provider = provider(&args.connection)?;
            match Lifecycle::new(&provider).read_or_remove(def, &args.id).await? {
                Some(model) => {
                    let state = state_at(&model, PROVISIONING_STATE_POINTER)
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!("{}: {}", args.id, state);
                }
                None => println!("{}: not found", args.id),
            }
        }
        Command::Wait(args) => {
            let operation = Operation::from(args.operation);
            let mut def = definition(&args.target.resource_type)?.clone();
            if let Some(secs) = args.timeout_secs {
                let timeout = Duration::from_secs(secs);
                match operation {
                    Operation::Update => def.timeouts.update = timeout,
                    _ => def.timeouts.create = timeout,
                }
            }
            let provider = provider(&args.target.connection)?;
            let model = Lifecycle::new(&provider)
                .wait(&def, &args.target.id, operation)
                .await?;
            tracing::info!(id = %args.target.id, %operation, "resource settled");
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        Command::Create(args) => {
            let def = definition(&args.target.resource_type)?;
            let body = read_body(&args.body)?;
            let provider = provider(&args.target.connection)?;
            let model = Lifecycle::new(&provider)
                .create(def, &args.target.id, &body)
                .await?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        Command::Delete(args) => {
            let def = definition(&args.resource_type)?;
            let provider = provider(&args.connection)?;
            Lifecycle::new(&provider).delete(def, &args.id).await?;
            println!("{}: deleted", args.id);
        }
        Command::State { command } => match command {
            StateCommand::Audit(args) => {
                let state = TerraformState::load(&args.path)?;
                let audits = state.audit_ids();
                println!("{}", output::audit_table(&audits));

                let invalid = audits.iter().filter(|a| !a.is_valid()).count();
                tracing::info!(checked = audits.len(), invalid, "audit complete");
                if invalid > 0 {
                    return Err(AzrmError::InvalidIds {
                        invalid,
                        total: audits.len(),
                    });
                }
            }
        },
    }

    Ok(())
}

fn definition(name: &str) -> Result<&'static ResourceDefinition, ProviderError> {
    azrm::lookup(name).ok_or_else(|| ProviderError::UnknownResourceType(name.to_string()))
}

fn provider(connection: &ConnectionArgs) -> Result<AzureProvider, ProviderError> {
    AzureProvider::new(connection.token.clone(), Some(connection.endpoint.clone()))
}

fn read_body(path: &Path) -> Result<serde_json::Value, AzrmError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn parse_id(args: &ParseArgs) -> Result<(), AzrmError> {
    let mode = if args.insensitive {
        ParseMode::Insensitive
    } else {
        ParseMode::Strict
    };

    if let Some(name) = &args.resource_type {
        let def = definition(name)?;
        let parsed = def.parse(&args.id, mode)?;
        println!("{}", output::segments_table(def.name, &parsed));
        return Ok(());
    }

    let mut matched = false;
    for def in azrm::supported_resources() {
        match def.parse(&args.id, mode) {
            Ok(parsed) => {
                matched = true;
                println!("{}", output::segments_table(def.name, &parsed));
            }
            Err(err) => tracing::debug!(resource_type = def.name, %err, "no match"),
        }
    }

    if !matched {
        return Err(AzrmError::NoMatchingLayout(args.id.clone()));
    }
    Ok(())
}
