//! # Command Line Interface
//!
//! `get` projects a context's secrets, `list clusters` and `show cluster`
//! describe the clusters in the configuration file.

use crate::{
    config::CliConfig,
    context::ContextLoader,
    error::{Result, VaultctlError},
    output::{OutputMode, write_export_file},
    projection::Projector,
    status,
    token::FileTokenProvider,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use vaultctl_common::term;

/// Top-level arguments.
#[derive(Parser, Debug)]
#[command(name = "vaultctl")]
#[command(about = "Resolve Vault secret contexts into environment variables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default is $HOME/.vaultctl/config.hcl)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print or export the secrets of a context
    Get(GetArgs),

    /// List configured Vault clusters
    List {
        /// What to list
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Show details of Vault clusters
    Show {
        /// What to show
        #[command(subcommand)]
        command: ShowCommands,
    },
}

/// `list` targets.
#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List Vault clusters in the vaultctl configuration file
    Clusters,
}

/// `show` targets.
#[derive(Subcommand, Debug)]
pub enum ShowCommands {
    /// Show overview and unseal status of a Vault cluster
    Cluster {
        /// Cluster name
        name: String,
    },
}

/// Arguments of `get`.
#[derive(Args, Debug, Default)]
pub struct GetArgs {
    /// Context to resolve
    pub context: String,

    /// Cluster whose address is used
    #[arg(short, long)]
    pub cluster: Option<String>,

    /// Vault address, overrides --cluster and VAULT_ADDR
    #[arg(long)]
    pub address: Option<String>,

    /// Contexts file (default is ./contexts.hcl)
    #[arg(short = 'f', long)]
    pub context_file: Option<PathBuf>,

    /// Print shell export statements
    #[arg(short, long)]
    pub export: bool,

    /// Write export statements to this file instead of stdout
    #[arg(short, long, requires = "export")]
    pub output: Option<PathBuf>,
}

impl GetArgs {
    /// Pick the Vault address: `--address`, then `--cluster`, then `env_addr`.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unknown cluster, or
    /// [`VaultctlError::NoAddress`] when nothing provides an address.
    pub fn resolve_address(&self, config: &CliConfig, env_addr: Option<String>) -> Result<String> {
        if let Some(address) = &self.address {
            return Ok(address.clone());
        }
        if let Some(cluster) = &self.cluster {
            return Ok(config.vault_address(cluster)?.to_string());
        }
        env_addr
            .filter(|addr| !addr.is_empty())
            .ok_or(VaultctlError::NoAddress)
    }

    /// Output mode selected by `--export`.
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        OutputMode::from_export_flag(self.export)
    }
}

/// Dispatch a parsed command.
///
/// # Errors
///
/// Returns the first fatal error of the command.
pub async fn run(command: Commands, config: &CliConfig) -> Result<()> {
    match command {
        Commands::Get(args) => handle_get(&args, config).await,
        Commands::List {
            command: ListCommands::Clusters,
        } => {
            list_clusters(config);
            Ok(())
        }
        Commands::Show {
            command: ShowCommands::Cluster { name },
        } => show_cluster(&name, config).await,
    }
}

async fn handle_get(args: &GetArgs, config: &CliConfig) -> Result<()> {
    let projector = Projector::new(
        ContextLoader::from_current_dir()?,
        FileTokenProvider::from_default_location(),
    );
    let context = projector.load_context(args.context_file.as_deref(), &args.context)?;
    let address = args.resolve_address(config, std::env::var("VAULT_ADDR").ok())?;
    let projection = projector.project_loaded(&context, &address).await?;

    match &args.output {
        Some(path) => {
            write_export_file(path, &projection.pairs).map_err(|source| {
                VaultctlError::Export {
                    path: path.clone(),
                    source,
                }
            })?;
            term::print_success(format!("Secrets exported to {}", path.display()));
        }
        None => {
            for line in projection.lines(args.mode()) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn list_clusters(config: &CliConfig) {
    for (i, (name, cluster)) in config.clusters.iter().enumerate() {
        if i > 0 {
            println!();
        }
        term::print_header(name);
        term::print_kv_slice("Server(s)", &cluster.servers);
    }
}

async fn show_cluster(name: &str, config: &CliConfig) -> Result<()> {
    let cluster = config.cluster(name)?;
    let Some(server) = cluster.servers.first() else {
        return Err(VaultctlError::NoServers);
    };

    term::print_header("Vault Cluster Status");
    term::print_kv_slice("Server(s)", &cluster.servers);
    status::show_vault_status(server).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn config() -> CliConfig {
        CliConfig::from_hcl(
            r#"
cluster "prod" {
  address = "https://vault.prod:8200"
}
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from([
            "vaultctl", "get", "dev", "--cluster", "prod", "--export", "-f", "ctx.hcl",
        ])
        .unwrap();
        let Commands::Get(args) = cli.command else {
            panic!("expected get");
        };
        assert_eq!(args.context, "dev");
        assert_eq!(args.cluster.as_deref(), Some("prod"));
        assert_eq!(args.context_file, Some(PathBuf::from("ctx.hcl")));
        assert_eq!(args.mode(), OutputMode::Export);
    }

    #[test]
    fn test_output_requires_export() {
        let result = Cli::try_parse_from(["vaultctl", "get", "dev", "--output", "out.env"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_and_show() {
        let cli = Cli::try_parse_from(["vaultctl", "--verbose", "list", "clusters"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::List {
                command: ListCommands::Clusters
            }
        ));

        let cli = Cli::try_parse_from(["vaultctl", "show", "cluster", "prod"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Show { command: ShowCommands::Cluster { ref name } } if name == "prod"
        ));
    }

    #[test]
    fn test_address_precedence() {
        let config = config();
        let env = Some("https://from-env:8200".to_string());

        let args = GetArgs {
            address: Some("https://flag:8200".into()),
            cluster: Some("prod".into()),
            ..Default::default()
        };
        assert_eq!(args.resolve_address(&config, env.clone()).unwrap(), "https://flag:8200");

        let args = GetArgs {
            cluster: Some("prod".into()),
            ..Default::default()
        };
        assert_eq!(
            args.resolve_address(&config, env.clone()).unwrap(),
            "https://vault.prod:8200"
        );

        let args = GetArgs::default();
        assert_eq!(args.resolve_address(&config, env).unwrap(), "https://from-env:8200");
        assert!(matches!(
            args.resolve_address(&config, None),
            Err(VaultctlError::NoAddress)
        ));
    }

    #[test]
    fn test_unknown_cluster_is_fatal() {
        let args = GetArgs {
            cluster: Some("dev".into()),
            ..Default::default()
        };
        assert!(matches!(
            args.resolve_address(&config(), None),
            Err(VaultctlError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_get_reports_unknown_context_before_address() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("contexts.hcl");
        std::fs::write(&file, vaultctl_test_utils::fixtures::SAMPLE_CONTEXTS_HCL).unwrap();

        let args = GetArgs {
            context: "missing".into(),
            context_file: Some(file),
            ..Default::default()
        };
        let err = handle_get(&args, &CliConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            VaultctlError::Context(crate::context::ContextError::ContextNotFound(ref name))
                if name == "missing"
        ));
    }

    #[tokio::test]
    async fn test_show_cluster_without_servers() {
        let err = show_cluster("prod", &config()).await.unwrap_err();
        assert_eq!(err.to_string(), "no Vault servers in configuration");
    }
}
