mod commands;

use clap::{Parser, Subcommand};
use hostflow_core::DeployMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hostflow")]
#[command(about = "Deploy target inventory for multi-host rollouts", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage hosts
    #[command(subcommand)]
    Host(HostCommands),
    /// Manage deploy groups
    #[command(subcommand)]
    Group(GroupCommands),
    /// Place catalog services in deploy groups
    #[command(subcommand)]
    Service(ServiceCommands),
    /// Print the dynamic inventory document
    Inventory {
        /// Print the whole document (the default)
        #[arg(long, conflicts_with = "host")]
        list: bool,
        /// Print the variables of a single host
        #[arg(long)]
        host: Option<String>,
        /// Only keep these hosts in group host lists
        #[arg(long, value_delimiter = ',')]
        hosts: Option<Vec<String>>,
        /// Only keep hosts of these deploy groups
        #[arg(long, value_delimiter = ',')]
        groups: Option<Vec<String>>,
    },
    /// Switch between remote (SSH) and local deployment
    SetDeploy {
        /// local or remote
        mode: DeployMode,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum HostCommands {
    /// Register a host
    Add {
        /// Host name or address
        host: String,
    },
    /// Remove a host from every group and from the inventory
    Remove {
        host: String,
    },
    /// List hosts and the groups they belong to
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Set a host variable
    SetVar {
        host: String,
        key: String,
        value: String,
    },
    /// Check that a host accepts the deploy key
    Check {
        host: String,
    },
    /// Authorize the deploy key on one host or on every host of a setup file
    Setup {
        /// Host to set up (conflicts with --file)
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        host: Option<String>,
        /// Bootstrap password for the host
        #[arg(long, env = "HOSTFLOW_HOST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Bootstrap login user
        #[arg(long, default_value = "root")]
        user: String,
        /// YAML file mapping hosts to credentials
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Revoke the deploy key on a host
    Teardown {
        host: String,
        /// Bootstrap password for the host
        #[arg(long, env = "HOSTFLOW_HOST_PASSWORD", hide_env_values = true)]
        password: String,
        /// Bootstrap login user
        #[arg(long, default_value = "root")]
        user: String,
    },
}

#[derive(Subcommand)]
enum GroupCommands {
    /// Create a group (or refresh its SSH settings)
    Add {
        group: String,
    },
    /// Remove a group and everything below it
    Remove {
        group: String,
    },
    /// Add a registered host to a group
    AddHost {
        group: String,
        host: String,
    },
    /// Remove a host from a group
    RemoveHost {
        group: String,
        host: String,
    },
    /// List the hosts of every group
    ListHosts {
        #[arg(long)]
        json: bool,
    },
    /// List the services of every group
    ListServices {
        #[arg(long)]
        json: bool,
    },
    /// Set a group variable
    SetVar {
        group: String,
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Place a service in a group
    AddGroup {
        service: String,
        group: String,
    },
    /// Take a service out of a group
    RemoveGroup {
        service: String,
        group: String,
    },
    /// List every catalog service and the groups it is placed in
    List {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries the inventory document, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Version needs no inventory
    if matches!(cli.command, Commands::Version) {
        println!("hostflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut ctx = commands::Context::load()?;

    match cli.command {
        Commands::Host(cmd) => commands::host::handle(cmd, &mut ctx).await?,
        Commands::Group(cmd) => commands::group::handle(cmd, &mut ctx)?,
        Commands::Service(cmd) => commands::service::handle(cmd, &mut ctx)?,
        Commands::Inventory {
            list: _,
            host,
            hosts,
            groups,
        } => commands::inventory::handle(&ctx, host.as_deref(), hosts, groups)?,
        Commands::SetDeploy { mode } => commands::inventory::set_deploy(&mut ctx, mode)?,
        Commands::Version => unreachable!("Version is handled before the inventory is loaded"),
    }

    Ok(())
}
