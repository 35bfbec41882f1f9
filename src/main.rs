// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube::{Client, ResourceExt};
use operator_e2e::{
    affinity::build_affinity_config,
    components::{find_component_pod, ComponentPod, ControlPlaneComponent},
    config::E2eConfig,
    constants::TOKIO_WORKER_THREADS,
    logging,
    nodes::NodeSelector,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

/// E2e helper commands for the database operator test suite
#[derive(Parser, Debug)]
#[command(name = "e2e-util", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the pod anti-affinity config for a cluster
    Affinity {
        /// Database cluster name
        #[arg(long)]
        cluster: String,
        /// Namespace the cluster runs in
        #[arg(long)]
        namespace: String,
    },
    /// Print one random node from the configured node groups
    SelectNode {
        /// E2e config file with a `nodes` list
        #[arg(long)]
        config: PathBuf,
        /// Seed for a reproducible choice (overrides the config and E2E_RANDOM_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the control-plane pod of a component scheduled on a node
    ComponentPod {
        /// Kubernetes node name
        #[arg(long)]
        node: String,
        /// Control-plane component
        #[arg(long, value_enum)]
        component: ControlPlaneComponent,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("e2e-util")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<ExitCode> {
    logging::init();
    debug!("Logging initialized with file and line number tracking");

    match cli.command {
        Command::Affinity { cluster, namespace } => {
            let config = build_affinity_config(&cluster, &namespace)?;
            print!("{config}");
            Ok(ExitCode::SUCCESS)
        }
        Command::SelectNode { config, seed } => {
            let e2e_config = E2eConfig::from_file(&config)?.apply_env();
            let mut selector = match seed {
                Some(seed) => NodeSelector::from_seed(seed),
                None => e2e_config.node_selector(),
            };
            let node = selector.select(&e2e_config.nodes)?;
            println!("{node}");
            Ok(ExitCode::SUCCESS)
        }
        Command::ComponentPod { node, component } => {
            debug!("Initializing Kubernetes client");
            let client = Client::try_default()
                .await
                .context("failed to create Kubernetes client")?;

            match find_component_pod(&client, &node, component.label()).await? {
                ComponentPod::Found(pod) => {
                    info!(component = %component, node = %node, "Found component pod");
                    println!("{}", pod.name_any());
                    Ok(ExitCode::SUCCESS)
                }
                ComponentPod::NotFound => {
                    warn!(component = %component, node = %node, "No component pod on node");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
