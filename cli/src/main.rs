// overlay-cli: topology inspector
//
// Loads a topology description (JSON) and prints what the routing core makes
// of it. Read-only: nothing here feeds back into a running node.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use overlay_core::{
    graph::format, InstanceId, InstanceSessionId, NameFallback, NetworkGraph, NetworkGraphLink,
    NodeNameRegistry, RoutingInformation, TopologyDescription, TopologySettings,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "overlay")]
#[command(about = "Overlay topology and routing inspector", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to <config dir>/overlay/settings.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary and compact representation of a topology
    Show { topology: PathBuf },
    /// Next hop and full route to a node
    Route { topology: PathBuf, target: String },
    /// Broadcast spanning tree from the local node
    Tree { topology: PathBuf },
    /// Graphviz rendering
    Graphviz {
        topology: PathBuf,
        /// Only draw nodes reachable from the local node
        #[arg(short, long)]
        reachable: bool,
        /// Draw the broadcast spanning tree in bold
        #[arg(short, long)]
        tree: bool,
    },
    /// Display names known from the topology
    Names { topology: PathBuf },
    /// Nodes reachable from the local node, with hop counts
    Reachable { topology: PathBuf },
    /// Generate a fresh instance id and session id
    Generate,
    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Print the default settings file path
    Path,
    /// Write default settings to the settings file
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Show { topology } => cmd_show(config_path, &topology),
        Commands::Route { topology, target } => cmd_route(config_path, &topology, &target),
        Commands::Tree { topology } => cmd_tree(config_path, &topology),
        Commands::Graphviz {
            topology,
            reachable,
            tree,
        } => cmd_graphviz(config_path, &topology, reachable, tree),
        Commands::Names { topology } => cmd_names(config_path, &topology),
        Commands::Reachable { topology } => cmd_reachable(config_path, &topology),
        Commands::Generate => cmd_generate(),
        Commands::Config { action } => cmd_config(config_path, action),
    }
}

/// A loaded topology with everything the commands need
struct Loaded {
    description: TopologyDescription,
    graph: Arc<NetworkGraph>,
    names: NodeNameRegistry,
}

impl Loaded {
    fn routing(&self) -> Arc<RoutingInformation> {
        self.graph.routing_information()
    }

    fn label(&self, node: &InstanceSessionId) -> String {
        let name = self.names.display_name_of(node.clone());
        format!("{} ({})", name.bright_cyan(), node.to_string().dimmed())
    }
}

fn load_topology(config_path: Option<&Path>, path: &Path) -> Result<Loaded> {
    let settings = config::load(config_path)?;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read topology file {}", path.display()))?;
    let description = TopologyDescription::from_json_str(&contents)
        .with_context(|| format!("Failed to parse topology file {}", path.display()))?;
    let graph = description
        .build(&settings.routing)
        .context("Topology description is inconsistent")?;

    let names = NodeNameRegistry::new(settings.naming);
    description.register_names(&names);

    Ok(Loaded {
        description,
        graph: Arc::new(graph),
        names,
    })
}

fn cmd_show(config_path: Option<&Path>, topology: &Path) -> Result<()> {
    let loaded = load_topology(config_path, topology)?;

    println!("{}", "Topology".bold());
    println!();
    print!("{}", format::summary(&loaded.graph));
    println!();
    println!("{}", "Compact representation".bold());
    println!("  {}", loaded.graph.compact_representation());
    Ok(())
}

fn print_link(loaded: &Loaded, link: &NetworkGraphLink) {
    println!(
        "  {} --[{}]--> {}",
        loaded.label(&link.source),
        link.link_id.bright_yellow(),
        loaded.label(&link.target)
    );
}

fn cmd_route(config_path: Option<&Path>, topology: &Path, target: &str) -> Result<()> {
    let loaded = load_topology(config_path, topology)?;
    let target: InstanceSessionId = target
        .parse()
        .with_context(|| format!("Invalid target '{}'", target))?;
    let routing = loaded.routing();

    if target == *routing.local_node() {
        println!("{} is the local node", loaded.label(&target));
        return Ok(());
    }

    match routing.next_link_towards(&target) {
        Ok(link) => {
            println!("{}", "Next hop".bold());
            print_link(&loaded, &link);
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            return Ok(());
        }
    }

    let route = routing
        .route_to(&target)
        .context("Route computation failed")?
        .unwrap_or_default();
    println!();
    println!("{} ({} hops)", "Route".bold(), route.len());
    for link in &route {
        print_link(&loaded, link);
    }
    Ok(())
}

fn print_subtree(
    loaded: &Loaded,
    children: &BTreeMap<InstanceSessionId, Vec<NetworkGraphLink>>,
    node: &InstanceSessionId,
    depth: usize,
) {
    for link in children.get(node).map(Vec::as_slice).unwrap_or_default() {
        println!(
            "{}└─[{}]─ {}",
            "  ".repeat(depth + 1),
            link.link_id.bright_yellow(),
            loaded.label(&link.target)
        );
        print_subtree(loaded, children, &link.target, depth + 1);
    }
}

fn cmd_tree(config_path: Option<&Path>, topology: &Path) -> Result<()> {
    let loaded = load_topology(config_path, topology)?;
    let routing = loaded.routing();
    let children = routing.spanning_tree_child_map();

    println!("{}", "Spanning tree".bold());
    println!("  {}", loaded.label(routing.local_node()));
    print_subtree(&loaded, &children, routing.local_node(), 0);
    println!();
    println!(
        "{} links, {} reachable nodes",
        routing.spanning_tree_links().len(),
        routing.reachable_nodes().len()
    );
    Ok(())
}

fn cmd_graphviz(
    config_path: Option<&Path>,
    topology: &Path,
    reachable: bool,
    tree: bool,
) -> Result<()> {
    let loaded = load_topology(config_path, topology)?;
    let graph = if reachable {
        Arc::new(
            loaded
                .graph
                .reduce_to_reachable()
                .context("Failed to reduce topology to reachable nodes")?,
        )
    } else {
        Arc::clone(&loaded.graph)
    };

    let with_names = graph.attach_node_properties(loaded.description.display_names());
    print!("{}", format::to_graphviz(&with_names, tree));
    Ok(())
}

fn cmd_names(config_path: Option<&Path>, topology: &Path) -> Result<()> {
    let loaded = load_topology(config_path, topology)?;

    println!("{} ({} instances)", "Name associations".bold(), loaded.names.len());
    print!("{}", loaded.names.format_all_name_associations());
    println!();
    for node in loaded.graph.node_ids() {
        let resolved = loaded.names.resolve(&node.clone().into(), NameFallback::Absent);
        let mark = if resolved.is_some() { "✓".green() } else { "?".yellow() };
        println!("  {} {}", mark, loaded.label(&node));
    }
    Ok(())
}

fn cmd_reachable(config_path: Option<&Path>, topology: &Path) -> Result<()> {
    let loaded = load_topology(config_path, topology)?;
    let routing = loaded.routing();

    println!(
        "{} ({} of {})",
        "Reachable nodes".bold(),
        routing.reachable_nodes().len(),
        loaded.graph.node_count()
    );
    for node in routing.reachable_nodes() {
        let hops = routing.hop_count(node).unwrap_or_default();
        println!("  {:>3} {}", hops, loaded.label(node));
    }

    let unreachable: Vec<_> = loaded
        .graph
        .node_ids()
        .into_iter()
        .filter(|node| !routing.is_reachable(node))
        .collect();
    if !unreachable.is_empty() {
        println!();
        println!("{} ({})", "Unreachable nodes".bold(), unreachable.len());
        for node in &unreachable {
            println!("   {} {}", "✗".red(), loaded.label(node));
        }
    }
    Ok(())
}

fn cmd_generate() -> Result<()> {
    let instance = InstanceId::generate();
    let session = InstanceSessionId::new_session(&instance);

    println!("Instance: {}", instance.to_string().bright_cyan());
    println!("Session:  {}", session.to_string().bright_yellow());
    Ok(())
}

fn cmd_config(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = config::load(config_path)?;
            println!("{}", settings.to_json_pretty()?);
        }
        ConfigAction::Path => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => config::settings_file()?,
            };
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => config::settings_file()?,
            };
            if path.exists() {
                anyhow::bail!("Settings file already exists: {}", path.display());
            }
            config::save(&TopologySettings::default(), &path)?;
            println!("{} Wrote default settings to {}", "✓".green(), path.display());
        }
    }
    Ok(())
}
