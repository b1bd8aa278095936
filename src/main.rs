//! Toroidal Governance CLI
//!
//! Runs and inspects governance cycles against the configured store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use toroidal_governance::{
    adapters::{FileMemoryAtomSink, FileSessionStore, InMemorySessionStore, TemplateContentGenerator},
    application::CycleOrchestrator,
    config::{GovernanceConfig, StorageBackend},
    domain::clustering::RandomTieBreaker,
    domain::cycle::Cycle,
    domain::foundation::{CycleId, ExplorationId, SessionStatus},
    ports::SessionStore,
    telemetry,
};

#[derive(Parser)]
#[command(name = "toroidal-governance")]
#[command(version)]
#[command(about = "Toroidal Grammar cycle manager")]
struct Cli {
    /// Policy file path; written with defaults if missing
    #[arg(
        short,
        long,
        env = "TOROIDAL_CONFIG",
        default_value = "governance/policies/default.yaml"
    )]
    config: PathBuf,

    /// Seed for content generation and tie-breaking
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new cycle
    Start {
        #[arg(long)]
        name: Option<String>,
    },

    /// Execute the LightFace phase of a cycle
    Lightface { cycle_id: CycleId },

    /// Execute the DarkFace phase of a cycle
    Darkface {
        cycle_id: CycleId,

        /// Exploration to synthesize; defaults to the latest lightface phase
        #[arg(long)]
        exploration: Option<ExplorationId>,
    },

    /// Complete the running phase of a cycle
    CompletePhase { cycle_id: CycleId },

    /// Complete a cycle
    CompleteCycle {
        cycle_id: CycleId,

        #[arg(long)]
        summary: Option<String>,
    },

    /// List cycles
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Run a complete cycle and print its summary (default)
    Simulate {
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Completed,
}

impl From<StatusArg> for SessionStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => SessionStatus::Active,
            StatusArg::Completed => SessionStatus::Completed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if GovernanceConfig::write_default_policy(&cli.config)
        .with_context(|| format!("writing default policy to {}", cli.config.display()))?
    {
        println!("Created default configuration: {}", cli.config.display());
    }
    let config = GovernanceConfig::load_from(Some(&cli.config)).context("loading configuration")?;
    config.validate().context("validating configuration")?;
    telemetry::init(&config.logging).context("installing tracing subscriber")?;

    let orchestrator = build_orchestrator(config, cli.seed);

    match cli.command.unwrap_or(Commands::Simulate { name: None }) {
        Commands::Start { name } => {
            let cycle = orchestrator.start_cycle(name.as_deref()).await?;
            println!("Started cycle {} ({})", cycle.id(), cycle.name());
        }
        Commands::Lightface { cycle_id } => {
            let cycle = orchestrator.execute_lightface_phase(cycle_id).await?;
            print_cycle(&cycle);
        }
        Commands::Darkface {
            cycle_id,
            exploration,
        } => {
            let cycle = orchestrator.execute_darkface_phase(cycle_id, exploration).await?;
            print_cycle(&cycle);
        }
        Commands::CompletePhase { cycle_id } => {
            let cycle = orchestrator.complete_phase(cycle_id).await?;
            print_cycle(&cycle);
        }
        Commands::CompleteCycle { cycle_id, summary } => {
            let cycle = orchestrator.complete_cycle(cycle_id, summary).await?;
            println!("{}", cycle.summary().unwrap_or_default());
        }
        Commands::List { status } => {
            let cycles = orchestrator.list_cycles(status.map(Into::into)).await?;
            println!("Toroidal Cycles ({}):", cycles.len());
            for (i, cycle) in cycles.iter().enumerate() {
                println!();
                println!("{}. {}", i + 1, cycle.id());
                print_cycle(cycle);
            }
        }
        Commands::Simulate { name } => {
            let cycle = orchestrator.run_cycle(name.as_deref()).await?;
            println!("{}", cycle.summary().unwrap_or_default());
        }
    }

    Ok(())
}

fn build_orchestrator(config: GovernanceConfig, seed: Option<u64>) -> CycleOrchestrator {
    let store: Arc<dyn SessionStore> = match config.storage.backend {
        StorageBackend::File => Arc::new(FileSessionStore::new(&config.storage.base_dir)),
        StorageBackend::Memory => Arc::new(InMemorySessionStore::new()),
    };
    let sink = Arc::new(FileMemoryAtomSink::new(config.storage.memory_atoms_dir()));
    let (generator, tie_breaker) = match seed {
        Some(seed) => (
            TemplateContentGenerator::seeded(seed),
            RandomTieBreaker::seeded(seed.wrapping_add(1)),
        ),
        None => (TemplateContentGenerator::new(), RandomTieBreaker::from_entropy()),
    };

    CycleOrchestrator::new(
        config,
        store,
        Arc::new(generator),
        sink,
        Arc::new(tie_breaker),
    )
}

fn print_cycle(cycle: &Cycle) {
    println!("   Name: {}", cycle.name());
    println!("   Status: {}", cycle.status().as_str().to_uppercase());
    println!("   Started: {}", cycle.start_time().date_string());
    println!("   Phases: {}", cycle.phases().len());
    println!("   Current: {}", cycle.current_phase());
}
