//! Injector CLI - check dependency wiring files before wiring them in code

use clap::{Parser, Subcommand, ValueEnum};
use injector::config::{self, WiringConfig};
use injector::ui::{self, table, BindingRow, Icons};
use injector::{depends_on, BuildError, Registry};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "injector")]
#[command(version)]
#[command(about = "Validate dependency wiring - missing references, cycles, construction order")]
#[command(long_about = r#"
Injector reads a TOML wiring file declaring values and bindings:

  [values]
  db_url = "postgres://localhost/app"

  [bindings.pool]
  depends_on = ["db_url"]

and runs the same validation a registry runs at build time.

Example usage:
  injector init
  injector check
  injector order --format json
  injector dependents --name pool
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a wiring file for missing references and cycles
    Check {
        /// Path to the wiring file
        #[arg(short, long, default_value = "injector.toml")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Print the dependency-first construction order
    Order {
        /// Path to the wiring file
        #[arg(short, long, default_value = "injector.toml")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List bindings that directly require a name
    Dependents {
        /// Binding name
        #[arg(short, long)]
        name: String,

        /// Path to the wiring file
        #[arg(short, long, default_value = "injector.toml")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write a sample wiring file
    Init {
        /// Where to write the wiring file
        #[arg(short, long, default_value = "injector.toml")]
        config: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn is_human(self) -> bool {
        self == OutputFormat::Text
    }
}

fn emit_json(command: &str, ok: bool, data: serde_json::Value) -> anyhow::Result<()> {
    let envelope = serde_json::json!({
        "command": command,
        "ok": ok,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Check { config, format } => run_check(&config, format),
        Commands::Order { config, format } => run_order(&config, format),
        Commands::Dependents { name, config, format } => run_dependents(&name, &config, format),
        Commands::Init { config, force } => {
            config::write_config(&config, &WiringConfig::sample(), force)?;
            ui::success(&format!("Wrote sample wiring to {}", config.display()));
            Ok(())
        }
    }
}

fn load(path: &Path) -> anyhow::Result<WiringConfig> {
    match config::load_config(Some(path))? {
        Some(config) => Ok(config),
        None => anyhow::bail!(
            "no wiring file at {} (run `injector init` to create one)",
            path.display()
        ),
    }
}

/// Registry mirroring the file: real values, placeholder producers for bindings
fn placeholder_registry(config: &WiringConfig) -> anyhow::Result<Registry> {
    let mut registry = Registry::new();
    registry.register_config_values(config)?;
    for (name, spec) in &config.bindings {
        let dependencies: Vec<&str> = spec.depends_on.iter().map(String::as_str).collect();
        registry.register_dependant(name.clone(), depends_on(&dependencies, |_| ()), spec.lifetime)?;
    }
    Ok(registry)
}

fn run_check(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let config = load(path)?;
    let registry = placeholder_registry(&config)?;
    let graph = registry.dependency_graph();
    let stats = graph.stats();
    let outcome = registry.build();
    tracing::debug!("Check of {} finished: {:?}", path.display(), outcome);

    if format.is_human() {
        ui::header(&format!("Checking {}", path.display()));
        ui::info("Declared", &format!("{} values, {} bindings", config.values.len(), config.bindings.len()));
        if graph.is_empty() {
            ui::warn("wiring declares nothing");
        }
        if !injector::output::is_quiet() {
            println!("{}", table::stats_table(&stats));
        }

        for (binding, dependency) in graph.missing_dependencies() {
            ui::error(&format!("{} requires unregistered {}", binding, dependency));
        }
        let cyclic = graph.cyclic_bindings();
        if !cyclic.is_empty() {
            ui::error(&format!("{} blocked by a cycle: {}", Icons::CYCLE, cyclic.join(", ")));
        }
    } else {
        let missing: Vec<_> = graph
            .missing_dependencies()
            .into_iter()
            .map(|(binding, dependency)| serde_json::json!({ "binding": binding, "dependency": dependency }))
            .collect();
        emit_json(
            "check",
            outcome.is_ok(),
            serde_json::json!({
                "stats": stats,
                "missing": missing,
                "cyclic": graph.cyclic_bindings(),
            }),
        )?;
    }

    match outcome {
        Ok(injector) => {
            if format.is_human() {
                ui::success(&format!("{} bindings wired correctly", injector.len()));
            }
            Ok(())
        }
        Err(err @ BuildError::MissingDependency { .. }) => {
            anyhow::bail!("wiring has missing references: {}", err)
        }
        Err(err @ BuildError::CircularDependency { .. }) => {
            anyhow::bail!("wiring has cycles: {}", err)
        }
    }
}

fn run_order(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let config = load(path)?;
    let graph = config.dependency_graph();

    if graph.has_missing_dependencies() {
        anyhow::bail!("wiring has missing references (see `injector check`)");
    }
    let Some(order) = graph.topological_order() else {
        anyhow::bail!(
            "wiring has cycles among: {}",
            graph.cyclic_bindings().join(", ")
        );
    };

    let rows = BindingRow::from_order(&config, &order);
    if format.is_human() {
        ui::header(&format!("Construction order for {}", path.display()));
        if !injector::output::is_quiet() {
            println!("{}", table::bindings_table(&rows));
        }
    } else {
        emit_json("order", true, serde_json::to_value(&rows)?)?;
    }
    Ok(())
}

fn run_dependents(name: &str, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let config = load(path)?;
    let graph = config.dependency_graph();

    if !graph.contains(name) {
        anyhow::bail!("{} is not declared in {}", name, path.display());
    }
    let dependents = graph.dependents(name);

    if format.is_human() {
        ui::section(&format!(" {} {} ", Icons::LINK, name));
        if dependents.is_empty() {
            ui::summary_row("∅", "nothing depends on it");
        }
        for dependent in &dependents {
            let lifetime = config.lifetime(dependent).unwrap_or_default();
            ui::summary_row(Icons::RIGHT, &format!("{} {}", dependent, ui::muted(lifetime.as_str())));
        }
    } else {
        emit_json("dependents", true, serde_json::json!({ "name": name, "dependents": dependents }))?;
    }
    Ok(())
}
