use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webext_pack::{compose, config, output};

#[derive(Parser)]
#[command(name = "webext-pack")]
#[command(about = "Compose bundler configuration for browser extensions")]
#[command(long_about = "\
Compose bundler configuration for browser extensions

The project root holds the environment source, package metadata and an
optional secrets module per profile. The source root holds one script and
one HTML template per surface, plus the manifest template.

Project structure:

  my-extension/
  ├── webext.toml                # Project config (optional)
  ├── .env.toml                  # NODE_ENV and other environment keys (required)
  ├── package.json               # description + version seed the manifest
  ├── secrets.development.js     # Aliased as `secrets` when NODE_ENV=development
  └── src/
      ├── manifest.json          # Manifest template (wins over package.json)
      ├── popup.html             # One HTML shell per entry point
      ├── options.html
      ├── background.html
      └── js/
          ├── popup.js           # Entry points
          ├── options.js
          └── background.js

Run 'webext-pack gen-config' to generate a documented webext.toml.")]
#[command(version)]
struct Cli {
    /// Project root
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log filter (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose the build configuration and print a summary
    Compose {
        /// Print the full configuration as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Print the synthesized manifest.json
    Manifest,
    /// Write the manifest and HTML shells into the output directory
    Render {
        /// Remove the output directory first, even when the config disables it
        #[arg(long)]
        clean: bool,
    },
    /// Report how every source file is handled
    Check,
    /// Print a stock webext.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Command::Compose { json } => {
            let build = compose::compose_project(&cli.root)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&build)?);
            } else {
                output::print_compose_output(&build, &cli.root);
            }
        }
        Command::Manifest => {
            let build = compose::compose_project(&cli.root)?;
            let bytes = build.manifest.run()?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        Command::Render { clean } => {
            let build = compose::compose_project(&cli.root)?;
            let report = compose::render(&build, clean || !build.clean.is_empty())?;
            output::print_render_output(&report, &cli.root);
        }
        Command::Check => {
            let project = config::load_config(&cli.root)?;
            let layout = compose::ProjectLayout::new(&cli.root, &project);
            let build = compose::compose_project(&cli.root)?;
            let reports = compose::check_sources(&build, &layout.source_root)?;
            let missing = compose::missing_inputs(&build);
            output::print_check_output(&reports, &missing, &cli.root);
            if !missing.is_empty() {
                return Err(format!("{} configured input(s) missing", missing.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` overrides `--log-level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
