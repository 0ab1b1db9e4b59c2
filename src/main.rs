use clap::Parser;
use page_autofill::cli::commands::{FillArgs, cmd_collect, cmd_fill, cmd_forms};
use page_autofill::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Collect { document, output } => {
            cmd_collect(&document, output.as_deref(), &config)?;
        }
        Commands::Fill {
            document,
            snapshot,
            credential,
            tab_url,
            totp_code,
            trace,
        } => {
            let args = FillArgs {
                document: document.as_deref(),
                snapshot: snapshot.as_deref(),
                credential: &credential,
                tab_url: tab_url.as_deref(),
                totp_code: totp_code.as_deref(),
                trace: trace.as_deref(),
            };
            cmd_fill(&args, &config)?;
        }
        Commands::Forms { document } => {
            cmd_forms(&document, &config)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step from warn.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
