use clap::Parser;
use lead_forms::cli::commands::{cmd_format, cmd_load_more, cmd_submit};
use lead_forms::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Format { raw, rule, paste } => {
            let complete = cmd_format(&config, &raw, rule.as_deref(), paste)?;
            if !complete {
                std::process::exit(1);
            }
        }
        Commands::Submit {
            form,
            phone,
            fields,
            endpoint,
            csrf_token,
        } => {
            let accepted = cmd_submit(
                &config,
                &form,
                phone.as_deref(),
                &fields,
                endpoint.as_deref(),
                csrf_token.as_deref(),
                cli.verbose,
            )?;
            if !accepted {
                std::process::exit(1);
            }
        }
        Commands::LoadMore {
            endpoint,
            offset,
            pages,
            page_size,
        } => {
            cmd_load_more(&config, &endpoint, offset, pages, page_size, cli.verbose)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` steps warn -> info -> debug -> trace.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
