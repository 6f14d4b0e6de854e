//! CLI entry point - the composition root.

use anyhow::Context;
use clap::Parser;

use corral_cli::handlers::exec::ExecArgs;
use corral_cli::{Cli, Commands, bootstrap, handlers, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = bootstrap(&cli).context("Failed to initialize corral")?;

    let result = match cli.command {
        Commands::Exec {
            config_file,
            raw,
            command,
            args,
        } => {
            let args = ExecArgs {
                config_file: config_file.as_deref(),
                raw,
                command,
                args,
            };
            handlers::exec::execute(&ctx, args).await
        }
        Commands::Serve { config_file, raw } => {
            handlers::serve::execute(&ctx, config_file.as_deref(), raw).await
        }
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
