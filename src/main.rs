use anyhow::Result;
use clap::Parser;
use tracing::debug;

use shortie::cli::{Cli, Commands, ConfigCommands};
use shortie::config::{get_config, init_config_from};
use shortie::runtime::modes;
use shortie::system::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_config_from(&cli.config);
            let config = get_config();

            // guard 必须存活到进程结束
            let _guard = init_logging(&config.logging)?;
            debug!("Configuration loaded from {}", cli.config);

            modes::run_server(&config).await?;
        }
        Commands::Id { url, length } => {
            init_config_from(&cli.config);
            let length = length.unwrap_or(get_config().id.length);
            if let Err(e) = modes::print_id(&url, length) {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => {
            if let Err(e) = modes::generate_config(output_path, force) {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
