//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Shortie - deterministic URL shortener
#[derive(Parser, Debug)]
#[command(name = "shortie")]
#[command(version)]
#[command(about = "Deterministic URL shortener with daily usage statistics", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print the short identifier a URL maps to
    Id {
        /// Target URL
        url: String,

        /// Identifier length (default: id.length from config)
        #[arg(long)]
        length: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["shortie"]).unwrap();
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_id_with_length() {
        let cli = Cli::try_parse_from([
            "shortie",
            "id",
            "https://example.com/data/hi",
            "--length",
            "12",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Id {
                url: "https://example.com/data/hi".to_string(),
                length: Some(12),
            })
        );
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["shortie", "serve", "-c", "/etc/shortie.toml"]).unwrap();
        assert_eq!(cli.config, "/etc/shortie.toml");
        assert_eq!(cli.command, Some(Commands::Serve));
    }

    #[test]
    fn test_config_generate_force() {
        let cli = Cli::try_parse_from(["shortie", "config", "generate", "out.toml", "--force"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Config {
                action: ConfigCommands::Generate {
                    output_path: Some("out.toml".to_string()),
                    force: true,
                }
            })
        );
    }
}
