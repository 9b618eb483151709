//! Trellis CLI - compile a YAML site description into frontend manifests.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use trellis_schema::DEFAULT_CONFIG_FILE;

mod commands;
mod error;
mod installer;

use commands::init::InitTemplate;
use error::exit_code;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Compile a YAML site description and Markdown docs into frontend manifests")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the site configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Use the built-in theme palettes instead of fetching the registry
    #[arg(long, global = true)]
    offline: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration
    Init {
        /// Starter layout to use
        #[arg(short, long, value_enum, default_value_t = InitTemplate::Minimal)]
        template: InitTemplate,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Check the configuration and report every problem
    Validate,

    /// Compile manifests into the output directory
    Build {
        /// Output directory for manifests
        #[arg(short, long, default_value = "aiui")]
        output: PathBuf,

        /// Write compact JSON and CSS
        #[arg(long)]
        minify: bool,

        /// Pre-built frontend bundle to copy into the output
        #[arg(long, env = "TRELLIS_FRONTEND_DIR")]
        frontend: Option<PathBuf>,
    },

    /// Build, serve, and rebuild on every change
    Dev {
        /// Output directory for manifests
        #[arg(short, long, default_value = "aiui")]
        output: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        /// Pre-built frontend bundle to copy into the output
        #[arg(long, env = "TRELLIS_FRONTEND_DIR")]
        frontend: Option<PathBuf>,
    },

    /// Preview the compiled site
    Serve {
        /// Output directory to serve
        #[arg(short, long, default_value = "aiui")]
        output: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Serve the existing output without rebuilding
        #[arg(long)]
        no_build: bool,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        /// Pre-built frontend bundle to copy into the output
        #[arg(long, env = "TRELLIS_FRONTEND_DIR")]
        frontend: Option<PathBuf>,
    },

    /// List available theme presets
    Themes,

    /// Report or install the shadcn components the site depends on
    Components {
        /// Frontend project containing src/components/ui
        #[arg(long, default_value = "frontend")]
        frontend: PathBuf,

        /// Install missing components with npx
        #[arg(long)]
        install: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let themes = commands::theme_cache(cli.offline);

    match cli.command {
        Commands::Init { template, force } => {
            commands::init::run(&cli.config, template, force)?;
        }
        Commands::Validate => {
            commands::validate::run(&cli.config)?;
        }
        Commands::Build {
            output,
            minify,
            frontend,
        } => {
            commands::build::run(&cli.config, &output, minify, frontend, &themes)?;
        }
        Commands::Dev {
            output,
            port,
            no_open,
            frontend,
        } => {
            commands::dev::run(cli.config, output, port, !no_open, frontend, themes).await?;
        }
        Commands::Serve {
            output,
            port,
            no_build,
            no_open,
            frontend,
        } => {
            let options = commands::serve::ServeOptions {
                output,
                port,
                build: !no_build,
                open: !no_open,
                frontend,
            };
            commands::serve::run(&cli.config, options, &themes).await?;
        }
        Commands::Themes => {
            commands::themes::run(&themes);
        }
        Commands::Components { frontend, install } => {
            commands::components::run(&cli.config, &frontend, install)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_defaults() {
        let cli = Cli::try_parse_from(["trellis", "build"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("trellis.yaml"));
        match cli.command {
            Commands::Build { output, minify, .. } => {
                assert_eq!(output, PathBuf::from("aiui"));
                assert!(!minify);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn accepts_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["trellis", "serve", "-c", "site/trellis.yaml", "--no-build"])
            .unwrap();

        assert_eq!(cli.config, PathBuf::from("site/trellis.yaml"));
        match cli.command {
            Commands::Serve { port, no_build, .. } => {
                assert_eq!(port, 8000);
                assert!(no_build);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_init_template() {
        let cli = Cli::try_parse_from(["trellis", "init", "--template", "marketing", "--force"])
            .unwrap();

        match cli.command {
            Commands::Init { template, force } => {
                assert_eq!(template, InitTemplate::Marketing);
                assert!(force);
            }
            _ => panic!("expected init"),
        }
    }
}
