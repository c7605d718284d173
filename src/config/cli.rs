use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "studio-cms")]
#[command(about = "Portfolio and team admin API for the studio website")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "studio-cms.toml")]
    pub config: String,

    /// Override the bind address from config
    #[arg(long)]
    pub bind: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}
