use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "fvkit",
    about = "Find and edit files in a decoded UEFI firmware tree",
    version,
    after_help = "Commands are chained: each name is followed by its own arguments.\n\
                  Example: fvkit tree.json find shell replace_raw <GUID> payload.bin count"
)]
pub struct Cli {
    /// Decoded firmware tree (JSON)
    #[arg(required_unless_present = "list")]
    pub tree: Option<PathBuf>,

    /// Command chain to run over the tree
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub commands: Vec<String>,

    /// Write the edited tree here (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the assembled image bytes here
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Refuse to replace unless exactly one file matches
    #[arg(long)]
    pub strict: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List the available commands and exit
    #[arg(long)]
    pub list: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for fvkit_visitors::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}
