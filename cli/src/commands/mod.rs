pub mod ask;
pub mod languages;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "classics-guide",
    author,
    version,
    about = "Reading guides and translations for classical Chinese texts",
    long_about = "Streams a reading guide or translation of a classical Chinese passage from \
                  the inference service.\n\nCredentials come from XINGHUO_API_KEY, \
                  XINGHUO_API_SECRET and XINGHUO_APP_ID, or from the [credentials] section \
                  of a --config file."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Configuration file (TOML or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Print the session outcome as JSON")]
    pub json: bool,

    #[arg(long, global = true, help = "Milliseconds allowed for the connection to become ready")]
    pub timeout_ms: Option<u64>,

    #[arg(long, global = true, help = "Extra attempts after a timeout or transport failure")]
    pub retries: Option<u32>
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Stream a structured reading guide for a passage")]
    Guide(ask::AskArgs),

    #[command(about = "Translate a passage into the target language")]
    Translate(ask::AskArgs),

    #[command(about = "List the languages with dedicated instructions")]
    Languages(languages::LanguagesArgs)
}
