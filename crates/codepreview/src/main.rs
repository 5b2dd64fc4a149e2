use crate::prelude::*;
use clap::Parser;

mod error;
mod mcp;
mod prelude;
mod preview;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate HTML pages with a language model and preview them from coding agents"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "CODEPREVIEW_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    #[clap(flatten)]
    tool: crate::preview::ToolConfig,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate and preview HTML pages
    Preview(crate::preview::App),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Preview(sub_app) => crate::preview::run(sub_app, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
