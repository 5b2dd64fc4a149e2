use crate::prelude::{eprintln, println, *};
use codepreview_core::preview::{ToolArguments, ToolOutput, DEFAULT_LANGUAGE};
use colored::Colorize;

pub mod config;
pub mod model;
pub mod operator;
pub mod tool;

#[cfg(test)]
pub mod testing;

pub use config::{Provider, ToolConfig};
pub use tool::CodePreviewTool;

#[derive(Debug, clap::Parser)]
#[command(name = "preview")]
#[command(about = "Generate and preview HTML pages")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Generate an HTML page from a prompt and save it as <TASK_DIR>/index.html
    #[clap(name = "generate")]
    Generate(GenerateOptions),

    /// Print the saved page of a task directory
    #[clap(name = "show")]
    Show(ShowOptions),
}

#[derive(Debug, clap::Args)]
pub struct GenerateOptions {
    /// Description of the page to generate
    pub prompt: String,

    /// Task directory that receives index.html
    #[arg(long, env = "CODEPREVIEW_TASK_DIR")]
    pub task_dir: String,

    /// Target language (advisory)
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Output the result envelope as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct ShowOptions {
    /// Task directory holding index.html
    #[arg(long, env = "CODEPREVIEW_TASK_DIR")]
    pub task_dir: String,

    /// Output the result envelope as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Workspace root: {}", global.tool.workspace_root.display());
        eprintln!(
            "File operator: {}",
            if global.tool.sandbox {
                f!("sandbox ({})", global.tool.sandbox_container)
            } else {
                "local".to_string()
            }
        );
        eprintln!();
    }

    let tool = global.tool.build_tool()?;

    match app.command {
        Commands::Generate(options) => generate(&tool, options, &global).await,
        Commands::Show(options) => show(&tool, options).await,
    }
}

async fn generate(
    tool: &CodePreviewTool,
    options: GenerateOptions,
    global: &crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!("Provider: {:?}", global.tool.provider);
        eprintln!("Model: {}", global.tool.model);
        eprintln!("Prompt length: {} chars", options.prompt.len());
    }

    let args = ToolArguments {
        action: Some("generate".to_string()),
        prompt: Some(options.prompt),
        language: Some(options.language),
        task_dir: Some(options.task_dir),
    };

    let output = tool.run(args).await.map_err(|e| eyre!(e))?;
    println!("{}", render(&output, options.json)?);

    Ok(())
}

async fn show(tool: &CodePreviewTool, options: ShowOptions) -> Result<()> {
    let args = ToolArguments {
        action: Some("preview".to_string()),
        prompt: None,
        language: None,
        task_dir: Some(options.task_dir),
    };

    let output = tool.run(args).await.map_err(|e| eyre!(e))?;
    println!("{}", render(&output, options.json)?);

    Ok(())
}

/// Text printed for a result: the pretty JSON envelope with `--json`, otherwise
/// a one-line summary for a saved page and the page itself for `show`.
fn render(output: &ToolOutput, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(output).context("Failed to serialize result");
    }

    Ok(match output {
        ToolOutput::Generated(_) => f!(
            "{} {} ({} bytes)",
            "Saved".green().bold(),
            output.file_path(),
            output.code().len()
        ),
        ToolOutput::Previewed(_) => output.code().to_string(),
    })
}
