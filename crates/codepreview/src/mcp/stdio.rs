use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::Server;

pub async fn run_stdio(server: Server) -> Result<()> {
    let verbose = server.global.verbose;
    if verbose {
        eprintln!("Starting MCP server with stdio transport...");
        eprintln!(
            "Task directories must live under {}",
            server.tool.workspace_root().display()
        );
        eprintln!();
    }

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if verbose {
            eprintln!("Received: {trimmed}");
        }

        let response = super::handle_request(trimmed, &server).await;
        let response_json = serde_json::to_string(&response)?;

        if verbose {
            eprintln!("Sending: {response_json}");
        }

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    log::debug!("stdin closed, stopping MCP server");

    Ok(())
}
