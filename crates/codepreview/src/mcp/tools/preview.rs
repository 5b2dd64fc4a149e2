use crate::prelude::eprintln;
use crate::preview::tool::{input_schema, TOOL_DESCRIPTION, TOOL_NAME};
use codepreview_core::preview::ToolArguments;

use super::{CallToolResult, JsonRpcError, Server, Tool};

pub fn definition() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        input_schema: input_schema(),
    }
}

pub async fn handle_code_preview(
    arguments: Option<serde_json::Value>,
    server: &Server,
) -> Result<serde_json::Value, JsonRpcError> {
    // Absent arguments become an empty object so the tool reports what is missing.
    let args: ToolArguments =
        serde_json::from_value(arguments.unwrap_or_else(|| serde_json::json!({})))
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid arguments: {e}")))?;

    if server.global.verbose {
        eprintln!(
            "Calling code_preview: action={:?}, task_dir={:?}",
            args.action, args.task_dir
        );
    }

    let result = match server.tool.execute(args).await {
        Ok(envelope) => CallToolResult::text(envelope),
        Err(e) => {
            log::warn!("code_preview failed: {e}");
            CallToolResult::error(e.to_string())
        }
    };

    serde_json::to_value(result).map_err(|e| JsonRpcError::internal(format!("Internal error: {e}")))
}
