use super::error::PreviewError;
use super::types::ModelResponse;

const DOCTYPE_PREFIX: &str = "<!doctype";
const BODY_OPEN: &str = "<body";
const BODY_CLOSE: &str = "</body>";

/// Pull the generated text out of a model response.
///
/// Returns the trimmed text, or `GenerationFailed` when nothing usable came
/// back.
pub fn extract_text(response: ModelResponse) -> Result<String, PreviewError> {
    let text = match response {
        ModelResponse::Message { content } => content.unwrap_or_default(),
        ModelResponse::Text(text) => text,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PreviewError::GenerationFailed(
            "Generated code is empty".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Whether `text` opens with a DOCTYPE declaration (case-insensitive).
pub fn has_doctype(text: &str) -> bool {
    text.get(..DOCTYPE_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(DOCTYPE_PREFIX))
}

/// Whether `text` carries both an opening and a closing body marker.
///
/// The opening marker may carry attributes (`<body class="x">`).
pub fn has_body_markers(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();

    let opens = lower.match_indices(BODY_OPEN).any(|(idx, _)| {
        lower[idx + BODY_OPEN.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c.is_ascii_whitespace())
    });

    opens && lower.contains(BODY_CLOSE)
}

/// Wrap a fragment in a minimal full-document skeleton.
///
/// The fragment lands in the body verbatim.
pub fn wrap_document(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>Generated Page</title>
</head>
<body>
    {fragment}
</body>
</html>"
    )
}

/// Normalize trimmed model output into a document with body markers.
///
/// Text without a DOCTYPE is wrapped; text that already declares one is kept
/// as is. Either way the result must contain `<body>` and `</body>`.
pub fn normalize_document(text: &str) -> Result<String, PreviewError> {
    let document = if has_doctype(text) {
        text.to_string()
    } else {
        wrap_document(text)
    };

    if !has_body_markers(&document) {
        return Err(PreviewError::GenerationFailed(
            "Generated code is missing body tags".to_string(),
        ));
    }

    Ok(document)
}

/// Turn a raw model response into a finished document.
pub fn finalize_response(response: ModelResponse) -> Result<String, PreviewError> {
    let text = extract_text(response)?;
    normalize_document(&text)
}
