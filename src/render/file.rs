use crate::render::processor::ContentProcessor;

/// Detect binary content using content_inspector (BOM-aware, null-byte scanning).
///
/// Only the first 8KB are inspected.
pub fn is_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(8192)];
    !content_inspector::inspect(head).is_text()
}

/// Substitute tokens in file content.
///
/// Binary content and text that is not valid UTF-8 are returned unchanged.
pub fn render_content(processor: &ContentProcessor, content: &[u8]) -> Vec<u8> {
    if is_binary(content) {
        return content.to_vec();
    }
    match std::str::from_utf8(content) {
        Ok(text) => processor.process_text(text).into_bytes(),
        Err(_) => content.to_vec(),
    }
}
