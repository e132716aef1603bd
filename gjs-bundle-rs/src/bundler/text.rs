//! Text utilities for module sources.
//!
//! Provides BOM stripping and the wrappers that turn JSON or plain text into
//! JavaScript modules exporting that content.

/// Strips the UTF-8 BOM (byte order mark) from the beginning of text if present.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

/// Transforms JSON source code into JavaScript that exports the parsed JSON.
///
/// ```ignore
/// // Input: {"key": "value"}
/// // Output: export default JSON.parse("{\"key\": \"value\"}")
/// ```
pub fn transform_json_source(source: &str) -> String {
    format!("export default JSON.parse(\"{}\")", escape_js_string(source))
}

/// Transforms arbitrary text into a module whose default export is that text.
///
/// The text is embedded as a string literal and is never parsed itself.
pub fn transform_text_source(text: &str) -> String {
    format!("export default \"{}\";\n", escape_js_string(text))
}

/// Escapes a string for safe embedding in a double quoted JavaScript string literal.
fn escape_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            // Line terminators that would end a literal in pre-ES2019 parsers
            '\u{2028}' => result.push_str("\\u2028"),
            '\u{2029}' => result.push_str("\\u2029"),
            // Control characters (U+0000 to U+001F)
            c if c < '\x20' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
