use crate::config::ContextLimits;
use crate::core::extension_of;

/// Checks decoded text for binary content.
/// Uses a simple heuristic: looks for a null character in the first
/// `probe_chars` characters.
pub fn looks_binary(text: &str, probe_chars: usize) -> bool {
    text.chars().take(probe_chars).any(|c| c == '\0')
}

/// True when the reference's extension is on the binary denylist.
pub fn has_binary_extension(file: &str, limits: &ContextLimits) -> bool {
    limits.is_binary_extension(&extension_of(file))
}
