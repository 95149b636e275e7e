// src/utils/html.rs

/// Sanitizes user-supplied HTML with ammonia's whitelist: safe formatting tags
/// stay, scripts and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
