/// Remove a trailing `#` comment that sits outside double quotes, then
/// right-trim what is left.
///
/// Quotes are not escapable; every `"` toggles the quoted state, so a `#`
/// inside a quoted edge label survives.
pub fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return line[..idx].trim_end(),
            _ => {}
        }
    }
    line.trim_end()
}
