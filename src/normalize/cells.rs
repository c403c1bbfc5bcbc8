//! Cell text cleanup.

/// Replace every CR/LF sequence with one space.
///
/// `"a\r\nb"`, `"a\rb"` and `"a\n\nb"` all become `"a b"`.
pub fn strip_line_breaks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_break = false;
    for c in s.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// Replace tabs with a space and drop every other control character.
pub fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Returns `true` if `s` contains a character the enabled cleanup steps would change.
pub(crate) fn needs_cleanup(s: &str, line_breaks: bool, control: bool) -> bool {
    s.chars().any(|c| {
        (line_breaks && (c == '\r' || c == '\n')) || (control && c.is_control())
    })
}
