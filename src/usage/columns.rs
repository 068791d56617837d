//! Two-column text alignment.

/// Align `rows` into two columns.
///
/// Every left cell is padded to the widest left cell, followed by `gap`
/// spaces and the right cell as-is. Each line starts with `indent`
/// spaces and ends with a newline. No wrapping is done.
pub fn columnize<L, R>(rows: &[(L, R)], indent: usize, gap: usize) -> String
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    let width = rows
        .iter()
        .map(|(left, _)| display_width(left.as_ref()))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (left, right) in rows {
        let left = left.as_ref();
        out.push_str(&" ".repeat(indent));
        out.push_str(left);
        out.push_str(&" ".repeat(width - display_width(left) + gap));
        out.push_str(right.as_ref());
        out.push('\n');
    }
    out
}

/// Width of `text` in terminal columns, ignoring ANSI escapes.
pub fn display_width(text: &str) -> usize {
    console::measure_text_width(text)
}
