use std::iter;

/// Appended to every line, including empty ones.
pub const EOS_TOKEN: &str = "<eos>";

/// Drops a trailing line terminator (`\n`, `\r\n` or `\r`).
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Splits a chunk read up to `\n` into lines, treating a bare `\r` as a line
/// end too.
pub fn split_lines(chunk: &str) -> impl Iterator<Item = &str> {
    strip_terminator(chunk).split('\r')
}

// Unicode whitespace plus the ASCII file/group/record/unit separators.
fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ('\x1c'..='\x1f').contains(&ch)
}

/// Splits a line on whitespace and appends [`EOS_TOKEN`].
pub fn tokenize_line(line: &str) -> impl Iterator<Item = &str> {
    line.split(is_separator)
        .filter(|word| !word.is_empty())
        .chain(iter::once(EOS_TOKEN))
}
