//! Line-oriented tokenizer for assembler source text.

/// A source token and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text, with any trailing `:` already stripped.
    pub text: String,
    /// 1-based source line number.
    pub line: usize,
}

/// Cut a line off at the `;` comment delimiter.
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Split source lines into whitespace-separated tokens.
///
/// Comments are stripped first; labels may be written with a trailing
/// `:` which is removed here so `LOOP:` and `LOOP` tokenize identically.
pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        for word in strip_comment(line.as_ref()).split_whitespace() {
            let text = word.trim_end_matches(':');
            if text.is_empty() {
                continue;
            }
            tokens.push(Token {
                text: text.to_string(),
                line: index + 1,
            });
        }
    }
    tokens
}
