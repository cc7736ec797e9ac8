use std::str::Lines;

/// Classified source line
#[derive(Debug, Eq, PartialEq)]
pub enum Line<'a> {
    /// Blank line or a line starting with '#'
    Comment,
    /// `name:` optionally followed by a comment
    Label(&'a str),
    /// Anything else, split into tokens
    Code(Vec<&'a str>),
}

/// Walks a program line by line.
pub struct Lexer<'a> {
    lines: Lines<'a>,
    line_no: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(program: &'a str) -> Self {
        Lexer {
            lines: program.lines(),
            line_no: 0,
        }
    }

    /// Get the next line together with its 1-based number.
    pub fn next_line(&mut self) -> Option<(usize, Line<'a>)> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some((self.line_no, classify(tokenize(line))))
    }
}

/// Split on runs of spaces and tabs
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(|ch| ch == ' ' || ch == '\t' || ch == '\r')
        .filter(|token| !token.is_empty())
        .collect()
}

fn classify(tokens: Vec<&str>) -> Line<'_> {
    if is_comment(&tokens) {
        return Line::Comment;
    }
    if let Some(label) = label_name(&tokens) {
        return Line::Label(label);
    }
    Line::Code(tokens)
}

/// True when nothing but a comment is left.
pub fn is_comment(tokens: &[&str]) -> bool {
    tokens.first().map_or(true, |token| token.starts_with('#'))
}

/// Valid identifier: `[a-z_][a-z0-9_]*`
pub fn is_word(word: &str) -> bool {
    let mut chars = word.bytes();
    match chars.next() {
        Some(ch) if ch == b'_' || ch.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|ch| ch == b'_' || ch.is_ascii_lowercase() || ch.is_ascii_digit())
}

fn label_name<'a>(tokens: &[&'a str]) -> Option<&'a str> {
    let first: &'a str = *tokens.first()?;
    let name = first.strip_suffix(':')?;
    if is_word(name) && is_comment(&tokens[1..]) {
        Some(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tokens() {
        assert_eq!(tokenize("\t$0  =\t$1 + 2 \r"), vec!["$0", "=", "$1", "+", "2"]);
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn words() {
        assert!(is_word("loop_2"));
        assert!(is_word("_start"));
        assert!(!is_word("2loop"));
        assert!(!is_word("Loop"));
        assert!(!is_word("lo-op"));
        assert!(!is_word(""));
    }

    #[test]
    fn read_program() {
        let program = r"
            # counts down
            start:   # entry
            $0 = $0 - 1
            Bad:
            end: write $0
        ";

        let mut lexer = Lexer::new(program);

        let lines = vec![
            (1, Line::Comment),
            (2, Line::Comment),
            (3, Line::Label("start")),
            (4, Line::Code(vec!["$0", "=", "$0", "-", "1"])),
            (5, Line::Code(vec!["Bad:"])),
            (6, Line::Code(vec!["end:", "write", "$0"])),
            (7, Line::Comment),
        ];

        for line in lines {
            assert_eq!(Some(line), lexer.next_line());
        }

        // No lines left
        assert_eq!(lexer.next_line(), None);
    }
}
