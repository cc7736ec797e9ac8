//! Loading programs and input streams.

use anyhow::Context;
use std::{fs, path::Path};

use crate::error::InputError;

/// Parse a newline separated list of base-10 integers.
///
/// Blank lines are skipped. `source_name` only shows up in errors.
pub fn parse_input(source_name: &str, text: &str) -> Result<Vec<i64>, InputError> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            line.parse::<i64>().map_err(|_| InputError {
                source_name: source_name.to_string(),
                line: line_no,
                text: line.to_string(),
            })
        })
        .collect()
}

/// Read a program source file.
pub fn load_program(path: impl AsRef<Path>) -> anyhow::Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).with_context(|| format!("could not read program {}", path.display()))
}

/// Read and parse an input stream file.
pub fn load_input(path: impl AsRef<Path>) -> anyhow::Result<Vec<i64>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read input {}", path.display()))?;
    Ok(parse_input(&path.display().to_string(), &text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_values() {
        let values = parse_input("in", "1\n-2\n\n  +3 \r\n").unwrap();
        assert_eq!(values, vec![1, -2, 3]);
    }

    #[test]
    fn reject_non_numeric() {
        let err = parse_input("numbers.in", "1\n\ntwo\n3").unwrap_err();
        assert_eq!(
            err,
            InputError {
                source_name: "numbers.in".into(),
                line: 3,
                text: "two".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "[input error: numbers.in line 3] expected an integer, but received: two"
        );
    }

    #[test]
    fn missing_file() {
        let err = load_program("does/not/exist.asm").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.asm"));
    }
}
