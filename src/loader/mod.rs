//! # Loader
//!
//! Validates a BP file name, reads the file, and turns every line into
//! its AST. Lexing and parsing errors are reported with the one-based
//! line number they occurred on; evaluation only starts once the whole
//! file has parsed.

use std::{error::Error, fmt::Display, fs, path::Path};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::AstNode;
use crate::lexer;
use crate::parser;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
}

impl LoadError {
    fn new(message: impl Into<String>) -> Self {
        LoadError {
            message: message.into(),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for LoadError {}

static FILE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+\.bp$").expect("file name pattern must compile"));

/// Source files must carry the `.bp` extension, case sensitively.
pub fn validate_file_name(name: &str) -> Result<(), LoadError> {
    if FILE_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(LoadError::new(format!(
            "'{name}' is not a BP source file, the .bp extension is required"
        )))
    }
}

/// Read and parse a whole program file.
pub fn load_program(path: &Path) -> Result<Vec<AstNode>, LoadError> {
    validate_file_name(&path.to_string_lossy())?;
    let source = fs::read_to_string(path)
        .map_err(|error| LoadError::new(format!("could not read '{}': {error}", path.display())))?;
    parse_source(&source)
}

/// Parse in-memory source, line by line.
pub fn parse_source(source: &str) -> Result<Vec<AstNode>, LoadError> {
    let mut lines = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let tokens = lexer::tokenize(line)
            .map_err(|error| LoadError::new(format!("line {}: {error}", index + 1)))?;
        let ast = parser::parse_line(&tokens)
            .map_err(|error| LoadError::new(format!("line {}: {error}", index + 1)))?;
        lines.push(ast);
    }
    debug!("parsed {} line(s)", lines.len());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_validation() {
        assert!(validate_file_name("program.bp").is_ok());
        assert!(validate_file_name("dir/program.bp").is_ok());
        assert!(validate_file_name(".bp").is_err());
        assert!(validate_file_name("program.BP").is_err());
        assert!(validate_file_name("program.txt").is_err());
    }

    #[test]
    fn test_parse_source_counts_lines() {
        let program = parse_source("INTEGER a = 1\n\nOUTPUT(a)").unwrap();
        assert_eq!(3, program.len());
    }

    #[test]
    fn test_errors_name_the_offending_line() {
        let error = parse_source("INTEGER a = 1\na ? b").unwrap_err();
        assert!(error.message.starts_with("line 2:"), "{}", error.message);
    }
}
