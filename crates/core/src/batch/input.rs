//! Batch input: a single code or a file of codes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::SetCode;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the positional argument refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    Single(String),
    File(PathBuf),
}

impl BatchInput {
    /// A name is a file when it exists as one or ends in `.txt`.
    pub fn classify(arg: &str) -> Self {
        let path = Path::new(arg);
        let is_txt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if path.is_file() || is_txt {
            Self::File(path.to_path_buf())
        } else {
            Self::Single(arg.to_string())
        }
    }

    /// Raw codes named by this input, in order.
    pub async fn codes(&self) -> Result<Vec<String>, InputError> {
        match self {
            Self::Single(code) => Ok(vec![code.trim().to_string()]),
            Self::File(path) => read_code_file(path).await,
        }
    }
}

/// Codes listed in `text`, one per line. Blank lines and `#` comments
/// (whole-line or trailing) are ignored.
pub fn parse_code_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn read_code_file(path: &Path) -> Result<Vec<String>, InputError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(parse_code_list(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(InputError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(InputError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Drop repeated codes, comparing canonical forms. Returns the unique codes
/// in first-seen order and the dropped repeats.
pub fn dedupe_codes(codes: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(codes.len());
    let mut repeats = Vec::new();

    for raw in codes {
        let key = match SetCode::parse(&raw) {
            Ok(code) => code.to_string(),
            Err(_) => raw.trim().to_string(),
        };
        if seen.insert(key) {
            unique.push(raw);
        } else {
            repeats.push(raw);
        }
    }

    (unique, repeats)
}
