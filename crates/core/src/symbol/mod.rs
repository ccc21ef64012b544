//! Symbol resolution: where a set's symbol comes from and what happens when
//! there is none.

mod bitmap;
mod fallback;
mod resolver;

pub use bitmap::{trim_to_content, SymbolDecodeError, SymbolImage};
pub use fallback::{
    FixedDecision, MissingSymbolDecision, MissingSymbolPrompt, RememberedChoice, RunContext,
};
pub use resolver::{load_override, SymbolResolver};

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::SetCode;

/// Errors resolving a symbol.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// No usable downloaded symbol. Recoverable through the fallback flow.
    #[error("no symbol available for {code}: {reason}")]
    Missing { code: SetCode, reason: String },

    /// The user-supplied override could not be used.
    #[error("cannot use symbol override {}: {reason}", path.display())]
    Override { path: PathBuf, reason: String },
}
