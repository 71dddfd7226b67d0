//! Error types.
//!
//! Only configuration problems surface as errors to the caller. Bad input never does: the tokenizer
//! folds grammar failures back into text and the tree builder turns structural problems into
//! erroneous text nodes.

/// Why a single tag declaration could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TagParseError {
    /// The declaration is structurally wrong at the given byte offset.
    #[error("malformed tag at byte {offset}")]
    Malformed { offset: usize },
    /// The input ended before the closing delimiter was found.
    #[error("ran out of input before the tag was closed")]
    OutOfInput,
}

/// A broken tag descriptor set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("tag descriptor has no canonical name")]
    MissingName,
    #[error("tag name `{0}` is already registered")]
    DuplicateName(String),
    #[error("tag alias `{0}` is already registered")]
    DuplicateAlias(String),
    #[error("tag name `{0}` uses the reserved `#` prefix")]
    ReservedName(String),
}
