use thiserror::Error;

/// Everything that can abort a generation run. None of these are recovered
/// locally: the first one raised ends the run and no output is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema document is missing or is not valid JSON/YAML of the expected shape.
    #[error("can't read schema: {0}")]
    UnreadableInput(String),

    /// A `$ref` points outside the document's `definitions` area.
    #[error("can't handle schema reference '{reference}': {reason}")]
    UnsupportedReference { reference: String, reason: String },

    /// A version key is not of the form `<major>` or `<major>.*`.
    #[error("failed to read schema: bad version: '{0}'")]
    BadVersionString(String),

    /// The type tags of a node don't describe exactly one type (optionally unioned with null).
    #[error("unable to determine type for schema at '{pointer}': ambiguous types {types:?}")]
    AmbiguousType { pointer: String, types: Vec<String> },

    /// The type tags of a node describe a type with no target representation.
    #[error("unable to determine type for schema at '{pointer}': unresolvable type '{tag}'")]
    UnresolvableType { pointer: String, tag: String },

    /// An object node was used as a field type before its declaration was registered.
    #[error("unable to determine type for schema at '{0}': object type is not declared yet")]
    UnknownComposite(String),

    /// A message version's root schema is not an object schema.
    #[error("invalid msg schema for {message} v{version} with types {types:?}")]
    InvalidMessageSchema {
        message: String,
        version: String,
        types: Vec<String>,
    },

    /// Two distinct schema nodes were given the same type name.
    #[error("type name '{name}' for '{pointer}' is already used by '{existing}'")]
    DuplicateTypeName {
        name: String,
        pointer: String,
        existing: String,
    },

    /// The emitted source was rejected by the formatter.
    #[error("unable to format: {0}")]
    FormattingFailure(String),

    /// Writing the generated source failed.
    #[error("unable to write to output path: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
