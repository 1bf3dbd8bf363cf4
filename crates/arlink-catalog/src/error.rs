/// Errors that can occur in catalog lookup and argument coding.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No schema is registered for the requested identity or path.
    #[error("unknown message: {0}")]
    UnknownMessage(String),

    /// A schema with the same identity or path is already registered.
    #[error("duplicate message: {0}")]
    DuplicateMessage(String),

    /// Encode was given an enum name the schema does not declare.
    #[error("unknown enum variant '{variant}' for argument '{arg}'")]
    UnknownEnumVariant { arg: String, variant: String },

    /// Decode read an enum index outside the declared name list.
    #[error("enum value {value} out of range for argument '{arg}'")]
    UnknownEnumValue { arg: String, value: i32 },

    /// Encode was not given a value for a declared argument.
    #[error("missing argument '{0}'")]
    MissingArgument(String),

    /// The provided value's type does not match the argument's declared kind.
    #[error("argument '{arg}' expects {expected}")]
    ArgumentType { arg: String, expected: &'static str },

    /// Decode ran out of bytes walking the argument layout.
    #[error("argument buffer too short at '{arg}' (need {need}, have {have})")]
    ShortBuffer { arg: String, need: usize, have: usize },

    /// A string argument has no NUL terminator.
    #[error("unterminated string argument '{0}'")]
    UnterminatedString(String),

    /// A string argument to encode contains an embedded NUL.
    #[error("string argument '{0}' contains embedded NUL")]
    EmbeddedNul(String),

    /// A string argument is not valid UTF-8.
    #[error("string argument '{0}' is not valid UTF-8")]
    InvalidUtf8(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
