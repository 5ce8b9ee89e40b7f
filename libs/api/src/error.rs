/// Category of a plugin error. Allows the host to tell contract
/// violations (wrong mode, read past end) from bad input and I/O failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The underlying log is missing, corrupt or unreadable.
    Open,
    /// Write access requested from a read-only storage.
    UnsupportedMode,
    /// `read_next()` called after the last record.
    EndOfLog,
    /// A record reached the transcoder with a type that has no mapping.
    UnmappedType,
    /// Malformed payload or envelope.
    Format,
    /// I/O error after a successful open.
    Io,
    /// Misuse of the API (not opened, already closed, unknown plugin).
    Logic,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Open => f.write_str("open"),
            ErrorKind::UnsupportedMode => f.write_str("unsupported mode"),
            ErrorKind::EndOfLog => f.write_str("end of log"),
            ErrorKind::UnmappedType => f.write_str("unmapped type"),
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Unified error type for all plugin trait methods.
///
/// Carries an `ErrorKind` for categorization and a human-readable message.
/// `From` impls assign the appropriate kind automatically and allow
/// ergonomic `?` in plugin implementations.
#[derive(Clone)]
pub struct PluginError {
    kind: ErrorKind,
    message: String,
}

impl PluginError {
    /// Generic logic error (default kind).
    pub fn new(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    pub fn open(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Open, message: msg.into() }
    }

    pub fn unsupported_mode(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::UnsupportedMode, message: msg.into() }
    }

    pub fn end_of_log(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::EndOfLog, message: msg.into() }
    }

    pub fn unmapped_type(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::UnmappedType, message: msg.into() }
    }

    /// Malformed payload or envelope.
    pub fn format_err(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add context to the error, preserving the original `ErrorKind`.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl std::fmt::Debug for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PluginError {}

impl From<String> for PluginError {
    fn from(s: String) -> Self { Self { kind: ErrorKind::Logic, message: s } }
}

impl From<&str> for PluginError {
    fn from(s: &str) -> Self { Self { kind: ErrorKind::Logic, message: s.to_string() } }
}

impl From<std::io::Error> for PluginError {
    fn from(e: std::io::Error) -> Self { Self { kind: ErrorKind::Io, message: e.to_string() } }
}

impl From<serde_json::Error> for PluginError {
    fn from(e: serde_json::Error) -> Self { Self { kind: ErrorKind::Format, message: e.to_string() } }
}

impl From<std::str::Utf8Error> for PluginError {
    fn from(e: std::str::Utf8Error) -> Self { Self { kind: ErrorKind::Format, message: e.to_string() } }
}

impl From<std::string::FromUtf8Error> for PluginError {
    fn from(e: std::string::FromUtf8Error) -> Self { Self { kind: ErrorKind::Format, message: e.to_string() } }
}
