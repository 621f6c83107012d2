// Error kinds, the structured error value, and stable status/exit code mappings.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    AllocationFailure,
    OperationFailure,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    yak: Option<u32>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            yak: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// 1-based index of the yak the failing attempt was working on.
    pub fn yak(&self) -> Option<u32> {
        self.yak
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_yak(mut self, yak: u32) -> Self {
        self.yak = Some(yak);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(yak) = self.yak {
            write!(f, " (yak: {yak})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Status returned by the C `shave` entry points.
pub const STATUS_OK: i32 = 0;

/// Maps a failed outcome to its (negative) C status code.
pub fn to_status_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::OperationFailure => -1,
        ErrorKind::Usage => -2,
        ErrorKind::AllocationFailure => -3,
        ErrorKind::Internal => -4,
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::AllocationFailure => 3,
        ErrorKind::OperationFailure => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, STATUS_OK, to_exit_code, to_status_code};
    use std::error::Error as _;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::AllocationFailure, 3),
            (ErrorKind::OperationFailure, 4),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn status_codes_are_negative_and_distinct_from_ok() {
        let cases = [
            (ErrorKind::OperationFailure, -1),
            (ErrorKind::Usage, -2),
            (ErrorKind::AllocationFailure, -3),
            (ErrorKind::Internal, -4),
        ];

        for (kind, code) in cases {
            assert_eq!(to_status_code(kind), code);
            assert_ne!(to_status_code(kind), STATUS_OK);
        }
    }

    #[test]
    fn display_includes_message_and_yak() {
        let err = Error::new(ErrorKind::OperationFailure)
            .with_message("razor dull")
            .with_yak(7);
        assert_eq!(err.to_string(), "OperationFailure: razor dull (yak: 7)");
    }

    #[test]
    fn source_is_preserved() {
        let inner = Error::new(ErrorKind::Internal).with_message("inner");
        let outer = Error::new(ErrorKind::OperationFailure).with_source(inner);
        let source = outer.source().expect("source");
        assert_eq!(source.to_string(), "Internal: inner");
    }
}
