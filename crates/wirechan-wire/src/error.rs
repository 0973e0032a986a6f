use crate::value::Tag;

/// Errors an encoder session can report.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// An append, close, or id call arrived with no open session.
    #[error("no encoding session is open")]
    SessionNotOpen,

    /// `open` was called on a session that is already open or closed.
    #[error("encoding session already started")]
    SessionAlreadyStarted,

    /// The session cannot hold as many values as declared.
    #[error("cannot open a session for {declared} values (max {max})")]
    TooManyArguments { declared: usize, max: usize },

    /// More values were appended than the session declared at open.
    #[error("value appended beyond the declared count of {declared}")]
    ValueOverflow { declared: usize },

    /// `close` found fewer values than the session declared at open.
    #[error("session declared {declared} values but {appended} were appended")]
    CountMismatch { declared: usize, appended: usize },

    /// The tag is not representable in this encoding, or was passed to the
    /// wrong append call.
    #[error("tag {tag:?} not representable here")]
    UnsupportedTag { tag: Tag },

    /// The encoded message would exceed the payload budget.
    #[error("encoded message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, EncodeError>;
