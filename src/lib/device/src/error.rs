use core::fmt::Debug;

pub trait Error: Debug {
    fn kind(&self) -> ErrorKind;
}

/// Device error kind shared by every collaborator
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A documented signal was not observed within its maximum latency
    Timeout,
}

/// A bounded poll ran out of time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timeout {
    /// Time spent polling, in microseconds
    pub waited_us: u64,
}

impl Error for Timeout {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Timeout
    }
}

impl Error for ErrorKind {
    fn kind(&self) -> ErrorKind {
        *self
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "Signal not observed within its maximum latency"),
        }
    }
}
