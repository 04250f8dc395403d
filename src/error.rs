use std::error;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised before (or around) a round trip to the daemon.
///
/// Transport failures and daemon rejections are not errors here: they come
/// back as [`Reply::Failure`](crate::Reply) so callers see the daemon's own message.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Bad caller input. [reason]
    Configuration(String),
    /// A command template placeholder had no value. [placeholder]
    MissingCommandArgument(String),
    /// A config file could not be written, removed or linked. [reason]
    Storage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            Configuration(r) => write!(f, "Configuration error: {}", r),
            MissingCommandArgument(arg) => write!(f, "argument {} not specified", arg),
            Storage(r) => write!(f, "Storage error: {}", r),
        }
    }
}

impl error::Error for Error {}
