use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Outcome of a round trip to the daemon
///
/// `Failure` carries either the transport's error or the daemon's own
/// rejection text, unparsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Success(T),
    Failure(String),
}

impl<T> Reply<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }

    pub fn map<U, F>(self, f: F) -> Reply<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Reply::Success(data) => Reply::Success(f(data)),
            Reply::Failure(message) => Reply::Failure(message),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Reply::Success(data) => Some(data),
            Reply::Failure(_) => None,
        }
    }
}

// Serialized as {"outcome": bool, "message": <data or failure text>}
impl<T> Serialize for Reply<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Reply", 2)?;
        match self {
            Reply::Success(data) => {
                state.serialize_field("outcome", &true)?;
                state.serialize_field("message", data)?;
            }
            Reply::Failure(message) => {
                state.serialize_field("outcome", &false)?;
                state.serialize_field("message", message)?;
            }
        }
        state.end()
    }
}
