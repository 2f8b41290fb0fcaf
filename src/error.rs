use crate::alloc::String;
use crate::counter::{CountMatcher, NCalls};
use crate::debug::CallDebug;
use crate::handler::HandlerError;
use crate::invocation::Position;
use crate::mismatch::Mismatches;
use crate::signature::TypeSignature;

/// Result of an operation on the dispatch core.
pub type MockResult<T> = Result<T, MockError>;

/// A failure of one intercepted call, stub lookup or verification.
///
/// Each failure is fatal for the call it concerns, never for the process.
#[derive(Clone)]
pub enum MockError {
    /// No handler in the chain claims an argument position or the return slot.
    ///
    /// Also raised for object arguments lacking an equality capability when
    /// the chain has no identity or universal fallback for them.
    UnsupportedType {
        call: CallDebug,
        position: Position,
        signature: TypeSignature,
    },
    /// A handler was asked for an argument position the call does not have.
    NoSuchArgument {
        call: CallDebug,
        position: usize,
        count: usize,
    },
    /// A type facade was unwrapped to a type its boxed value cannot satisfy.
    TypeCoercionViolation {
        expected: &'static str,
        actual: String,
    },
    /// No stub matched a call that needs a return value.
    MissingStubbedImplementation {
        call: CallDebug,
        mismatches: Mismatches,
    },
    /// A throwing stub matched a call with no error out-parameter.
    CannotThrow { call: CallDebug },
    /// Verification found the wrong number of matching calls.
    IncorrectInvocationCount {
        call: CallDebug,
        expected: CountMatcher,
        actual: usize,
    },
    /// In-order verification found no matching call after the previous one.
    OutOfOrder {
        call: CallDebug,
        after: Option<CallDebug>,
    },
    /// A property was read or written through an accessor it does not declare.
    MissingAccessor {
        mock_name: &'static str,
        property: &'static str,
        accessor: &'static str,
    },
}

impl MockError {
    /// Attach the failing call to an error raised by the handler chain.
    pub(crate) fn from_handler(call: CallDebug, error: HandlerError) -> Self {
        match error {
            HandlerError::Unsupported {
                position,
                signature,
            } => Self::UnsupportedType {
                call,
                position,
                signature,
            },
            HandlerError::NoSuchArgument { position, count } => Self::NoSuchArgument {
                call,
                position,
                count,
            },
        }
    }
}

impl core::fmt::Display for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedType {
                call,
                position,
                signature,
            } => {
                write!(
                    f,
                    "{call}: Unsupported type `{signature}` for {position}. No invocation handler claims it."
                )
            }
            Self::NoSuchArgument {
                call,
                position,
                count,
            } => {
                write!(
                    f,
                    "{call}: No argument #{position}, the call has {count} arguments."
                )
            }
            Self::TypeCoercionViolation { expected, actual } => {
                write!(f, "Cannot coerce type facade value {actual} to `{expected}`.")
            }
            Self::MissingStubbedImplementation { call, mismatches } => {
                write!(f, "{call}: Missing stubbed implementation.{mismatches}")
            }
            Self::CannotThrow { call } => {
                write!(
                    f,
                    "{call}: Stubbed to throw, but the call has no error out-parameter."
                )
            }
            Self::IncorrectInvocationCount {
                call,
                expected,
                actual,
            } => {
                let actual_calls = NCalls(*actual);
                write!(
                    f,
                    "{call}: Expected to be called {expected}, but it was actually called {actual_calls}."
                )
            }
            Self::OutOfOrder { call, after } => match after {
                Some(after) => write!(f, "{call}: Not called after {after}."),
                None => write!(f, "{call}: Never called."),
            },
            Self::MissingAccessor {
                mock_name,
                property,
                accessor,
            } => {
                write!(f, "'{mock_name}.{property}': Property has no {accessor}.")
            }
        }
    }
}

impl core::fmt::Debug for MockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MockError {}
