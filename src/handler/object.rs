use crate::comparator::Comparator;
use crate::handler::{argument_at, unsupported, HandlerResult, InvocationHandler};
use crate::invocation::{Invocation, Position, RawArgument};
use crate::matcher::ArgumentMatcher;
use crate::signature::TypeSignature;
use crate::value::{Capability, Handle, Value};

/// Handles object references.
///
/// A boxed [ArgumentMatcher] passed as an object argument is handed back
/// unchanged, which is how stubbing and verification calls carry wildcards
/// and predicates through an ordinary intercepted call.
#[derive(Clone, Copy)]
pub struct ObjectHandler {
    comparator: Comparator,
}

impl ObjectHandler {
    /// Compares objects structurally. Objects without an equality capability are left
    /// to later handlers.
    pub fn new() -> Self {
        Self {
            comparator: Comparator::EQUAL,
        }
    }

    /// Compares objects by reference. Accepts every object.
    pub fn by_identity() -> Self {
        Self {
            comparator: Comparator::IDENTITY,
        }
    }
}

impl Default for ObjectHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InvocationHandler for ObjectHandler {
    fn name(&self) -> &'static str {
        if self.comparator == Comparator::IDENTITY {
            "object (identity)"
        } else {
            "object"
        }
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        *signature == TypeSignature::Object
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Object)
    }

    fn can_encode(&self, position: usize, invocation: &Invocation) -> bool {
        let Some(argument) = invocation.argument(position) else {
            return false;
        };
        if !self.claims(argument.signature()) {
            return false;
        }

        match argument.object_ref() {
            Some(Some(handle)) => {
                boxed_matcher(handle).is_some()
                    || handle.has_equality()
                    || self.comparator != Comparator::EQUAL
            }
            Some(None) => true,
            None => false,
        }
    }

    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let argument = argument_at(invocation, position)?;

        match argument.object_ref() {
            Some(Some(handle)) => Ok(match boxed_matcher(handle) {
                Some(matcher) => matcher.clone(),
                None => ArgumentMatcher::from_value(handle.clone(), self.comparator),
            }),
            Some(None) => Ok(ArgumentMatcher::from_value(Value::Null, self.comparator)),
            None => Err(unsupported(Position::Argument(position), argument.signature())),
        }
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        decode_object(value, invocation)
    }
}

/// Handles closures passed as arguments.
///
/// Closures have no meaningful equality, so captured blocks match any block.
#[derive(Clone, Copy, Default)]
pub struct BlockHandler;

impl InvocationHandler for BlockHandler {
    fn name(&self) -> &'static str {
        "block"
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        *signature == TypeSignature::Block
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Object)
    }

    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let argument = argument_at(invocation, position)?;

        match argument.object_ref() {
            Some(Some(handle)) => Ok(match boxed_matcher(handle) {
                Some(matcher) => matcher.clone(),
                None => ArgumentMatcher::from_value(handle.clone(), Comparator::ANY),
            }),
            Some(None) => Ok(ArgumentMatcher::from_value(Value::Null, Comparator::ANY)),
            None => Err(unsupported(Position::Argument(position), argument.signature())),
        }
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        decode_object(value, invocation)
    }
}

fn boxed_matcher(handle: &Handle) -> Option<&ArgumentMatcher> {
    handle.downcast_ref::<ArgumentMatcher>()
}

fn decode_object(value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
    let handle = match value {
        Value::Handle(handle) => Some(handle.clone()),
        Value::Null => None,
        _ => return Err(unsupported(Position::Return, invocation.return_signature())),
    };
    invocation.set_raw_return(RawArgument::Object(handle));
    Ok(())
}
