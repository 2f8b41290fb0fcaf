use crate::handler::{unsupported, HandlerResult, InvocationHandler};
use crate::invocation::{Invocation, Position};
use crate::matcher::ArgumentMatcher;
use crate::signature::TypeSignature;
use crate::value::Value;

/// Handles object out-parameters, such as error pointers.
///
/// The callee writes them and their content at call time is garbage, so they
/// always encode as wildcards and are never read.
#[derive(Clone, Copy, Default)]
pub struct OutParameterHandler;

impl InvocationHandler for OutParameterHandler {
    fn name(&self) -> &'static str {
        "out-parameter"
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        *signature == TypeSignature::OutObject
    }

    fn encode(&self, _position: usize, _invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        Ok(ArgumentMatcher::wildcard())
    }

    fn can_decode(&self, _value: &Value, _invocation: &Invocation) -> bool {
        false
    }

    fn decode(&self, _value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        Err(unsupported(Position::Return, invocation.return_signature()))
    }
}
