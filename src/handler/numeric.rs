use crate::comparator::Comparator;
use crate::handler::{argument_at, unsupported, HandlerResult, InvocationHandler};
use crate::invocation::{Invocation, Position, RawArgument};
use crate::matcher::ArgumentMatcher;
use crate::signature::TypeSignature;
use crate::value::{read_scalar, write_scalar, Value};

/// Handles every numeric scalar width.
///
/// Not part of the standard chain. Append it behind width-specific handlers
/// as a catch-all, or use it alone for a coarser chain.
#[derive(Clone, Copy, Default)]
pub struct NumericHandler;

impl InvocationHandler for NumericHandler {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        signature.is_numeric()
    }

    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let argument = argument_at(invocation, position)?;
        let value = argument
            .bytes()
            .and_then(|bytes| read_scalar(argument.signature(), bytes))
            .ok_or_else(|| unsupported(Position::Argument(position), argument.signature()))?;

        Ok(ArgumentMatcher::from_value(value, Comparator::EQUAL))
    }

    fn can_decode(&self, value: &Value, invocation: &Invocation) -> bool {
        let signature = invocation.return_signature();
        self.claims(signature) && write_scalar(signature, value).is_some()
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        let bytes = write_scalar(invocation.return_signature(), value)
            .ok_or_else(|| unsupported(Position::Return, invocation.return_signature()))?;
        invocation.set_raw_return(RawArgument::Bytes(bytes));
        Ok(())
    }
}
