use core::marker::PhantomData;

use crate::comparator::Comparator;
use crate::handler::{argument_at, unsupported, HandlerResult, InvocationHandler};
use crate::invocation::{Invocation, Position, RawArgument};
use crate::matcher::ArgumentMatcher;
use crate::signature::TypeSignature;
use crate::value::{Capability, Primitive, Value};

/// Handles by-value scalars of exactly one width.
///
/// Stubbed values are narrowed with a range check, so `300_i32` can be
/// returned from an `u16` slot but not from an `u8` one.
pub struct PrimitiveHandler<P> {
    primitive: PhantomData<fn() -> P>,
}

impl<P: Primitive> PrimitiveHandler<P> {
    pub fn new() -> Self {
        Self {
            primitive: PhantomData,
        }
    }
}

impl<P: Primitive> Default for PrimitiveHandler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Primitive> InvocationHandler for PrimitiveHandler<P> {
    fn name(&self) -> &'static str {
        core::any::type_name::<P>()
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        *signature == P::SIGNATURE
    }

    fn required_capability(&self) -> Option<Capability> {
        if P::SIGNATURE.is_float() {
            Some(Capability::Float)
        } else {
            Some(Capability::Integer)
        }
    }

    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let argument = argument_at(invocation, position)?;
        let primitive = argument
            .bytes()
            .and_then(P::from_raw)
            .ok_or_else(|| unsupported(Position::Argument(position), argument.signature()))?;

        Ok(ArgumentMatcher::from_value(
            primitive.into_value(),
            Comparator::EQUAL,
        ))
    }

    fn can_decode(&self, value: &Value, invocation: &Invocation) -> bool {
        self.claims(invocation.return_signature()) && P::from_value(value).is_some()
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        let primitive = P::from_value(value)
            .ok_or_else(|| unsupported(Position::Return, invocation.return_signature()))?;
        invocation.set_raw_return(RawArgument::Bytes(primitive.to_raw()));
        Ok(())
    }
}
