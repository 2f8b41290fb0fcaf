use crate::comparator::Comparator;
use crate::handler::{argument_at, unsupported, HandlerResult, InvocationHandler};
use crate::invocation::{Invocation, Position, RawArgument};
use crate::matcher::ArgumentMatcher;
use crate::signature::TypeSignature;
use crate::value::{Aggregate, Capability, Value};

/// Handles plain-old-data aggregates by copying their bytes.
#[derive(Clone, Copy, Default)]
pub struct AggregateHandler {
    name: Option<&'static str>,
}

impl AggregateHandler {
    /// Claims every aggregate.
    pub fn new() -> Self {
        Self { name: None }
    }

    /// Claims only aggregates called `name`.
    pub fn named(name: &'static str) -> Self {
        Self { name: Some(name) }
    }
}

impl InvocationHandler for AggregateHandler {
    fn name(&self) -> &'static str {
        self.name.unwrap_or("aggregate")
    }

    fn claims(&self, signature: &TypeSignature) -> bool {
        match signature {
            TypeSignature::Struct { name, .. } => self.name.map_or(true, |claimed| claimed == *name),
            _ => false,
        }
    }

    fn required_capability(&self) -> Option<Capability> {
        Some(Capability::Bytes)
    }

    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let argument = argument_at(invocation, position)?;
        let signature = argument.signature();

        match (signature, argument.bytes()) {
            (TypeSignature::Struct { name, size }, Some(bytes)) if bytes.len() == *size => Ok(
                ArgumentMatcher::from_value(Aggregate::new(*name, bytes), Comparator::EQUAL),
            ),
            _ => Err(unsupported(Position::Argument(position), signature)),
        }
    }

    fn can_decode(&self, value: &Value, invocation: &Invocation) -> bool {
        let signature = invocation.return_signature();
        matches!(
            value,
            Value::Aggregate(aggregate) if self.claims(signature) && aggregate.signature() == *signature
        )
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        match value {
            Value::Aggregate(aggregate) if aggregate.signature() == *invocation.return_signature() => {
                invocation.set_raw_return(RawArgument::Bytes(aggregate.bytes().into()));
                Ok(())
            }
            _ => Err(unsupported(Position::Return, invocation.return_signature())),
        }
    }
}
