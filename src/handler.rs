//! Type-specific strategies for turning call arguments into matchers and
//! stubbed values into return slots.
//!
//! A [HandlerChain] is an immutable, ordered list of [InvocationHandler]s.
//! For every argument position and for the return slot, the first handler
//! that reports it can handle the slot does the work. Handlers never inspect
//! each other, so the chain order alone decides precedence.

use core::fmt::Display;

use once_cell::race::OnceBox;

use crate::alloc::{Arc, Box, Vec};
use crate::invocation::{Argument, Invocation, Position};
use crate::matcher::{ArgumentMatcher, CallSignature};
use crate::signature::TypeSignature;
use crate::value::{Capability, Value};

mod aggregate;
mod numeric;
mod object;
mod out_param;
mod primitive;

pub use aggregate::AggregateHandler;
pub use numeric::NumericHandler;
pub use object::{BlockHandler, ObjectHandler};
pub use out_param::OutParameterHandler;
pub use primitive::PrimitiveHandler;

/// Failure of a single handler or of the whole chain.
///
/// The dispatch surface attaches the mock and selector before reporting it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum HandlerError {
    /// Nothing in the chain can handle the slot.
    Unsupported {
        position: Position,
        signature: TypeSignature,
    },
    /// The requested argument position is out of range.
    NoSuchArgument { position: usize, count: usize },
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unsupported {
                position,
                signature,
            } => write!(f, "unsupported type `{signature}` for {position}"),
            Self::NoSuchArgument { position, count } => {
                write!(f, "no argument #{position}, the call has {count}")
            }
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;

/// One type-specific strategy in a [HandlerChain].
///
/// `can_encode`/`can_decode` must be side-effect free; the chain may ask
/// several handlers before one of them is told to do the work.
pub trait InvocationHandler: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Whether this handler is responsible for slots of `signature`.
    fn claims(&self, signature: &TypeSignature) -> bool;

    /// The capability a stubbed value must satisfy before [InvocationHandler::decode].
    fn required_capability(&self) -> Option<Capability> {
        None
    }

    fn can_encode(&self, position: usize, invocation: &Invocation) -> bool {
        invocation
            .argument(position)
            .map_or(false, |argument| self.claims(argument.signature()))
    }

    /// Build a matcher that captures the argument at `position`.
    ///
    /// Must not mutate the argument. Out-parameters are never read.
    fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher>;

    fn can_decode(&self, value: &Value, invocation: &Invocation) -> bool {
        self.claims(invocation.return_signature())
            && self
                .required_capability()
                .map_or(true, |capability| value.satisfies(capability))
    }

    /// Write `value` into the invocation's return slot.
    fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()>;
}

/// An ordered, immutable sequence of handlers.
///
/// Shared read-only across threads once built.
pub struct HandlerChain {
    handlers: Vec<Box<dyn InvocationHandler>>,
}

static STANDARD_CHAIN: OnceBox<Arc<HandlerChain>> = OnceBox::new();

impl HandlerChain {
    pub fn builder() -> HandlerChainBuilder {
        HandlerChainBuilder {
            handlers: Vec::new(),
        }
    }

    /// The process-wide default chain.
    ///
    /// In order: out-parameters, blocks, objects by equality, aggregates,
    /// then one primitive handler per scalar width.
    pub fn standard() -> Arc<HandlerChain> {
        STANDARD_CHAIN
            .get_or_init(|| Box::new(Arc::new(Self::builder().standard_handlers().build())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names, front to back.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|handler| handler.name())
    }

    /// The first handler able to encode the argument at `position`.
    pub fn encoder(&self, position: usize, invocation: &Invocation) -> Option<&dyn InvocationHandler> {
        self.handlers
            .iter()
            .map(|handler| handler.as_ref())
            .find(|handler| handler.can_encode(position, invocation))
    }

    /// The first handler able to write `value` into the invocation's return slot.
    pub fn decoder(&self, value: &Value, invocation: &Invocation) -> Option<&dyn InvocationHandler> {
        self.handlers
            .iter()
            .map(|handler| handler.as_ref())
            .find(|handler| handler.can_decode(value, invocation))
    }

    /// Produce the matcher for one argument position.
    pub fn encode(&self, position: usize, invocation: &Invocation) -> HandlerResult<ArgumentMatcher> {
        let argument = argument_at(invocation, position)?;

        match self.encoder(position, invocation) {
            Some(handler) => {
                tracing::trace!(
                    selector = invocation.selector().name(),
                    position,
                    handler = handler.name(),
                    "encoding argument"
                );
                handler.encode(position, invocation)
            }
            None => Err(unsupported(Position::Argument(position), argument.signature())),
        }
    }

    /// Produce the call signature of a whole invocation.
    pub fn encode_all(&self, invocation: &Invocation) -> HandlerResult<CallSignature> {
        (0..invocation.argument_count())
            .map(|position| self.encode(position, invocation))
            .collect::<HandlerResult<Vec<_>>>()
            .map(CallSignature::new)
    }

    /// Write a stubbed value into the return slot.
    pub fn decode(&self, value: &Value, invocation: &mut Invocation) -> HandlerResult<()> {
        match self.decoder(value, invocation) {
            Some(handler) => {
                tracing::trace!(
                    selector = invocation.selector().name(),
                    handler = handler.name(),
                    "decoding return value"
                );
                handler.decode(value, invocation)
            }
            None => Err(unsupported(Position::Return, invocation.return_signature())),
        }
    }
}

impl core::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

pub struct HandlerChainBuilder {
    handlers: Vec<Box<dyn InvocationHandler>>,
}

impl HandlerChainBuilder {
    /// Append a handler after those already added.
    pub fn handler(mut self, handler: impl InvocationHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append the handlers of [HandlerChain::standard].
    pub fn standard_handlers(self) -> Self {
        self.handler(OutParameterHandler)
            .handler(BlockHandler)
            .handler(ObjectHandler::new())
            .handler(AggregateHandler::new())
            .handler(PrimitiveHandler::<bool>::new())
            .handler(PrimitiveHandler::<i8>::new())
            .handler(PrimitiveHandler::<i16>::new())
            .handler(PrimitiveHandler::<i32>::new())
            .handler(PrimitiveHandler::<i64>::new())
            .handler(PrimitiveHandler::<u8>::new())
            .handler(PrimitiveHandler::<u16>::new())
            .handler(PrimitiveHandler::<u32>::new())
            .handler(PrimitiveHandler::<u64>::new())
            .handler(PrimitiveHandler::<f32>::new())
            .handler(PrimitiveHandler::<f64>::new())
    }

    pub fn build(self) -> HandlerChain {
        HandlerChain {
            handlers: self.handlers,
        }
    }
}

pub(crate) fn argument_at(invocation: &Invocation, position: usize) -> HandlerResult<&Argument> {
    invocation
        .argument(position)
        .ok_or(HandlerError::NoSuchArgument {
            position,
            count: invocation.argument_count(),
        })
}

pub(crate) fn unsupported(position: Position, signature: &TypeSignature) -> HandlerError {
    HandlerError::Unsupported {
        position,
        signature: *signature,
    }
}
