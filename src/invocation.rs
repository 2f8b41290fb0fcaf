use core::fmt::Display;

use crate::alloc::{Arc, Vec};
use crate::lock::MutexIsh;
use crate::signature::TypeSignature;
use crate::value::{read_scalar, Aggregate, Handle, Primitive, Value};

/// Identity of an intercepted operation, e.g. `"canChirp:"` or `"name.get"`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Selector(pub &'static str);

impl Selector {
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for Selector {
    fn from(name: &'static str) -> Self {
        Self(name)
    }
}

/// An argument position or the return slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Position {
    Argument(usize),
    Return,
}

impl Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Argument(index) => write!(f, "argument #{index}"),
            Self::Return => write!(f, "return value"),
        }
    }
}

/// Storage behind an out-parameter, written by the callee.
///
/// Clones share the same storage.
#[derive(Clone, Default)]
pub struct OutPointer(Arc<MutexIsh<Option<Handle>>>);

impl OutPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Handle> {
        self.0.locked(|slot| slot.clone())
    }

    pub fn set(&self, handle: Option<Handle>) {
        self.0.locked(|slot| *slot = handle);
    }
}

/// The raw content of an argument position or return slot.
#[derive(Clone)]
pub enum RawArgument {
    /// A by-value scalar or aggregate, in native byte order.
    Bytes(Vec<u8>),
    /// An object or block reference.
    Object(Option<Handle>),
    /// An out-parameter. Its current content is never read by the matching core.
    Out(OutPointer),
}

/// One argument of an intercepted call.
#[derive(Clone)]
pub struct Argument {
    signature: TypeSignature,
    raw: RawArgument,
}

impl Argument {
    /// A raw argument with an explicit signature.
    pub fn raw(signature: TypeSignature, raw: RawArgument) -> Self {
        Self { signature, raw }
    }

    pub fn primitive<P: Primitive>(value: P) -> Self {
        Self::raw(P::SIGNATURE, RawArgument::Bytes(value.to_raw()))
    }

    pub fn aggregate(aggregate: Aggregate) -> Self {
        let signature = aggregate.signature();
        Self::raw(signature, RawArgument::Bytes(aggregate.bytes().to_vec()))
    }

    pub fn object(handle: Option<Handle>) -> Self {
        Self::raw(TypeSignature::Object, RawArgument::Object(handle))
    }

    pub fn block(handle: Handle) -> Self {
        Self::raw(TypeSignature::Block, RawArgument::Object(Some(handle)))
    }

    pub fn out_object(out: OutPointer) -> Self {
        Self::raw(TypeSignature::OutObject, RawArgument::Out(out))
    }

    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }

    pub fn raw_value(&self) -> &RawArgument {
        &self.raw
    }

    /// Raw bytes of a by-value argument.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.raw {
            RawArgument::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The referenced object. `Some(None)` is a null object.
    pub fn object_ref(&self) -> Option<Option<&Handle>> {
        match &self.raw {
            RawArgument::Object(handle) => Some(handle.as_ref()),
            _ => None,
        }
    }

    pub fn out_pointer(&self) -> Option<&OutPointer> {
        match &self.raw {
            RawArgument::Out(out) => Some(out),
            _ => None,
        }
    }
}

/// A mutable intercepted call.
///
/// Exposes the argument count, per-position signatures and raw contents,
/// and a typed return slot the dispatch core writes into.
pub struct Invocation {
    selector: Selector,
    arguments: Vec<Argument>,
    return_signature: TypeSignature,
    return_raw: Option<RawArgument>,
}

impl Invocation {
    /// A call with no arguments and a void return.
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            selector: selector.into(),
            arguments: Vec::new(),
            return_signature: TypeSignature::Void,
            return_raw: None,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Declare the return slot's signature.
    pub fn returns(mut self, signature: TypeSignature) -> Self {
        self.return_signature = signature;
        self
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn argument(&self, position: usize) -> Option<&Argument> {
        self.arguments.get(position)
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn return_signature(&self) -> &TypeSignature {
        &self.return_signature
    }

    /// The raw content written into the return slot, if any.
    pub fn raw_return(&self) -> Option<&RawArgument> {
        self.return_raw.as_ref()
    }

    /// Write the return slot.
    pub fn set_raw_return(&mut self, raw: RawArgument) {
        self.return_raw = Some(raw);
    }

    /// The first error out-parameter of the call, if it has one.
    pub fn error_out(&self) -> Option<&OutPointer> {
        self.arguments.iter().find_map(Argument::out_pointer)
    }

    /// Read the return slot back as a [Value], according to the return signature.
    ///
    /// `None` if nothing was written or the slot content does not fit the signature.
    pub fn return_value(&self) -> Option<Value> {
        let raw = self.return_raw.as_ref()?;
        match (self.return_signature, raw) {
            (TypeSignature::Struct { name, size }, RawArgument::Bytes(bytes)) => {
                (bytes.len() == size).then(|| Value::Aggregate(Aggregate::new(name, bytes.clone())))
            }
            (signature, RawArgument::Bytes(bytes)) => read_scalar(&signature, bytes),
            (TypeSignature::Object | TypeSignature::Block, RawArgument::Object(handle)) => {
                Some(handle.clone().map(Value::Handle).unwrap_or(Value::Null))
            }
            _ => None,
        }
    }

    /// Read the return slot as a concrete primitive.
    pub fn return_primitive<P: Primitive>(&self) -> Option<P> {
        match self.return_raw.as_ref()? {
            RawArgument::Bytes(bytes) if self.return_signature == P::SIGNATURE => P::from_raw(bytes),
            _ => None,
        }
    }
}

/// Describes a property so the proxy can forward getter and setter access.
#[derive(Clone, Copy, Debug)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub getter: Option<Selector>,
    pub setter: Option<Selector>,
}

impl PropertyDescriptor {
    /// A read-write property with `name.get` / `name.set` selectors.
    pub const fn read_write(name: &'static str, getter: &'static str, setter: &'static str) -> Self {
        Self {
            name,
            getter: Some(Selector(getter)),
            setter: Some(Selector(setter)),
        }
    }

    pub const fn read_only(name: &'static str, getter: &'static str) -> Self {
        Self {
            name,
            getter: Some(Selector(getter)),
            setter: None,
        }
    }
}
