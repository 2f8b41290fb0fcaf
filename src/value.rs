use core::any::Any;
use core::fmt::{Debug, Display};

use crate::alloc::{Arc, String, ToString, Vec};
use crate::signature::TypeSignature;

/// A type-erased value flowing through the interception path.
///
/// One variant per category the handler chain knows how to copy and compare.
#[derive(Clone)]
pub enum Value {
    /// The null object or an absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer of exact width.
    Int(Int),
    /// A floating point number of exact width.
    Float(Float),
    /// A plain-old-data aggregate, stored as raw bytes.
    Aggregate(Aggregate),
    /// A reference-counted object handle.
    Handle(Handle),
}

/// A capability a boxed value may be required to satisfy before a handler decodes it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Capability {
    /// Readable as an integer (integers and booleans).
    Integer,
    /// Readable as a floating point number (floats and integers).
    Float,
    /// Readable as raw aggregate bytes.
    Bytes,
    /// Usable as an object reference (handles and null).
    Object,
    /// Supports a structural equality test.
    Equality,
}

impl Value {
    /// Whether this value satisfies the given capability.
    pub fn satisfies(&self, capability: Capability) -> bool {
        match capability {
            Capability::Integer => matches!(self, Self::Int(_) | Self::Bool(_)),
            Capability::Float => matches!(self, Self::Float(_) | Self::Int(_)),
            Capability::Bytes => matches!(self, Self::Aggregate(_)),
            Capability::Object => matches!(self, Self::Handle(_) | Self::Null),
            Capability::Equality => match self {
                Self::Handle(handle) => handle.has_equality(),
                _ => true,
            },
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Self::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    /// Structural equality.
    ///
    /// Values of different categories or widths are never equal. Floats are equal when
    /// they compare equal or have identical bits, so `0.0` equals `-0.0` and a NaN equals
    /// itself. Handles without an equality capability are never equal to anything.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(lhs), Self::Bool(rhs)) => lhs == rhs,
            (Self::Int(lhs), Self::Int(rhs)) => lhs == rhs,
            (Self::Float(lhs), Self::Float(rhs)) => lhs.float_eq(rhs),
            (Self::Aggregate(lhs), Self::Aggregate(rhs)) => lhs == rhs,
            (Self::Handle(lhs), Self::Handle(rhs)) => lhs.erased_eq(rhs),
            _ => false,
        }
    }

    /// The value written into a return slot when no stub supplies one.
    pub fn default_for(signature: &TypeSignature) -> Option<Value> {
        Some(match signature {
            TypeSignature::Void | TypeSignature::OutObject | TypeSignature::Pointer => return None,
            TypeSignature::Bool => Value::Bool(false),
            TypeSignature::I8 => Value::Int(Int::I8(0)),
            TypeSignature::I16 => Value::Int(Int::I16(0)),
            TypeSignature::I32 => Value::Int(Int::I32(0)),
            TypeSignature::I64 => Value::Int(Int::I64(0)),
            TypeSignature::U8 => Value::Int(Int::U8(0)),
            TypeSignature::U16 => Value::Int(Int::U16(0)),
            TypeSignature::U32 => Value::Int(Int::U32(0)),
            TypeSignature::U64 => Value::Int(Int::U64(0)),
            TypeSignature::F32 => Value::Float(Float::F32(0.0)),
            TypeSignature::F64 => Value::Float(Float::F64(0.0)),
            TypeSignature::Struct { name, size } => {
                Value::Aggregate(Aggregate::new(*name, crate::alloc::vec![0; *size]))
            }
            TypeSignature::Object | TypeSignature::Block => Value::Null,
        })
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Null => write!(f, "nil"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(int) => write!(f, "{int}"),
            Self::Float(float) => write!(f, "{float}"),
            Self::Aggregate(aggregate) => write!(f, "{aggregate:?}"),
            Self::Handle(handle) => write!(f, "{handle:?}"),
        }
    }
}

/// An integer of exact width.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Int {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl Int {
    /// Widen to `i128`, which holds every supported width losslessly.
    pub fn to_i128(self) -> i128 {
        match self {
            Self::I8(v) => v.into(),
            Self::I16(v) => v.into(),
            Self::I32(v) => v.into(),
            Self::I64(v) => v.into(),
            Self::U8(v) => v.into(),
            Self::U16(v) => v.into(),
            Self::U32(v) => v.into(),
            Self::U64(v) => v.into(),
        }
    }

    pub fn signature(self) -> TypeSignature {
        match self {
            Self::I8(_) => TypeSignature::I8,
            Self::I16(_) => TypeSignature::I16,
            Self::I32(_) => TypeSignature::I32,
            Self::I64(_) => TypeSignature::I64,
            Self::U8(_) => TypeSignature::U8,
            Self::U16(_) => TypeSignature::U16,
            Self::U32(_) => TypeSignature::U32,
            Self::U64(_) => TypeSignature::U64,
        }
    }
}

impl Display for Int {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.to_i128())
    }
}

/// A floating point number of exact width.
#[derive(Clone, Copy, Debug)]
pub enum Float {
    F32(f32),
    F64(f64),
}

impl Float {
    pub fn to_f64(self) -> f64 {
        match self {
            Self::F32(v) => v.into(),
            Self::F64(v) => v,
        }
    }

    pub fn signature(self) -> TypeSignature {
        match self {
            Self::F32(_) => TypeSignature::F32,
            Self::F64(_) => TypeSignature::F64,
        }
    }

    fn float_eq(&self, other: &Float) -> bool {
        match (self, other) {
            (Self::F32(lhs), Self::F32(rhs)) => lhs == rhs || lhs.to_bits() == rhs.to_bits(),
            (Self::F64(lhs), Self::F64(rhs)) => lhs == rhs || lhs.to_bits() == rhs.to_bits(),
            _ => false,
        }
    }
}

impl Display for Float {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
        }
    }
}

/// A named plain-old-data value, copied byte for byte.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Aggregate {
    name: &'static str,
    bytes: Vec<u8>,
}

impl Aggregate {
    pub fn new(name: &'static str, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn signature(&self) -> TypeSignature {
        TypeSignature::Struct {
            name: self.name,
            size: self.bytes.len(),
        }
    }
}

impl Debug for Aggregate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(0x", self.name)?;
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

type EqFn = fn(&dyn Any, &dyn Any) -> bool;
type DebugFn = fn(&dyn Any, &mut core::fmt::Formatter<'_>) -> core::fmt::Result;

/// A shared, type-erased object reference.
///
/// A handle optionally carries an equality and a debug function for its concrete type.
/// Handles built with [Handle::opaque] have neither, so they can only be matched
/// by identity or not at all.
#[derive(Clone)]
pub struct Handle {
    object: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    eq_fn: Option<EqFn>,
    debug_fn: Option<DebugFn>,
}

impl Handle {
    /// Box a value that supports equality and debug formatting.
    pub fn new<T>(value: T) -> Self
    where
        T: PartialEq + Debug + Any + Send + Sync,
    {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value that supports equality and debug formatting.
    pub fn from_arc<T>(object: Arc<T>) -> Self
    where
        T: PartialEq + Debug + Any + Send + Sync,
    {
        Self {
            object,
            type_name: core::any::type_name::<T>(),
            eq_fn: Some(erased_eq::<T>),
            debug_fn: Some(erased_debug::<T>),
        }
    }

    /// Box a value with no equality capability, e.g. a closure.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Self::opaque_arc(Arc::new(value))
    }

    pub fn opaque_arc<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        Self {
            object,
            type_name: core::any::type_name::<T>(),
            eq_fn: None,
            debug_fn: None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn has_equality(&self) -> bool {
        self.eq_fn.is_some()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.object.as_ref().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.as_ref().downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.object.clone().downcast::<T>().ok()
    }

    /// Whether both handles refer to the same allocation.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        core::ptr::eq(
            Arc::as_ptr(&self.object) as *const (),
            Arc::as_ptr(&other.object) as *const (),
        )
    }

    fn erased_eq(&self, other: &Handle) -> bool {
        match self.eq_fn {
            Some(eq) => eq(self.object.as_ref(), other.object.as_ref()),
            None => false,
        }
    }
}

impl Debug for Handle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.debug_fn {
            Some(debug) => debug(self.object.as_ref(), f),
            None => write!(f, "<{}>", self.type_name),
        }
    }
}

fn erased_eq<T: PartialEq + Any>(lhs: &dyn Any, rhs: &dyn Any) -> bool {
    match (lhs.downcast_ref::<T>(), rhs.downcast_ref::<T>()) {
        (Some(lhs), Some(rhs)) => lhs == rhs,
        _ => false,
    }
}

fn erased_debug<T: Debug + Any>(value: &dyn Any, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match value.downcast_ref::<T>() {
        Some(value) => Debug::fmt(value, f),
        None => write!(f, "<?>"),
    }
}

/// A fixed-size scalar that can be passed through an argument position as raw bytes.
pub trait Primitive: Copy + Send + Sync + 'static {
    /// The signature a call site declares for this type.
    const SIGNATURE: TypeSignature;

    /// Native-endian byte representation.
    fn to_raw(self) -> Vec<u8>;

    /// Read back from native-endian bytes. `None` if the length is wrong.
    fn from_raw(bytes: &[u8]) -> Option<Self>;

    fn into_value(self) -> Value;

    /// Checked conversion from any value with a compatible capability.
    ///
    /// Returns `None` if the value is of the wrong category or does not fit.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! int_primitive {
    ($($ty:ident => $variant:ident),*) => {
        $(
            impl Primitive for $ty {
                const SIGNATURE: TypeSignature = TypeSignature::$variant;

                fn to_raw(self) -> Vec<u8> {
                    self.to_ne_bytes().to_vec()
                }

                fn from_raw(bytes: &[u8]) -> Option<Self> {
                    Some(Self::from_ne_bytes(bytes.try_into().ok()?))
                }

                fn into_value(self) -> Value {
                    Value::Int(Int::$variant(self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(int) => Self::try_from(int.to_i128()).ok(),
                        Value::Bool(value) => Some(Self::from(*value)),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    value.into_value()
                }
            }
        )*
    };
}

int_primitive!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64
);

impl Primitive for f32 {
    const SIGNATURE: TypeSignature = TypeSignature::F32;

    fn to_raw(self) -> Vec<u8> {
        self.to_ne_bytes().to_vec()
    }

    fn from_raw(bytes: &[u8]) -> Option<Self> {
        Some(Self::from_ne_bytes(bytes.try_into().ok()?))
    }

    fn into_value(self) -> Value {
        Value::Float(Float::F32(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(Float::F32(value)) => Some(*value),
            Value::Float(Float::F64(value)) => {
                let narrowed = *value as f32;
                (f64::from(narrowed) == *value).then_some(narrowed)
            }
            Value::Int(int) => {
                let wide = int.to_i128();
                let narrowed = wide as f32;
                (narrowed as i128 == wide).then_some(narrowed)
            }
            _ => None,
        }
    }
}

impl Primitive for f64 {
    const SIGNATURE: TypeSignature = TypeSignature::F64;

    fn to_raw(self) -> Vec<u8> {
        self.to_ne_bytes().to_vec()
    }

    fn from_raw(bytes: &[u8]) -> Option<Self> {
        Some(Self::from_ne_bytes(bytes.try_into().ok()?))
    }

    fn into_value(self) -> Value {
        Value::Float(Float::F64(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(float) => Some(float.to_f64()),
            Value::Int(int) => {
                let wide = int.to_i128();
                let converted = wide as f64;
                (converted as i128 == wide).then_some(converted)
            }
            _ => None,
        }
    }
}

impl Primitive for bool {
    const SIGNATURE: TypeSignature = TypeSignature::Bool;

    fn to_raw(self) -> Vec<u8> {
        crate::alloc::vec![u8::from(self)]
    }

    fn from_raw(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [byte] => Some(*byte != 0),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(value) => Some(*value),
            Value::Int(int) => Some(int.to_i128() != 0),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        value.into_value()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        value.into_value()
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        value.into_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Handle(Handle::new(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Handle(Handle::new(value))
    }
}

impl From<Handle> for Value {
    fn from(handle: Handle) -> Self {
        Value::Handle(handle)
    }
}

impl From<Aggregate> for Value {
    fn from(aggregate: Aggregate) -> Self {
        Value::Aggregate(aggregate)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

/// Read a by-value scalar of the given signature from native-endian bytes.
pub(crate) fn read_scalar(signature: &TypeSignature, bytes: &[u8]) -> Option<Value> {
    match signature {
        TypeSignature::Bool => bool::from_raw(bytes).map(Value::from),
        TypeSignature::I8 => i8::from_raw(bytes).map(Value::from),
        TypeSignature::I16 => i16::from_raw(bytes).map(Value::from),
        TypeSignature::I32 => i32::from_raw(bytes).map(Value::from),
        TypeSignature::I64 => i64::from_raw(bytes).map(Value::from),
        TypeSignature::U8 => u8::from_raw(bytes).map(Value::from),
        TypeSignature::U16 => u16::from_raw(bytes).map(Value::from),
        TypeSignature::U32 => u32::from_raw(bytes).map(Value::from),
        TypeSignature::U64 => u64::from_raw(bytes).map(Value::from),
        TypeSignature::F32 => f32::from_raw(bytes).map(Value::from),
        TypeSignature::F64 => f64::from_raw(bytes).map(Value::from),
        _ => None,
    }
}

/// Convert `value` into the native-endian bytes of a scalar signature, if it fits.
pub(crate) fn write_scalar(signature: &TypeSignature, value: &Value) -> Option<Vec<u8>> {
    fn convert<P: Primitive>(value: &Value) -> Option<Vec<u8>> {
        <P as Primitive>::from_value(value).map(|primitive| primitive.to_raw())
    }

    match signature {
        TypeSignature::Bool => convert::<bool>(value),
        TypeSignature::I8 => convert::<i8>(value),
        TypeSignature::I16 => convert::<i16>(value),
        TypeSignature::I32 => convert::<i32>(value),
        TypeSignature::I64 => convert::<i64>(value),
        TypeSignature::U8 => convert::<u8>(value),
        TypeSignature::U16 => convert::<u16>(value),
        TypeSignature::U32 => convert::<u32>(value),
        TypeSignature::U64 => convert::<u64>(value),
        TypeSignature::F32 => convert::<f32>(value),
        TypeSignature::F64 => convert::<f64>(value),
        _ => None,
    }
}

/// Types a boxed [Value] can be coerced into at a call site that knows its concrete type.
pub trait FromValue: Sized {
    /// `None` if the value cannot satisfy `Self`.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitive_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    <$ty as Primitive>::from_value(value)
                }
            }
        )*
    };
}

primitive_from_value!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for Handle {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_handle().cloned()
    }
}

impl FromValue for Aggregate {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Aggregate(aggregate) => Some(aggregate.clone()),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_handle()?.downcast_ref::<String>().cloned()
    }
}

impl<T: Any + Send + Sync> FromValue for Arc<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_handle()?.downcast_arc::<T>()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            value => T::from_value(value).map(Some),
        }
    }
}
