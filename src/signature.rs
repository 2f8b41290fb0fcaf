use core::fmt::Display;

/// The low-level type of an argument position or return slot, as seen at the call boundary.
///
/// The `Display` form is the Objective-C style type encoding (`i`, `q`, `{Point}`, `@`, ...),
/// which is what error messages report.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeSignature {
    /// No value.
    Void,
    /// A boolean.
    Bool,
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// Unsigned 64-bit integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// A plain-old-data aggregate, passed as `size` raw bytes.
    Struct {
        /// Name of the aggregate type.
        name: &'static str,
        /// Size in bytes.
        size: usize,
    },
    /// A reference-counted object handle, possibly null.
    Object,
    /// A closure/block handle. Blocks have no meaningful equality.
    Block,
    /// A pointer to object storage that the callee writes into, e.g. an error out-parameter.
    OutObject,
    /// An untyped raw pointer.
    Pointer,
}

impl TypeSignature {
    /// Whether this is a signed or unsigned integer signature (not including `Bool`).
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::U8 | Self::U16 | Self::U32 | Self::U64
        )
    }

    /// Whether this is a floating point signature.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Integer or floating point.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Whether the position carries no value.
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// The number of bytes a value of this signature occupies when passed by value,
    /// or `None` for signatures that are not passed as raw bytes.
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 | Self::F64 => Some(8),
            Self::Struct { size, .. } => Some(*size),
            Self::Void | Self::Object | Self::Block | Self::OutObject | Self::Pointer => None,
        }
    }
}

impl Display for TypeSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Void => write!(f, "v"),
            Self::Bool => write!(f, "B"),
            Self::I8 => write!(f, "c"),
            Self::I16 => write!(f, "s"),
            Self::I32 => write!(f, "i"),
            Self::I64 => write!(f, "q"),
            Self::U8 => write!(f, "C"),
            Self::U16 => write!(f, "S"),
            Self::U32 => write!(f, "I"),
            Self::U64 => write!(f, "Q"),
            Self::F32 => write!(f, "f"),
            Self::F64 => write!(f, "d"),
            Self::Struct { name, .. } => write!(f, "{{{name}}}"),
            Self::Object => write!(f, "@"),
            Self::Block => write!(f, "@?"),
            Self::OutObject => write!(f, "^@"),
            Self::Pointer => write!(f, "^v"),
        }
    }
}
