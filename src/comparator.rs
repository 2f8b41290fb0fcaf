use crate::value::Value;

/// A named, stateless equality predicate over two type-erased values.
///
/// Comparators are plain function pointers, so they are `Copy` and can be shared freely.
/// Two comparators are the same comparator when they have the same name.
#[derive(Clone, Copy)]
pub struct Comparator {
    name: &'static str,
    compare_fn: fn(&Value, &Value) -> bool,
    universal: bool,
}

impl Comparator {
    /// Structural equality. See [Value::structural_eq].
    pub const EQUAL: Comparator = Comparator {
        name: "equal",
        compare_fn: structural_eq,
        universal: false,
    };

    /// Matches any pair of values. Used for argument types with no meaningful equality.
    pub const ANY: Comparator = Comparator {
        name: "any",
        compare_fn: always,
        universal: true,
    };

    /// Object identity: both values are handles to the same allocation, or both are null.
    pub const IDENTITY: Comparator = Comparator {
        name: "identity",
        compare_fn: identity,
        universal: false,
    };

    /// A custom comparator.
    pub const fn new(name: &'static str, compare_fn: fn(&Value, &Value) -> bool) -> Self {
        Self {
            name,
            compare_fn,
            universal: false,
        }
    }

    /// Never mutates either operand.
    pub fn compare(&self, lhs: &Value, rhs: &Value) -> bool {
        (self.compare_fn)(lhs, rhs)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this comparator accepts every pair of values.
    pub fn is_universal(&self) -> bool {
        self.universal
    }
}

impl PartialEq for Comparator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.universal == other.universal
    }
}

impl core::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Comparator({})", self.name)
    }
}

fn structural_eq(lhs: &Value, rhs: &Value) -> bool {
    lhs.structural_eq(rhs)
}

fn always(_: &Value, _: &Value) -> bool {
    true
}

fn identity(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Handle(lhs), Value::Handle(rhs)) => lhs.ptr_eq(rhs),
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}
