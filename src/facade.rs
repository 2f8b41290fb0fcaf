use core::marker::PhantomData;

use crate::alloc::format;
use crate::error::{MockError, MockResult};
use crate::mock::{Mock, Proxy};
use crate::value::{FromValue, Value};

/// A placeholder returned from a call site that cannot name its return type.
///
/// The facade holds the boxed result together with the mock that produced it.
/// Calls made through it are forwarded to that mock, and [TypeFacade::fixup_type]
/// turns it into the concrete `T` once the caller knows it.
pub struct TypeFacade<T> {
    object: Value,
    mock: Mock,
    target: PhantomData<fn() -> T>,
}

impl<T> TypeFacade<T> {
    pub fn init_with_mock(mock: Mock, object: Value) -> Self {
        Self {
            object,
            mock,
            target: PhantomData,
        }
    }

    /// Box `object` on behalf of `owner` for a generic call site.
    pub fn create_from_object(owner: &Mock, object: impl Into<Value>) -> Self {
        Self::init_with_mock(owner.clone(), object.into())
    }

    /// The boxed object. Reading it is not a forwarded call.
    pub fn object(&self) -> &Value {
        &self.object
    }

    /// The owning mock. Reading it is not a forwarded call.
    pub fn mock(&self) -> &Mock {
        &self.mock
    }
}

impl<T: FromValue> TypeFacade<T> {
    /// Coerce the boxed object into `T`.
    ///
    /// Fails with [MockError::TypeCoercionViolation] if the object cannot satisfy `T`.
    pub fn fixup_type(self) -> MockResult<T> {
        T::from_value(&self.object).ok_or_else(|| MockError::TypeCoercionViolation {
            expected: core::any::type_name::<T>(),
            actual: format!("{:?}", self.object),
        })
    }

    /// Like [TypeFacade::fixup_type], but panics through the owning mock on failure.
    #[track_caller]
    pub fn fixup(self) -> T {
        let mock = self.mock.clone();
        match self.fixup_type() {
            Ok(value) => value,
            Err(error) => mock.induce_panic(error),
        }
    }
}

impl<T> Proxy for TypeFacade<T> {
    fn mock(&self) -> &Mock {
        &self.mock
    }
}

impl<T> core::fmt::Debug for TypeFacade<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeFacade")
            .field("object", &self.object)
            .field("mock", &self.mock.name())
            .finish()
    }
}
