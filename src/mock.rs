use crate::alloc::{format, Arc, String, Vec};
use crate::context::{
    CallRecord, ContextLayout, Contexts, Outcome, Response, SequenceMode, ValueSequence,
};
use crate::debug::CallDebug;
use crate::error::{MockError, MockResult};
use crate::facade::TypeFacade;
use crate::handler::HandlerChain;
use crate::invocation::{Argument, Invocation, PropertyDescriptor, Selector};
use crate::lock::MutexIsh;
use crate::matcher::CallSignature;
use crate::mismatch::Mismatches;
use crate::signature::TypeSignature;
use crate::value::{Handle, Value};

/// What a mock does with a call that needs a return value but matches no stub.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FallbackMode {
    /// Fail the call with [MockError::MissingStubbedImplementation].
    #[default]
    Error,
    /// Write the default value of the return signature: zero, `false`, null or a zeroed aggregate.
    ReturnDefault,
}

pub(crate) struct SharedState {
    name: &'static str,
    handlers: Arc<HandlerChain>,
    fallback_mode: FallbackMode,
    contexts: Contexts,
    panic_reasons: MutexIsh<Vec<MockError>>,
}

impl SharedState {
    fn prepare_panic(&self, error: MockError) -> String {
        let msg = format!("{error}");
        self.panic_reasons.locked(|reasons| reasons.push(error));
        msg
    }
}

/// The proxy object intercepted calls land on.
///
/// Owns the call records and stubs of one mocked object. Clones share them.
#[derive(Clone)]
pub struct Mock {
    shared: Arc<SharedState>,
}

/// Configures a [Mock] before it receives calls.
pub struct MockBuilder {
    name: &'static str,
    handlers: Option<Arc<HandlerChain>>,
    fallback_mode: FallbackMode,
    layout: ContextLayout,
}

impl MockBuilder {
    /// The handler chain used to encode arguments and decode return values.
    ///
    /// Defaults to [HandlerChain::standard].
    pub fn handlers(mut self, handlers: Arc<HandlerChain>) -> Self {
        self.handlers = Some(handlers);
        self
    }

    pub fn fallback(mut self, fallback_mode: FallbackMode) -> Self {
        self.fallback_mode = fallback_mode;
        self
    }

    pub fn layout(mut self, layout: ContextLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn build(self) -> Mock {
        Mock {
            shared: Arc::new(SharedState {
                name: self.name,
                handlers: self.handlers.unwrap_or_else(HandlerChain::standard),
                fallback_mode: self.fallback_mode,
                contexts: Contexts::new(self.layout),
                panic_reasons: MutexIsh::new(Vec::new()),
            }),
        }
    }
}

enum Resolution {
    Value(Value),
    Thrown,
    Unstubbed(Mismatches),
}

impl Mock {
    /// A mock with the standard handler chain and default settings.
    pub fn new(name: &'static str) -> Self {
        Self::builder(name).build()
    }

    pub fn builder(name: &'static str) -> MockBuilder {
        MockBuilder {
            name,
            handlers: None,
            fallback_mode: FallbackMode::default(),
            layout: ContextLayout::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.name
    }

    pub fn handlers(&self) -> &Arc<HandlerChain> {
        &self.shared.handlers
    }

    /// Handle an intercepted call.
    ///
    /// Encodes every argument, records the call, then writes the result of the most
    /// recently registered matching stub into the return slot. The call is recorded
    /// whether or not a stub matches.
    pub fn dispatch(&self, invocation: &mut Invocation) -> MockResult<()> {
        let (signature, resolution) = self.resolve(invocation)?;

        if invocation.return_signature().is_void() {
            return Ok(());
        }

        match resolution {
            Resolution::Value(value) => self.decode(&value, invocation),
            Resolution::Thrown => self.write_default(invocation),
            Resolution::Unstubbed(mismatches) => match self.shared.fallback_mode {
                FallbackMode::ReturnDefault => {
                    tracing::warn!(
                        mock = self.shared.name,
                        selector = invocation.selector().name(),
                        "no stub matched, returning default value"
                    );
                    self.write_default(invocation)
                }
                FallbackMode::Error => Err(MockError::MissingStubbedImplementation {
                    call: self.call_debug(invocation.selector()).with_arguments(signature),
                    mismatches,
                }),
            },
        }
    }

    /// Handle an intercepted call, panicking on failure.
    ///
    /// The failure is also kept in [Mock::panic_reasons], so it can be reported
    /// even if the panic is caught on another thread.
    #[track_caller]
    pub fn invoke(&self, invocation: &mut Invocation) {
        if let Err(error) = self.dispatch(invocation) {
            self.induce_panic(error)
        }
    }

    /// Handle a call whose return type is not known at the call site.
    ///
    /// The stubbed value is boxed into a [TypeFacade] instead of being written into
    /// the return slot. Its concrete type is fixed later with [TypeFacade::fixup_type].
    pub fn call_generic<T>(&self, invocation: &Invocation) -> MockResult<TypeFacade<T>> {
        let (signature, resolution) = self.resolve(invocation)?;

        let object = match resolution {
            Resolution::Value(value) => {
                self.check_decodable(&value, invocation)?;
                value
            }
            Resolution::Thrown => Value::Null,
            Resolution::Unstubbed(mismatches) => match self.shared.fallback_mode {
                FallbackMode::ReturnDefault => {
                    Value::default_for(invocation.return_signature()).unwrap_or(Value::Null)
                }
                FallbackMode::Error => {
                    return Err(MockError::MissingStubbedImplementation {
                        call: self.call_debug(invocation.selector()).with_arguments(signature),
                        mismatches,
                    })
                }
            },
        };

        Ok(TypeFacade::init_with_mock(self.clone(), object))
    }

    /// Start registering a stub for `selector` called with arguments matching `signature`.
    pub fn given(
        &self,
        selector: impl Into<Selector>,
        signature: impl Into<CallSignature>,
    ) -> Stubbing<'_> {
        Stubbing {
            mock: self,
            selector: selector.into(),
            signature: signature.into(),
        }
    }

    /// Start registering a stub from an example call.
    ///
    /// The call's arguments are encoded with the handler chain, so boxed matchers
    /// in object arguments act as matchers. The call is not recorded.
    pub fn when(&self, invocation: &Invocation) -> MockResult<Stubbing<'_>> {
        let signature = self.encode(invocation)?;
        Ok(self.given(invocation.selector(), signature))
    }

    /// Every call recorded so far, oldest first.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.shared
            .contexts
            .mocking(|mocking| mocking.records().to_vec())
    }

    /// Remove all stubs and call records.
    pub fn reset(&self) {
        self.clear_stubs();
        self.clear_invocations();
    }

    pub fn clear_stubs(&self) {
        self.shared.contexts.stubbing(|stubbing| stubbing.clear());
    }

    pub fn clear_invocations(&self) {
        self.shared.contexts.mocking(|mocking| mocking.clear());
    }

    /// Read a property through its getter selector.
    pub fn get_property(
        &self,
        property: &PropertyDescriptor,
        signature: TypeSignature,
    ) -> MockResult<Value> {
        let getter = property
            .getter
            .ok_or_else(|| self.missing_accessor(property, "getter"))?;

        let mut invocation = Invocation::new(getter).returns(signature);
        self.dispatch(&mut invocation)?;
        Ok(invocation.return_value().unwrap_or(Value::Null))
    }

    /// Write a property through its setter selector.
    pub fn set_property(&self, property: &PropertyDescriptor, value: Argument) -> MockResult<()> {
        let setter = property
            .setter
            .ok_or_else(|| self.missing_accessor(property, "setter"))?;

        self.dispatch(&mut Invocation::new(setter).arg(value))
    }

    /// Stub a read-write property to return the value most recently written through
    /// its setter, starting with `initial`.
    #[cfg(any(feature = "std", feature = "spin-lock"))]
    #[cfg_attr(
        feature = "unstable-doc-cfg",
        doc(cfg(any(feature = "std", feature = "spin-lock")))
    )]
    pub fn last_set_value(
        &self,
        property: &PropertyDescriptor,
        initial: impl Into<Value>,
    ) -> MockResult<()> {
        let getter = property
            .getter
            .ok_or_else(|| self.missing_accessor(property, "getter"))?;
        let setter = property
            .setter
            .ok_or_else(|| self.missing_accessor(property, "setter"))?;

        let current = Arc::new(MutexIsh::new(initial.into()));
        let stored = current.clone();

        self.given(getter, CallSignature::default())
            .will(move |_| current.locked(|value| value.clone()));
        self.given(setter, [crate::matcher::any()]).will(move |args| {
            if let Some(value) = args.first() {
                stored.locked(|stored| *stored = value.clone());
            }
            Value::Null
        });
        Ok(())
    }

    /// Failures reported through [Mock::invoke] so far.
    pub fn panic_reasons(&self) -> Vec<MockError> {
        self.shared.panic_reasons.locked(|reasons| reasons.clone())
    }

    #[track_caller]
    pub(crate) fn induce_panic(&self, error: MockError) -> ! {
        let msg = self.shared.prepare_panic(error);
        panic!("{}", msg);
    }

    pub(crate) fn call_debug(&self, selector: Selector) -> CallDebug {
        CallDebug::new(self.shared.name, selector)
    }

    pub(crate) fn matching_sequences(
        &self,
        selector: Selector,
        pattern: &CallSignature,
    ) -> Vec<usize> {
        // Matchers run outside the lock, so predicates may call back into the mock.
        let records = self
            .shared
            .contexts
            .mocking(|mocking| mocking.records_of(selector));
        records
            .iter()
            .filter(|record| pattern.matches(record.signature()))
            .map(CallRecord::sequence)
            .collect()
    }

    fn encode(&self, invocation: &Invocation) -> MockResult<CallSignature> {
        self.shared
            .handlers
            .encode_all(invocation)
            .map_err(|error| MockError::from_handler(self.call_debug(invocation.selector()), error))
    }

    fn decode(&self, value: &Value, invocation: &mut Invocation) -> MockResult<()> {
        let selector = invocation.selector();
        self.shared
            .handlers
            .decode(value, invocation)
            .map_err(|error| MockError::from_handler(self.call_debug(selector), error))
    }

    /// A concretely typed return slot must be able to receive `value`, as it would on
    /// a direct call. Void and object slots accept anything boxed.
    fn check_decodable(&self, value: &Value, invocation: &Invocation) -> MockResult<()> {
        let signature = *invocation.return_signature();
        if matches!(signature, TypeSignature::Void | TypeSignature::Object)
            || self.shared.handlers.decoder(value, invocation).is_some()
        {
            return Ok(());
        }

        Err(MockError::UnsupportedType {
            call: self.call_debug(invocation.selector()),
            position: crate::invocation::Position::Return,
            signature,
        })
    }

    fn write_default(&self, invocation: &mut Invocation) -> MockResult<()> {
        match Value::default_for(invocation.return_signature()) {
            Some(value) => self.decode(&value, invocation),
            None => Err(MockError::UnsupportedType {
                call: self.call_debug(invocation.selector()),
                position: crate::invocation::Position::Return,
                signature: *invocation.return_signature(),
            }),
        }
    }

    fn resolve(&self, invocation: &Invocation) -> MockResult<(CallSignature, Resolution)> {
        let selector = invocation.selector();
        let signature = self.encode(invocation)?;

        let sequence = self
            .shared
            .contexts
            .mocking(|mocking| mocking.record(selector, signature.clone()));
        tracing::debug!(
            mock = self.shared.name,
            selector = selector.name(),
            sequence,
            "recorded call"
        );

        let snapshot = self
            .shared
            .contexts
            .stubbing(|stubbing| stubbing.snapshot(selector));

        let resolved = snapshot.find(&signature).and_then(|stub_index| {
            self.shared
                .contexts
                .stubbing(|stubbing| stubbing.next_outcome(selector, &snapshot, stub_index))
                .map(|outcome| (stub_index, outcome))
        });

        let (stub_index, outcome) = match resolved {
            Ok(resolved) => resolved,
            Err(mismatches) => return Ok((signature, Resolution::Unstubbed(mismatches))),
        };
        tracing::debug!(
            mock = self.shared.name,
            selector = selector.name(),
            stub = stub_index.0,
            "resolved stub"
        );

        // No lock is held here, so answers may call back into the mock.
        let resolution = match outcome {
            Outcome::Return(value) => Resolution::Value(value),
            Outcome::Answer(answer) => Resolution::Value(answer(&signature.values())),
            Outcome::Throw(error) => {
                let out = invocation.error_out().ok_or_else(|| MockError::CannotThrow {
                    call: self.call_debug(selector).with_arguments(signature.clone()),
                })?;
                out.set(Some(error));
                Resolution::Thrown
            }
        };

        Ok((signature, resolution))
    }

    fn missing_accessor(&self, property: &PropertyDescriptor, accessor: &'static str) -> MockError {
        MockError::MissingAccessor {
            mock_name: self.shared.name,
            property: property.name,
            accessor,
        }
    }

    fn register(&self, selector: Selector, signature: CallSignature, response: Response) {
        let stub_index = self
            .shared
            .contexts
            .stubbing(|stubbing| stubbing.register(selector, signature, response));
        tracing::debug!(
            mock = self.shared.name,
            selector = selector.name(),
            stub = stub_index.0,
            "registered stub"
        );
    }
}

impl core::fmt::Debug for Mock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Mock")
            .field("name", &self.shared.name)
            .field("handlers", &self.shared.handlers)
            .finish()
    }
}

/// A stub being registered. Finish it with one of the `will*` methods.
#[must_use]
pub struct Stubbing<'m> {
    mock: &'m Mock,
    selector: Selector,
    signature: CallSignature,
}

impl<'m> Stubbing<'m> {
    /// Return `value` from matching calls.
    pub fn will_return(self, value: impl Into<Value>) {
        self.mock
            .register(self.selector, self.signature, Outcome::Return(value.into()).into());
    }

    /// Compute the return value from the captured arguments of each matching call.
    ///
    /// Wildcard positions, such as out-parameters, are passed as [Value::Null].
    pub fn will<F>(self, answer: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.mock
            .register(self.selector, self.signature, Outcome::Answer(Arc::new(answer)).into());
    }

    /// Write `error` into the error out-parameter of matching calls.
    ///
    /// The return slot receives the default value of its signature.
    pub fn will_throw(self, error: Handle) {
        self.mock
            .register(self.selector, self.signature, Outcome::Throw(error).into());
    }

    /// Return `values` one per matching call, then keep returning the last one.
    pub fn will_return_sequence<I>(self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.sequence(values, SequenceMode::LastValue);
    }

    /// Return `values` one per matching call, starting over after the last one.
    pub fn will_return_looping<I>(self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.sequence(values, SequenceMode::Looping);
    }

    /// Return `values` one per matching call.
    ///
    /// Once they run out, matching calls are treated as unstubbed.
    pub fn will_return_finite<I>(self, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.sequence(values, SequenceMode::Finite);
    }

    fn sequence<I>(self, values: I, mode: SequenceMode)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.mock.register(
            self.selector,
            self.signature,
            Response::Sequence(ValueSequence::new(values, mode)),
        );
    }
}

/// Implemented by every object whose intercepted calls end up in a [Mock].
pub trait Proxy {
    fn mock(&self) -> &Mock;

    /// Forward an intercepted call to the owning mock.
    fn forward(&self, invocation: &mut Invocation) -> MockResult<()> {
        self.mock().dispatch(invocation)
    }
}

impl Proxy for Mock {
    fn mock(&self) -> &Mock {
        self
    }
}
