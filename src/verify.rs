use crate::counter::CountMatcher;
use crate::debug::CallDebug;
use crate::error::{MockError, MockResult};
use crate::invocation::{Invocation, Selector};
use crate::matcher::CallSignature;
use crate::mock::Mock;

/// Checks the calls a mock has recorded for one selector and call pattern.
pub struct Verification<'m> {
    mock: &'m Mock,
    selector: Selector,
    pattern: CallSignature,
}

impl Mock {
    /// Inspect the recorded calls to `selector` whose arguments match `pattern`.
    pub fn verify(
        &self,
        selector: impl Into<Selector>,
        pattern: impl Into<CallSignature>,
    ) -> Verification<'_> {
        Verification {
            mock: self,
            selector: selector.into(),
            pattern: pattern.into(),
        }
    }

    /// Like [Mock::verify], with the pattern encoded from an example call.
    pub fn verify_invocation(&self, invocation: &Invocation) -> MockResult<Verification<'_>> {
        let pattern = self
            .handlers()
            .encode_all(invocation)
            .map_err(|error| MockError::from_handler(self.call_debug(invocation.selector()), error))?;
        Ok(self.verify(invocation.selector(), pattern))
    }
}

impl<'m> Verification<'m> {
    /// Number of recorded calls matching the pattern.
    pub fn count(&self) -> usize {
        self.sequences().len()
    }

    pub fn was_called(&self, expected: CountMatcher) -> MockResult<()> {
        let actual = self.count();
        if expected.matches(actual) {
            Ok(())
        } else {
            Err(MockError::IncorrectInvocationCount {
                call: self.call_debug(),
                expected,
                actual,
            })
        }
    }

    pub fn was_never_called(&self) -> MockResult<()> {
        self.was_called(crate::counter::never())
    }

    fn sequences(&self) -> crate::alloc::Vec<usize> {
        self.mock.matching_sequences(self.selector, &self.pattern)
    }

    fn call_debug(&self) -> CallDebug {
        self.mock
            .call_debug(self.selector)
            .with_arguments(self.pattern.clone())
    }
}

/// Verifies that calls happened in a given order, possibly across mocks.
///
/// Each step must match a call recorded after the call matched by the previous step.
#[derive(Default)]
pub struct InOrder {
    previous: Option<(usize, CallDebug)>,
}

impl InOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify(&mut self, verification: &Verification<'_>) -> MockResult<()> {
        let after = self.previous.as_ref().map(|(sequence, _)| *sequence);
        let found = verification
            .sequences()
            .into_iter()
            .find(|sequence| after.map_or(true, |after| *sequence > after));

        match found {
            Some(sequence) => {
                self.previous = Some((sequence, verification.call_debug()));
                Ok(())
            }
            None => Err(MockError::OutOfOrder {
                call: verification.call_debug(),
                after: self.previous.as_ref().map(|(_, call)| call.clone()),
            }),
        }
    }
}
