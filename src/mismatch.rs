use core::fmt::Display;

use crate::alloc::{format, vec, String, Vec};
use crate::debug::StubIndex;
use crate::matcher::{CallSignature, SignatureMismatch};

/// Why the registered stubs of a selector did not match a call.
#[derive(Clone, Default)]
pub struct Mismatches {
    mismatches: Vec<(StubIndex, Mismatch)>,
}

impl Mismatches {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record how one stub signature failed to match the call's signature.
    pub(crate) fn collect_from_stub(
        &mut self,
        stub_index: StubIndex,
        stub: &CallSignature,
        call: &CallSignature,
        mismatch: &SignatureMismatch,
    ) {
        let positions = match mismatch {
            SignatureMismatch::Arity => {
                self.mismatches.push((
                    stub_index,
                    Mismatch::Arity {
                        expected: stub.len(),
                        actual: call.len(),
                    },
                ));
                return;
            }
            SignatureMismatch::Positions(positions) => positions,
        };

        for position in positions {
            let (Some(expected), Some(actual)) = (stub.get(*position), call.get(*position)) else {
                continue;
            };

            self.mismatches.push((
                stub_index,
                Mismatch::Argument {
                    position: *position,
                    actual: format!("{actual}"),
                    expected: format!("{expected}"),
                },
            ));
        }
    }

    /// The stub matched, but its value sequence has run out.
    pub(crate) fn exhausted(stub_index: StubIndex) -> Self {
        Self {
            mismatches: vec![(stub_index, Mismatch::Exhausted)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    fn has_unique_stub_index(&self) -> bool {
        match self.mismatches.first() {
            Some((first, _)) => self.mismatches.iter().all(|(index, _)| index == first),
            None => true,
        }
    }
}

impl Display for Mismatches {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.mismatches.is_empty() {
            return write!(f, " No stubs are registered for this selector.");
        }

        writeln!(f)?;

        let is_unique_stub = self.has_unique_stub_index();

        for (stub_index, mismatch) in &self.mismatches {
            match mismatch {
                Mismatch::Arity { expected, actual } => {
                    write!(f, "Arity mismatch for ")?;
                    MismatchLocation::new(*stub_index, None, is_unique_stub).fmt(f)?;
                    writeln!(
                        f,
                        ": stub expects {expected} arguments, but the call has {actual}."
                    )?;
                }
                Mismatch::Exhausted => {
                    write!(f, "Value sequence of ")?;
                    MismatchLocation::new(*stub_index, None, is_unique_stub).fmt(f)?;
                    writeln!(f, " is exhausted.")?;
                }
                Mismatch::Argument {
                    position,
                    actual,
                    expected,
                } => {
                    write!(f, "Argument mismatch for ")?;
                    MismatchLocation::new(*stub_index, Some(*position), is_unique_stub).fmt(f)?;
                    writeln!(f, " (actual / expected):")?;
                    Diff::new(actual, expected).fmt(f)?;
                }
            }
        }

        Ok(())
    }
}

impl core::fmt::Debug for Mismatches {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

#[derive(Clone)]
pub(crate) enum Mismatch {
    Arity {
        expected: usize,
        actual: usize,
    },
    Argument {
        position: usize,
        actual: String,
        expected: String,
    },
    Exhausted,
}

struct MismatchLocation {
    stub_index: StubIndex,
    position: Option<usize>,
    is_unique_stub: bool,
}

impl MismatchLocation {
    fn new(stub_index: StubIndex, position: Option<usize>, is_unique_stub: bool) -> Self {
        Self {
            stub_index,
            position,
            is_unique_stub,
        }
    }
}

impl Display for MismatchLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match (self.is_unique_stub, self.position) {
            (true, Some(position)) => write!(f, "argument #{position}"),
            (true, None) => write!(f, "stub {}", self.stub_index),
            (false, Some(position)) => {
                write!(f, "stub {}, argument #{position}", self.stub_index)
            }
            (false, None) => write!(f, "stub {}", self.stub_index),
        }
    }
}

struct Diff<'s> {
    actual: &'s str,
    expected: &'s str,
}

impl<'s> Diff<'s> {
    fn new(actual: &'s impl AsRef<str>, expected: &'s impl AsRef<str>) -> Self {
        Self {
            actual: actual.as_ref(),
            expected: expected.as_ref(),
        }
    }
}

impl<'s> Display for Diff<'s> {
    #[cfg(feature = "pretty-print")]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let comparison = pretty_assertions::StrComparison::new(self.actual, self.expected);
        write!(f, "{comparison}")
    }

    #[cfg(not(feature = "pretty-print"))]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "  actual: {}", self.actual)?;
        writeln!(f, "expected: {}", self.expected)?;
        Ok(())
    }
}
