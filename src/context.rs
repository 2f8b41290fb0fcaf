use core::sync::atomic::{AtomicUsize, Ordering};

use crate::alloc::{Arc, BTreeMap, Vec};
use crate::debug::StubIndex;
use crate::invocation::Selector;
use crate::lock::MutexIsh;
use crate::matcher::CallSignature;
use crate::mismatch::Mismatches;
use crate::value::{Handle, Value};

/// Stamped on every recorded call, across all mocks, so calls can be ordered globally.
static NEXT_SEQUENCE: AtomicUsize = AtomicUsize::new(0);

fn next_sequence() -> usize {
    NEXT_SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

/// One intercepted call, as recorded by a mock.
#[derive(Clone, Debug)]
pub struct CallRecord {
    selector: Selector,
    signature: CallSignature,
    sequence: usize,
}

impl CallRecord {
    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn signature(&self) -> &CallSignature {
        &self.signature
    }

    /// Process-wide position of this call. Later calls have higher numbers.
    pub fn sequence(&self) -> usize {
        self.sequence
    }
}

#[derive(Default)]
pub(crate) struct MockingContext {
    records: Vec<CallRecord>,
}

impl MockingContext {
    pub fn record(&mut self, selector: Selector, signature: CallSignature) -> usize {
        let sequence = next_sequence();
        self.records.push(CallRecord {
            selector,
            signature,
            sequence,
        });
        sequence
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    /// The calls to `selector`, oldest first.
    pub fn records_of(&self, selector: Selector) -> Vec<CallRecord> {
        self.records
            .iter()
            .filter(|record| record.selector == selector)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

pub(crate) type AnswerFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// What a matched stub produces.
#[derive(Clone)]
pub(crate) enum Outcome {
    Return(Value),
    Answer(Arc<AnswerFn>),
    Throw(Handle),
}

/// How a [ValueSequence] continues once its last value has been produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum SequenceMode {
    /// Keep producing the last value.
    LastValue,
    /// Start over from the first value.
    Looping,
    /// Produce nothing more.
    Finite,
}

/// Values handed out one per matching call.
pub(crate) struct ValueSequence {
    values: Vec<Value>,
    mode: SequenceMode,
    index: usize,
}

impl ValueSequence {
    pub fn new(values: Vec<Value>, mode: SequenceMode) -> Self {
        Self {
            values,
            mode,
            index: 0,
        }
    }

    fn next(&mut self) -> Option<Value> {
        let value = self.values.get(self.index)?.clone();
        let count = self.values.len();
        self.index = if self.index + 1 < count {
            self.index + 1
        } else {
            match self.mode {
                SequenceMode::LastValue => count - 1,
                SequenceMode::Looping => 0,
                SequenceMode::Finite => count,
            }
        };
        Some(value)
    }
}

/// What a stub does each time it is selected.
pub(crate) enum Response {
    Fixed(Outcome),
    Sequence(ValueSequence),
}

impl From<Outcome> for Response {
    fn from(outcome: Outcome) -> Self {
        Self::Fixed(outcome)
    }
}

struct Stub {
    signature: CallSignature,
    response: Response,
}

/// The stub signatures of one selector, copied out of the stubbing context.
///
/// Matching runs on the snapshot, so matchers may call back into the mock.
pub(crate) struct StubSnapshot {
    generation: usize,
    signatures: Vec<CallSignature>,
}

impl StubSnapshot {
    /// Find the most recently registered stub matching `call`.
    ///
    /// Every matcher runs at most once. On failure, reports how each stub differs
    /// from the call, oldest stub first.
    pub fn find(&self, call: &CallSignature) -> Result<StubIndex, Mismatches> {
        let mut failures = Vec::new();
        for (index, signature) in self.signatures.iter().enumerate().rev() {
            match signature.mismatch(call) {
                None => return Ok(StubIndex(index)),
                Some(mismatch) => failures.push((index, signature, mismatch)),
            }
        }

        let mut mismatches = Mismatches::new();
        for (index, signature, mismatch) in failures.into_iter().rev() {
            mismatches.collect_from_stub(StubIndex(index), signature, call, &mismatch);
        }
        Err(mismatches)
    }
}

#[derive(Default)]
pub(crate) struct StubbingContext {
    stubs: BTreeMap<Selector, Vec<Stub>>,
    generation: usize,
}

impl StubbingContext {
    pub fn register(
        &mut self,
        selector: Selector,
        signature: CallSignature,
        response: Response,
    ) -> StubIndex {
        let stubs = self.stubs.entry(selector).or_default();
        stubs.push(Stub {
            signature,
            response,
        });
        StubIndex(stubs.len() - 1)
    }

    pub fn snapshot(&self, selector: Selector) -> StubSnapshot {
        StubSnapshot {
            generation: self.generation,
            signatures: self
                .stubs
                .get(&selector)
                .into_iter()
                .flatten()
                .map(|stub| stub.signature.clone())
                .collect(),
        }
    }

    /// Produce the outcome of a stub found in `snapshot`, advancing its value sequence.
    ///
    /// Fails if the stubs were cleared since the snapshot was taken, or if the
    /// stub's sequence is exhausted.
    pub fn next_outcome(
        &mut self,
        selector: Selector,
        snapshot: &StubSnapshot,
        stub_index: StubIndex,
    ) -> Result<Outcome, Mismatches> {
        if snapshot.generation != self.generation {
            return Err(Mismatches::new());
        }
        let stub = self
            .stubs
            .get_mut(&selector)
            .and_then(|stubs| stubs.get_mut(stub_index.0))
            .ok_or_else(Mismatches::new)?;

        match &mut stub.response {
            Response::Fixed(outcome) => Ok(outcome.clone()),
            Response::Sequence(sequence) => sequence
                .next()
                .map(Outcome::Return)
                .ok_or_else(|| Mismatches::exhausted(stub_index)),
        }
    }

    pub fn clear(&mut self) {
        self.stubs.clear();
        self.generation += 1;
    }
}

/// How a mock stores its call records and stubs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ContextLayout {
    /// A mocking context and a stubbing context, each behind its own lock.
    #[default]
    Split,
    /// One context holding both, behind a single lock.
    Combined,
}

#[derive(Default)]
struct CombinedContext {
    mocking: MockingContext,
    stubbing: StubbingContext,
}

pub(crate) enum Contexts {
    Split {
        mocking: MutexIsh<MockingContext>,
        stubbing: MutexIsh<StubbingContext>,
    },
    Combined(MutexIsh<CombinedContext>),
}

impl Contexts {
    pub fn new(layout: ContextLayout) -> Self {
        match layout {
            ContextLayout::Split => Self::Split {
                mocking: Default::default(),
                stubbing: Default::default(),
            },
            ContextLayout::Combined => Self::Combined(Default::default()),
        }
    }

    pub fn mocking<U>(&self, func: impl FnOnce(&mut MockingContext) -> U) -> U {
        match self {
            Self::Split { mocking, .. } => mocking.locked(func),
            Self::Combined(combined) => combined.locked(|combined| func(&mut combined.mocking)),
        }
    }

    pub fn stubbing<U>(&self, func: impl FnOnce(&mut StubbingContext) -> U) -> U {
        match self {
            Self::Split { stubbing, .. } => stubbing.locked(func),
            Self::Combined(combined) => combined.locked(|combined| func(&mut combined.stubbing)),
        }
    }
}
