use core::fmt::{Debug, Display};

use crate::alloc::{Arc, String, Vec};
use crate::comparator::Comparator;
use crate::counter::CountMatcher;
use crate::value::{Handle, Value};

type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Decides whether a value at one argument position counts as a match.
///
/// A matcher is either a captured value tested through its [Comparator],
/// a wildcard, or a predicate. Matchers are immutable once created.
#[derive(Clone)]
pub struct ArgumentMatcher {
    kind: MatcherKind,
    comparator: Comparator,
    description: Option<String>,
}

#[derive(Clone)]
enum MatcherKind {
    Value(Value),
    Wildcard,
    Predicate(Arc<PredicateFn>),
}

impl ArgumentMatcher {
    /// Capture `value`, to be compared against future values with `comparator`.
    pub fn from_value(value: impl Into<Value>, comparator: Comparator) -> Self {
        Self {
            kind: MatcherKind::Value(value.into()),
            comparator,
            description: None,
        }
    }

    /// A matcher that succeeds against any value, including null.
    pub fn wildcard() -> Self {
        Self {
            kind: MatcherKind::Wildcard,
            comparator: Comparator::ANY,
            description: None,
        }
    }

    /// A matcher that succeeds when `predicate` accepts the value.
    pub fn predicate<P>(description: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: MatcherKind::Predicate(Arc::new(predicate)),
            comparator: Comparator::ANY,
            description: Some(description.into()),
        }
    }

    /// Override the description shown in failure messages.
    pub fn described_as(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, MatcherKind::Wildcard)
    }

    /// The captured value. `None` for wildcards and predicates.
    pub fn captured_value(&self) -> Option<&Value> {
        match &self.kind {
            MatcherKind::Value(value) => Some(value),
            MatcherKind::Wildcard | MatcherKind::Predicate(_) => None,
        }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Test a candidate value.
    pub fn matches(&self, candidate: &Value) -> bool {
        match &self.kind {
            MatcherKind::Wildcard => true,
            MatcherKind::Predicate(predicate) => predicate(candidate),
            MatcherKind::Value(value) => self.comparator.compare(value, candidate),
        }
    }

    /// Test this matcher against another matcher at the same position.
    ///
    /// Wildcards and predicates on either side decide the outcome, as does a universal
    /// comparator on either side. Otherwise `self`'s comparator is applied to both values.
    pub fn matches_matcher(&self, other: &ArgumentMatcher) -> bool {
        match (&self.kind, &other.kind) {
            (MatcherKind::Wildcard, _) | (_, MatcherKind::Wildcard) => true,
            (MatcherKind::Predicate(predicate), MatcherKind::Value(value))
            | (MatcherKind::Value(value), MatcherKind::Predicate(predicate)) => predicate(value),
            (MatcherKind::Predicate(lhs), MatcherKind::Predicate(rhs)) => core::ptr::eq(
                Arc::as_ptr(lhs) as *const (),
                Arc::as_ptr(rhs) as *const (),
            ),
            (MatcherKind::Value(lhs), MatcherKind::Value(rhs)) => {
                self.comparator.is_universal()
                    || other.comparator.is_universal()
                    || self.comparator.compare(lhs, rhs)
            }
        }
    }
}

impl Display for ArgumentMatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(description) = &self.description {
            return write!(f, "{description}");
        }

        match &self.kind {
            MatcherKind::Wildcard => write!(f, "any()"),
            MatcherKind::Predicate(_) => write!(f, "any(where:)"),
            MatcherKind::Value(value) if self.comparator == Comparator::IDENTITY => {
                write!(f, "{value:?} (by reference)")
            }
            MatcherKind::Value(value) => write!(f, "{value:?}"),
        }
    }
}

impl Debug for ArgumentMatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Box a matcher into an object argument.
///
/// The object handler hands boxed matchers back verbatim instead of capturing them,
/// so stubs and verifications can be expressed through an ordinary intercepted call.
impl From<ArgumentMatcher> for Value {
    fn from(matcher: ArgumentMatcher) -> Self {
        Value::Handle(Handle::opaque(matcher))
    }
}

/// Match any value.
pub fn any() -> ArgumentMatcher {
    ArgumentMatcher::wildcard()
}

/// Match values structurally equal to `value`.
pub fn value(value: impl Into<Value>) -> ArgumentMatcher {
    ArgumentMatcher::from_value(value, Comparator::EQUAL)
}

/// Match the very same object as `value`.
pub fn same(value: impl Into<Value>) -> ArgumentMatcher {
    ArgumentMatcher::from_value(value, Comparator::IDENTITY)
}

/// Match values structurally equal to one of `values`.
pub fn any_of<I>(values: I) -> ArgumentMatcher
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    let description = crate::alloc::format!("any(of: {values:?})");
    ArgumentMatcher::predicate(description, move |candidate| {
        values.iter().any(|value| value.structural_eq(candidate))
    })
}

/// Match any non-null value.
pub fn not_null() -> ArgumentMatcher {
    ArgumentMatcher::predicate("notNil()", |candidate| !candidate.is_null())
}

/// Match values accepted by `predicate`.
///
/// The predicate runs with no mock lock held, so it may call back into the mock.
pub fn any_where<P>(predicate: P) -> ArgumentMatcher
where
    P: Fn(&Value) -> bool + Send + Sync + 'static,
{
    ArgumentMatcher::predicate("any(where:)", predicate)
}

/// Match floats within `tolerance` of `value`, of either width.
pub fn around(value: f64, tolerance: f64) -> ArgumentMatcher {
    let description = crate::alloc::format!("around({value}, tolerance: {tolerance})");
    ArgumentMatcher::predicate(description, move |candidate| match candidate {
        Value::Float(float) => {
            let delta = float.to_f64() - value;
            delta < tolerance && -delta < tolerance
        }
        _ => false,
    })
}

/// Match strings whose number of characters satisfies `count`.
pub fn any_count(count: CountMatcher) -> ArgumentMatcher {
    let description = crate::alloc::format!("any(count: {count})");
    ArgumentMatcher::predicate(description, move |candidate| {
        candidate
            .as_handle()
            .and_then(|handle| handle.downcast_ref::<String>())
            .is_some_and(|string| count.matches(string.chars().count()))
    })
}

/// Match non-empty strings.
pub fn not_empty() -> ArgumentMatcher {
    any_count(crate::counter::at_least(1)).described_as("notEmpty()")
}

/// The ordered list of matchers for one invocation.
#[derive(Clone, Default)]
pub struct CallSignature(Vec<ArgumentMatcher>);

impl CallSignature {
    pub fn new(matchers: Vec<ArgumentMatcher>) -> Self {
        Self(matchers)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ArgumentMatcher> {
        self.0.get(position)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ArgumentMatcher> {
        self.0.iter()
    }

    /// Positional, length-sensitive equality.
    pub fn matches(&self, other: &CallSignature) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(lhs, rhs)| lhs.matches_matcher(rhs))
    }

    /// Compare a stub signature against a call signature, running each matcher once.
    ///
    /// `None` means the call matches.
    pub(crate) fn mismatch(&self, call: &CallSignature) -> Option<SignatureMismatch> {
        if self.len() != call.len() {
            return Some(SignatureMismatch::Arity);
        }

        let positions: Vec<usize> = self
            .iter()
            .zip(call.iter())
            .enumerate()
            .filter(|(_, (lhs, rhs))| !lhs.matches_matcher(rhs))
            .map(|(position, _)| position)
            .collect();

        if positions.is_empty() {
            None
        } else {
            Some(SignatureMismatch::Positions(positions))
        }
    }

    /// The captured argument values, with `Null` standing in for wildcards and predicates.
    pub fn values(&self) -> Vec<Value> {
        self.iter()
            .map(|matcher| matcher.captured_value().cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// How a stub signature failed to match a call.
pub(crate) enum SignatureMismatch {
    Arity,
    Positions(Vec<usize>),
}

impl Display for CallSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[")?;
        for (position, matcher) in self.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{matcher}")?;
        }
        write!(f, "]")
    }
}

impl Debug for CallSignature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<Vec<ArgumentMatcher>> for CallSignature {
    fn from(matchers: Vec<ArgumentMatcher>) -> Self {
        Self(matchers)
    }
}

impl<const N: usize> From<[ArgumentMatcher; N]> for CallSignature {
    fn from(matchers: [ArgumentMatcher; N]) -> Self {
        Self(matchers.into_iter().collect())
    }
}

impl FromIterator<ArgumentMatcher> for CallSignature {
    fn from_iter<I: IntoIterator<Item = ArgumentMatcher>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Captures every value its matcher is compared against.
///
/// The matcher itself accepts any value.
#[cfg(any(feature = "std", feature = "spin-lock"))]
#[derive(Clone, Default)]
pub struct ArgumentCaptor {
    values: Arc<crate::lock::MutexIsh<Vec<Value>>>,
}

#[cfg(any(feature = "std", feature = "spin-lock"))]
impl ArgumentCaptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matcher(&self) -> ArgumentMatcher {
        let values = self.values.clone();
        ArgumentMatcher::predicate("any() (captured)", move |candidate| {
            values.locked(|values| values.push(candidate.clone()));
            true
        })
    }

    /// All captured values, oldest first.
    pub fn values(&self) -> Vec<Value> {
        self.values.locked(|values| values.clone())
    }

    /// The most recently captured value.
    pub fn last(&self) -> Option<Value> {
        self.values.locked(|values| values.last().cloned())
    }
}
