use core::fmt::Display;
use core::ops::RangeInclusive;

/// An expectation on the number of matching calls.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CountMatcher {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    Between(RangeInclusive<usize>),
}

impl CountMatcher {
    pub fn matches(&self, actual: usize) -> bool {
        match self {
            Self::Exactly(target) => actual == *target,
            Self::AtLeast(target) => actual >= *target,
            Self::AtMost(target) => actual <= *target,
            Self::Between(range) => range.contains(&actual),
        }
    }
}

impl Display for CountMatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Exactly(target) => write!(f, "exactly {}", NCalls(*target)),
            Self::AtLeast(target) => write!(f, "at least {}", NCalls(*target)),
            Self::AtMost(target) => write!(f, "at most {}", NCalls(*target)),
            Self::Between(range) => write!(
                f,
                "between {} and {}",
                range.start(),
                NCalls(*range.end())
            ),
        }
    }
}

pub fn exactly(times: usize) -> CountMatcher {
    CountMatcher::Exactly(times)
}

pub fn at_least(times: usize) -> CountMatcher {
    CountMatcher::AtLeast(times)
}

pub fn at_most(times: usize) -> CountMatcher {
    CountMatcher::AtMost(times)
}

pub fn between(range: RangeInclusive<usize>) -> CountMatcher {
    CountMatcher::Between(range)
}

pub fn once() -> CountMatcher {
    CountMatcher::Exactly(1)
}

pub fn never() -> CountMatcher {
    CountMatcher::Exactly(0)
}

pub(crate) struct NCalls(pub usize);

impl Display for NCalls {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            1 => write!(f, "1 time"),
            _ => write!(f, "{} times", self.0),
        }
    }
}
