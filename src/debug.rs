use crate::invocation::Selector;
use crate::matcher::CallSignature;

/// Identifies a call (or call pattern) in error messages.
#[derive(Clone)]
pub struct CallDebug {
    pub(crate) mock_name: &'static str,
    pub(crate) selector: Selector,
    pub(crate) arguments: Option<CallSignature>,
}

impl CallDebug {
    pub(crate) fn new(mock_name: &'static str, selector: Selector) -> Self {
        Self {
            mock_name,
            selector,
            arguments: None,
        }
    }

    pub(crate) fn with_arguments(mut self, arguments: CallSignature) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn mock_name(&self) -> &'static str {
        self.mock_name
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }
}

impl core::fmt::Display for CallDebug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "'{}.{}'", self.mock_name, self.selector)?;
        match &self.arguments {
            Some(arguments) if !arguments.is_empty() => write!(f, " with arguments {arguments}"),
            _ => Ok(()),
        }
    }
}

impl core::fmt::Debug for CallDebug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct StubIndex(pub usize);

impl core::fmt::Display for StubIndex {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
