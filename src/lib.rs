//! `proxymock` is the dispatch and matching core of a mock-object library.
//!
//! Calls land on a [Mock] as [Invocation]s: a selector, a list of raw arguments
//! tagged with their [TypeSignature], and a typed return slot. The mock turns each
//! argument into an [ArgumentMatcher] using its [HandlerChain], records the call,
//! and writes the result of the most recently registered matching stub back into
//! the return slot.
//!
//! ```rust
//! use proxymock::*;
//!
//! let bird = Mock::new("Bird");
//! bird.given("canChirp:", [value(7_i32)]).will_return(true);
//! bird.given("canChirp:", [any()]).will_return(false);
//!
//! // The later, broader stub wins for every volume.
//! let mut call = Invocation::new("canChirp:")
//!     .arg(Argument::primitive(7_i32))
//!     .returns(TypeSignature::Bool);
//! bird.dispatch(&mut call).unwrap();
//! assert_eq!(Some(false), call.return_primitive::<bool>());
//!
//! bird.verify("canChirp:", [any()]).was_called(once()).unwrap();
//! ```
//!
//! # Handler chain
//! Arguments and return values only carry their low-level type signature. A
//! [HandlerChain] is an ordered list of type-specific strategies; for every slot
//! the first handler able to handle it does the work. Narrow handlers must
//! be placed before broad ones. See [HandlerChain::standard] for the default order.
//!
//! # Features
//! * `std` (default): links the standard library and guards mock state with `std::sync::Mutex`.
//! * `spin-lock`: guards mock state with `spin::Mutex` when `std` is disabled.
//! * `pretty-print` (default): colored diffs in mismatch reports.
//! * `critical-section`: lazy initialization of the standard chain on targets without atomics.
//!
//! Without `std` or `spin-lock`, mocks are single-threaded.

#![no_std]
#![forbid(unsafe_code)]
#![cfg_attr(feature = "unstable-doc-cfg", feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

pub mod handler;

mod comparator;
mod context;
mod counter;
mod debug;
mod error;
mod facade;
mod invocation;
mod lock;
mod matcher;
mod mismatch;
mod mock;
mod signature;
mod value;
mod verify;

pub use comparator::Comparator;
pub use context::{CallRecord, ContextLayout};
pub use counter::{at_least, at_most, between, exactly, never, once, CountMatcher};
pub use debug::CallDebug;
pub use error::{MockError, MockResult};
pub use facade::TypeFacade;
pub use handler::{HandlerChain, InvocationHandler};
pub use invocation::{
    Argument, Invocation, OutPointer, Position, PropertyDescriptor, RawArgument, Selector,
};
#[cfg(any(feature = "std", feature = "spin-lock"))]
#[cfg_attr(
    feature = "unstable-doc-cfg",
    doc(cfg(any(feature = "std", feature = "spin-lock")))
)]
pub use matcher::ArgumentCaptor;
pub use matcher::{
    any, any_count, any_of, any_where, around, not_empty, not_null, same, value, ArgumentMatcher,
    CallSignature,
};
pub use mismatch::Mismatches;
pub use mock::{FallbackMode, Mock, MockBuilder, Proxy, Stubbing};
pub use signature::TypeSignature;
pub use value::{Aggregate, Capability, Float, FromValue, Handle, Int, Primitive, Value};
pub use verify::{InOrder, Verification};

mod alloc {
    extern crate alloc;

    pub use alloc::boxed::Box;
    pub use alloc::collections::BTreeMap;
    pub use alloc::format;
    pub use alloc::string::{String, ToString};
    pub use alloc::sync::Arc;
    pub use alloc::vec;
    pub use alloc::vec::Vec;
}
