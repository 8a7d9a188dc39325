//! Java class-file support for the jarweave merge pass.
//!
//! Reads compile-time constant fields out of route-map and service-provider
//! holders, and regenerates the service-provider injector with the harvested
//! metadata embedded as constants.

mod constant;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;
mod rewriter;
mod scanner;

pub use constant::{read_split_constant, read_static_constant};
pub use error::ClassScanError;
pub use rewriter::ConstantFieldInjector;
pub use scanner::ClassFieldScanner;
