//! Catalog metadata for sqlvet
//!
//! The validator consumes catalog information through the [`Catalog`] trait:
//! table and column lookup, function signatures, the access policy and
//! structural limits. [`InMemoryCatalog`] is the bundled implementation, built
//! programmatically or loaded from a JSON document.

mod functions;
mod memory;
mod metadata;
mod policy;
mod provider;

pub use functions::standard_functions;
pub use memory::*;
pub use metadata::*;
pub use policy::*;
pub use provider::*;
