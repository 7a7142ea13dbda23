//! Read-only collaborators loaded once per campaign.
//!
//! [`TaskCatalog`] is the static list of candidate sampling tasks;
//! [`GroundTruth`] maps a location and time to the value a worker would
//! have measured there. Both are constructed explicitly and injected into
//! policies; neither is mutated after loading.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod ground_truth;

pub use catalog::TaskCatalog;
pub use error::CatalogError;
pub use ground_truth::GroundTruth;
