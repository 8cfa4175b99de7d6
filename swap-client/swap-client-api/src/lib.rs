//! Data types and pure helpers shared between the swap client and the UI
//! shell that renders it
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(unsafe_code)]

mod serialization;
mod types;
pub use types::*;
