//! Transfer engine: file-tree ↔ object-prefix synchronization.
//!
//! Two independent operations: [`fetch_tree`] materializes a bucket prefix
//! into a local directory, [`publish_tree`] pushes a local directory back
//! under a key prefix. Neither diffs nor deletes; both are one-way bulk
//! copies over the [`ObjectStore`](crate::store::ObjectStore) capability.

pub mod fetch;
pub mod mime;
pub mod publish;

pub use fetch::fetch_tree;
pub use mime::content_type_for;
pub use publish::publish_tree;
