//! Registries consulted by the codec at runtime.
//!
//! [`ObjectRegistry`] maps opaque handles to live objects that were handed to
//! a client by reference. [`TypeRegistry`] maps type tags to factories able to
//! rebuild an instance from inline wire data.

#![warn(missing_docs, clippy::pedantic)]

pub mod objects;
pub mod types;

pub use objects::ObjectRegistry;
pub use types::{RecordFactory, TypeFactory, TypeRegistry};
