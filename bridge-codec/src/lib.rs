//! Value codec for exposing host values to JSON-only tool clients.
//!
//! A [`TypeDescriptor`] describes the shape of exchanged data and knows how to
//! encode a [`HostValue`](bridge_primitives::HostValue) into a wire value and back.
//! When no descriptor is declared, [`Codec::serialize_value`] infers one, or
//! hands attribute-bearing objects to the client by reference through the
//! object registry. [`project`] renders descriptors as discovery schemas.

#![warn(missing_docs, clippy::pedantic)]

mod codec;
mod coerce;
mod descriptor;
mod infer;
mod schema;

pub use codec::{Codec, DEFAULT_MAX_INFERENCE_DEPTH};
pub use descriptor::{ObjectDescriptor, TypeDescriptor};
pub use infer::infer;
pub use schema::{SchemaPolicy, project};
