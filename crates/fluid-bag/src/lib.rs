//! Core attribute bag for the Fluid workspace.
//!
//! A [`FluidBag`] is a dynamically-typed, in-memory container mapping string
//! keys to arbitrary JSON-representable values. Attributes keep their
//! insertion order, can be intercepted by per-key getter/setter accessors,
//! optionally hidden from serialized output, and round-tripped through JSON.
//!
//! # Architecture
//!
//! - **Attributes** live in an insertion-ordered map of `String` to
//!   [`Value`]. A single bag holds heterogeneous value kinds at once.
//! - **Accessors** are per-key closures registered in an explicit table and
//!   consulted before the raw map on every `get`/`set`. They replace the
//!   kind of runtime method-name dispatch a dynamic language would use.
//! - **Hiding** is a serialization-time concern only: hidden keys stay in
//!   the bag and remain readable, they just drop out of `to_map`/`to_json`
//!   while the hiding flag is on.
//! - **Restricted bags** (see the `fluid-fillable` crate) reuse this crate's
//!   [`Bag`] trait and error types to enforce a key whitelist.
//!
//! # Modules
//!
//! - [`error`] — Error types for bag operations
//! - [`value`] — Value aliases, absence policy, and JSON object parsing
//! - [`accessor`] — The per-key getter/setter registration table
//! - [`traits`] — The [`Bag`] trait defining the shared contract
//! - [`bag`] — The core [`FluidBag`] implementation

pub mod accessor;
pub mod bag;
pub mod error;
pub mod traits;
pub mod value;

pub use accessor::{AccessorTable, Getter, Setter};
pub use bag::FluidBag;
pub use error::{BagError, Result};
pub use traits::Bag;
pub use value::{object_from_json, AbsencePolicy, AttributeMap, Value};
