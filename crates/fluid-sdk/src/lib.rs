//! Facade for the Fluid attribute bag workspace.
//!
//! Re-exports the bag types and trait alongside generic factory helpers.
//! This is the crate applications depend on when they want the whole
//! surface at once.

pub mod factory;

pub use factory::{from_json, make, make_raw};

// Re-export key types
pub use fluid_bag::{
    object_from_json, AbsencePolicy, AccessorTable, AttributeMap, Bag, BagError, FluidBag,
    Getter, Result, Setter, Value,
};
pub use fluid_fillable::FillableBag;
