//! Whitelist-restricted attribute bag.
//!
//! A [`FillableBag`] behaves like the core `fluid-bag` container but only
//! accepts writes for keys on its fillable list. Violations fail at write
//! time with [`BagError::AttributeNotAllowed`]; they are never silently
//! dropped, and a rejected write leaves prior state untouched. Batch fills
//! are all-or-nothing: the whole batch is validated before any entry is
//! applied.
//!
//! # Modules
//!
//! - [`fillable`] — The [`FillableBag`] implementation

pub mod fillable;

pub use fillable::FillableBag;
pub use fluid_bag::{Bag, BagError, Result};
