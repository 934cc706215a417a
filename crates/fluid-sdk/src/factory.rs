//! Generic bag factories.
//!
//! These helpers build any bag type implementing [`Bag`] + [`Default`]
//! without knowing the concrete type up front. Note that a defaulted
//! [`FillableBag`](fluid_fillable::FillableBag) has an empty whitelist, so
//! [`make`] and [`from_json`] fail for it on any non-empty input until the
//! caller installs a whitelist; [`make_raw`] bypasses validation and always
//! succeeds.

use fluid_bag::{object_from_json, AttributeMap, Bag, Result};

/// Build a bag and fill it with `attributes`, running setter accessors and
/// whitelist validation.
pub fn make<B: Bag + Default>(attributes: AttributeMap) -> Result<B> {
    let mut bag = B::default();
    bag.fill(attributes)?;
    Ok(bag)
}

/// Build a bag with `attributes` installed wholesale, bypassing setter
/// accessors and whitelist validation.
pub fn make_raw<B: Bag + Default>(attributes: AttributeMap) -> B {
    let mut bag = B::default();
    bag.set_attributes(attributes);
    bag
}

/// Parse a JSON object string and [`make`] a bag from it.
pub fn from_json<B: Bag + Default>(json: &str) -> Result<B> {
    make(object_from_json(json)?)
}
