//! Time-series preparation: period bounds, field policies and normalization.

pub mod fields;
pub mod normalize;
pub mod period;

#[cfg(test)]
mod test_properties;
