//! Categorical encoding module
//!
//! String-valued fields are mapped to integer codes so they can travel
//! through the numeric grid pipeline, then mapped back after filling.

mod codec;

pub use codec::{CategoricalCodec, CodecTable, DEFAULT_PLACEHOLDER};
