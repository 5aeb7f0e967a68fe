//! Student models, re-exported from `hostelbyte-models`.

pub use hostelbyte_models::students::*;
