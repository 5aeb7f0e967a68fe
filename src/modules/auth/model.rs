//! Auth models, re-exported from `hostelbyte-models`.

pub use hostelbyte_models::auth::*;
