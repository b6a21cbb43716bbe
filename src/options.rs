//! Contains all of the types needed to specify options to operations.
//!
//! Most of the options structs in this module use the
//! [`typed-builder`](https://crates.io/crates/typed-builder) crate to derive a type-safe builder
//! API on them. For example, to create an instance of
//! [`UpdateOptions`](struct.UpdateOptions.html) with only `upsert` and `write_concern` set, the
//! builder API can be used as follows:
//!
//! ```rust
//! # use mongodb_write_core::options::{UpdateOptions, WriteConcern};
//! #
//! # let options = UpdateOptions::builder()
//! #                   .upsert(true)
//! #                   .write_concern(WriteConcern::majority())
//! #                   .build();
//! ```

pub use crate::{
    cmap::options::*,
    coll::options::*,
    concern::*,
    db::options::*,
    index::options::*,
};
