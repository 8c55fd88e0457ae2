//! Entity metadata and entity/record conversion.
//!
//! An [Entity] describes the collection and fields of a persistable type; the
//! [EntityConverter] turns entities into store [Record](crate::store::Record)s
//! and back.

mod converter;
mod entity;

pub use converter::*;
pub use entity::*;
