//! Common types shared by every layer: values, documents, conversion and
//! small utilities.

mod convertible;
mod document;
mod sort_order;
mod task_util;
mod value;

pub use convertible::*;
pub use document::*;
pub use sort_order::*;
pub use task_util::*;
pub use value::*;
