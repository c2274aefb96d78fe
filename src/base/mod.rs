//! Foundation types shared by every other module.
//!
//! - [`FileId`], [`NodeId`], [`DefId`] - Source identities
//! - [`FrameId`] - Identity of a shadow-group frame
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`names`] - Conversions between binary, internal and simple names
//!
//! This module has NO dependencies on other crate modules.

mod ids;
pub mod names;

pub use ids::{DefId, FileId, FrameId, NodeId};
pub use names::{binary_to_internal, internal_to_binary, simple_name_of};

pub use text_size::{TextRange, TextSize};
