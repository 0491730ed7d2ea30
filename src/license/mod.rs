//! License field normalization.
//!
//! - [`extract`] — turns a package's `license`/`licenses` fields into one license string.
//! - [`spdx`] — tokenizes SPDX-style expressions so renderers can link each identifier.

pub mod extract;
pub mod spdx;
