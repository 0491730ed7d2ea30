//! Report renderers for a finished [`Inventory`](crate::models::Inventory).
//!
//! - [`html`] — self-contained page with license and dependency-type filters.
//! - [`terminal`] — aligned license summary; respects `--verbose` / `--quiet`.

pub mod html;
pub mod terminal;
