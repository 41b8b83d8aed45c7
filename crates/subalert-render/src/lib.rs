//! Alert card rendering.
//!
//! An [`AlertRenderer`] loads its fonts and watermark once, at startup, and
//! then turns `(title, body)` pairs into PNG cards sized to fit their text.

pub mod error;
pub mod layout;
mod renderer;
pub mod text;

pub use error::{AssetLoadError, RenderError};
pub use renderer::{AlertRenderer, AssetPaths};
