//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, customer table and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color scheme and text styling

pub mod input;
pub mod render;
pub mod styles;
