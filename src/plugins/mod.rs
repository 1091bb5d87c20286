//! Bevy plugins wiring input, loading, rendering, and UI to the domain
//! modules at the crate root.

pub mod core;
pub mod dataset;
pub mod interaction;
pub mod render2d;
pub mod sliders;
pub mod ui;
