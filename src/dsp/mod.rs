//! # DSP (Digital Signal Processing) Building Blocks
//!
//! - **`delay_line`**: the ring buffer and the read/write head pair.
//! - **`tempo`**: note divisions and the tempo → delay length resolver.
//! - **`effect_params`**: lock-free parameter cells shared with the
//!   control surface.
//! - **`ping_pong`**: the engine that ties them together into a cross-fed
//!   stereo delay.

pub mod delay_line;
pub mod effect_params;
pub mod ping_pong;
pub mod tempo;
