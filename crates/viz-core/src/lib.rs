//! Platform-independent core of the audio visualizer: source sessions,
//! spectral analysis, transport state and renderer dispatch.

pub mod backend;
pub mod bars;
pub mod constants;
pub mod error;
pub mod frame;
pub mod playback;
pub mod render;
pub mod source;
pub mod spectrum;
pub mod uniforms;
pub mod view;

pub use backend::*;
pub use bars::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use playback::*;
pub use render::*;
pub use source::*;
pub use spectrum::*;
pub use uniforms::*;
pub use view::*;
