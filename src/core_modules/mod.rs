pub mod analyzer;
pub mod background;
pub mod classifier;
pub mod frame;
pub mod gate;
pub mod overlay;
