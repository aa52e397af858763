//! Owned per-pixel buffers used for depth, confidence and gradient maps.
pub mod f32;

pub use self::f32::ImageF32;
