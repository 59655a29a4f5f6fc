pub mod corrector;
pub mod hangul;

pub use corrector::{correct, OcrCorrector};
