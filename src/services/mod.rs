pub mod annotator;
pub mod locator;
pub mod normalizer;
pub mod ocr;
pub mod resolver;

pub use annotator::Annotator;
pub use locator::{locate_all, locate_image_units};
pub use normalizer::{normalize_ocr, normalize_text, normalize_unit};
pub use ocr::{CapabilityLoader, OcrBackend, OcrHandle, Recognition, TesseractPageBackend};
pub use resolver::{AnswerResolver, HttpAnswerResolver};
