pub mod health;
pub mod ocr;

pub use health::root;
