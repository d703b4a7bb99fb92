mod document;

pub use document::{Document, Field};
