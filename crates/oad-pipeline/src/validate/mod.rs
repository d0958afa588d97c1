pub mod coverage;
pub mod document;
pub mod index;
pub mod sections;

pub use coverage::check_coverage;
pub use document::validate_document;
pub use index::validate_index;
pub use sections::{Outline, Section, mentions};
