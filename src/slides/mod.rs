//! Turns a Markdown narrative into titled sections, groups them into pages
//! and tracks which page a carousel is showing.

pub mod carousel;
pub mod paginator;
pub mod sectionizer;

pub use carousel::Carousel;
pub use paginator::{paginate, PAGE_SIZE};
pub use sectionizer::{sectionize, Section, DEFAULT_TITLE};
