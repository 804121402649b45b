//! Article content helpers (Hugo front matter).

pub mod front_matter;

pub use front_matter::{generate_filename, slugify, FrontMatter, ParsedDocument};
