//! Article text handling: frontmatter parsing, output filenames, and
//! cleanup of HTML fragments returned by the text-generation service.

mod filename;
mod fragment;
mod frontmatter;

pub use filename::{output_filename, slugify_title};
pub use fragment::clean_fragment;
pub use frontmatter::{ParsedArticle, parse_frontmatter};
