//! Document loading from a local directory

mod parser;
mod reader;

pub use parser::{FileParser, PageContent, ParsedDocument};
pub use reader::DirectoryReader;
