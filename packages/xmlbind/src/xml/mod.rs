//! XML tree model, parsing and rendering.

pub mod node;
pub mod reader;
pub mod utils;
pub mod writer;

pub use node::{QName, XmlNode};
pub use reader::{parse, parse_str};
pub use utils::*;
pub use writer::write;
