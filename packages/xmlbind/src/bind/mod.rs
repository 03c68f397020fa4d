//! The binding engine: path resolution, coercion and the tree walkers.

mod coerce;
pub mod de;
mod resolver;
pub mod ser;

pub use de::Deserializer;
pub use ser::Serializer;
