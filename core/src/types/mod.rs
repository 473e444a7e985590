mod types;

pub use types::{ScalarType, Type};
