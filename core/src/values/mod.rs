mod addr;
mod value;

pub use addr::{AddrParseError, IpPrefix, MacAddr};
pub use value::Value;
