//! Network address values: IP addresses with an optional prefix length, and
//! MAC addresses.

use core::fmt;
use core::str::FromStr;
use std::net::IpAddr;

#[cfg(feature = "serde")]
use serde::Serialize;

/// An IPv4 or IPv6 address with a prefix length.
///
/// A plain address carries the full prefix (32 or 128). Equality between two
/// prefixes compares only the leading bits covered by the shorter of the two
/// prefix lengths, so `10.1.2.3 == 10.0.0.0/8` holds.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpPrefix {
    addr: IpAddr,
    prefix: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrParseError {
    InvalidAddress,
    InvalidPrefix,
}

impl fmt::Display for AddrParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddrParseError::InvalidAddress => write!(f, "invalid address"),
            AddrParseError::InvalidPrefix => write!(f, "invalid prefix length"),
        }
    }
}

impl IpPrefix {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, AddrParseError> {
        if prefix > Self::max_prefix(&addr) {
            return Err(AddrParseError::InvalidPrefix);
        }
        Ok(Self { addr, prefix })
    }

    pub fn host(addr: IpAddr) -> Self {
        let prefix = Self::max_prefix(&addr);
        Self { addr, prefix }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn max_prefix(addr: &IpAddr) -> u8 {
        match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }

    /// Prefix-aware match. Addresses of different families never match.
    pub fn matches(&self, other: &IpPrefix) -> bool {
        let bits = self.prefix.min(other.prefix) as u32;
        match (self.addr, other.addr) {
            (IpAddr::V4(a), IpAddr::V4(b)) => {
                let mask = u32::MAX.checked_shl(32 - bits).unwrap_or(0);
                u32::from(a) & mask == u32::from(b) & mask
            }
            (IpAddr::V6(a), IpAddr::V6(b)) => {
                let mask = u128::MAX.checked_shl(128 - bits).unwrap_or(0);
                u128::from(a) & mask == u128::from(b) & mask
            }
            _ => false,
        }
    }
}

impl FromStr for IpPrefix {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((addr, prefix)) => {
                let addr: IpAddr = addr.parse().map_err(|_| AddrParseError::InvalidAddress)?;
                let prefix: u8 = prefix.parse().map_err(|_| AddrParseError::InvalidPrefix)?;
                IpPrefix::new(addr, prefix)
            }
            None => s
                .parse()
                .map(IpPrefix::host)
                .map_err(|_| AddrParseError::InvalidAddress),
        }
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix == Self::max_prefix(&self.addr) {
            write!(f, "{}", self.addr)
        } else {
            write!(f, "{}/{}", self.addr, self.prefix)
        }
    }
}

/// A 48-bit hardware address.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; 6]);

impl FromStr for MacAddr {
    type Err = AddrParseError;

    /// Accepts exactly six colon-separated groups of two hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut groups = s.split(':');
        for octet in octets.iter_mut() {
            let group = groups.next().ok_or(AddrParseError::InvalidAddress)?;
            if group.len() != 2 {
                return Err(AddrParseError::InvalidAddress);
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| AddrParseError::InvalidAddress)?;
        }
        if groups.next().is_some() {
            return Err(AddrParseError::InvalidAddress);
        }
        Ok(MacAddr(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}
