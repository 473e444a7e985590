use core::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Element-level types. Every value in a filter has one of these, either
/// directly or as the element type of a list.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    Bool,
    Int,
    UInt,
    Float,
    Str,
    IpAddr,
    MacAddr,
}

impl ScalarType {
    pub const ALL: [ScalarType; 7] = [
        ScalarType::Bool,
        ScalarType::Int,
        ScalarType::UInt,
        ScalarType::Float,
        ScalarType::Str,
        ScalarType::IpAddr,
        ScalarType::MacAddr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Str => "string",
            ScalarType::IpAddr => "ip",
            ScalarType::MacAddr => "mac",
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The static type of an expression node.
///
/// Lists are one level deep: a list's elements are always scalars, which is
/// what keeps `[1, 2] in [1, 2, 3]` from type-checking.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    Scalar(ScalarType),
    List(ScalarType),
}

impl Type {
    pub const BOOL: Type = Type::Scalar(ScalarType::Bool);
    pub const INT: Type = Type::Scalar(ScalarType::Int);
    pub const UINT: Type = Type::Scalar(ScalarType::UInt);
    pub const FLOAT: Type = Type::Scalar(ScalarType::Float);
    pub const STR: Type = Type::Scalar(ScalarType::Str);
    pub const IP_ADDR: Type = Type::Scalar(ScalarType::IpAddr);
    pub const MAC_ADDR: Type = Type::Scalar(ScalarType::MacAddr);

    pub const fn list_of(element: ScalarType) -> Type {
        Type::List(element)
    }

    pub fn is_list(self) -> bool {
        matches!(self, Type::List(_))
    }

    /// The scalar type for scalars, the element type for lists.
    pub fn element(self) -> ScalarType {
        match self {
            Type::Scalar(s) | Type::List(s) => s,
        }
    }

    /// Parses the names produced by `Display`, e.g. `uint` or `list<ip>`.
    pub fn from_name(name: &str) -> Option<Type> {
        let name = name.trim();
        if let Some(inner) = name
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return match Type::from_name(inner)? {
                Type::Scalar(s) => Some(Type::List(s)),
                Type::List(_) => None,
            };
        }
        ScalarType::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .map(Type::Scalar)
    }
}

impl From<ScalarType> for Type {
    fn from(s: ScalarType) -> Self {
        Type::Scalar(s)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(s) => write!(f, "{}", s),
            Type::List(s) => write!(f, "list<{}>", s),
        }
    }
}
