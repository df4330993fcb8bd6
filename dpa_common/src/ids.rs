use std::{convert::Infallible, fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Renders a JSON scalar the way the store would print it. Numbers and strings are accepted, everything else is not an
/// identifier.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//--------------------------------------        VendorId       ---------------------------------------------------------
/// A marketplace vendor (store) identifier.
///
/// The store API is inconsistent about whether vendor ids are numbers or strings, so every comparison happens on the
/// string form: `VendorId::from_value(&json!(42)) == VendorId::from("42")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VendorId(String);

impl VendorId {
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self(id.as_ref().trim().to_string())
    }

    /// Coerce a JSON value into a vendor id. Returns `None` for anything that is not a non-empty string or a number.
    pub fn from_value(value: &Value) -> Option<Self> {
        scalar_to_string(value).filter(|s| !s.is_empty()).map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if `value`, stringified, is this vendor id. An empty vendor id never matches anything.
    pub fn matches(&self, value: &Value) -> bool {
        !self.is_empty() && scalar_to_string(value).is_some_and(|s| s == self.0)
    }
}

impl From<&str> for VendorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VendorId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<u64> for VendorId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl FromStr for VendorId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// An order identifier, unique within the store. The API sends these as numbers; locally they are always strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for OrderId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serialize for OrderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        scalar_to_string(&value)
            .filter(|s| !s.is_empty())
            .map(OrderId)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid order id: {value}")))
    }
}
