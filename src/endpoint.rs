use std::fmt;

/// Sender or receiver attached to an envelope header.
///
/// Endpoints hold only owned data, so `clone()` always produces an independent
/// value. Header conversions clone the source and target instead of sharing them,
/// which means editing one envelope's endpoint never leaks into another envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    pub name: String,
    pub address: Option<String>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.address {
            Some(address) => write!(f, "{}@{}", self.name, address),
            None => write!(f, "{}", self.name),
        }
    }
}
