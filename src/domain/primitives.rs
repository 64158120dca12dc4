//! Domain primitives: TimeMs, TokenAddress, Symbol, TokenCategory.

use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// On-chain token contract address (hex string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenAddress(pub String);

impl TokenAddress {
    /// Create a TokenAddress from a string.
    pub fn new(addr: impl Into<String>) -> Self {
        TokenAddress(addr.into())
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token ticker symbol (e.g., "DOGE", "UNI").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a Symbol from a string.
    pub fn new(sym: impl Into<String>) -> Self {
        Symbol(sym.into())
    }

    /// Get the symbol as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token flavor category. Determines the base stat block a creature
/// starts from before level scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Layer1,
    Layer2,
    Defi,
    Meme,
    Exchange,
    Governance,
    Wrapped,
    Unknown,
}

impl TokenCategory {
    /// Parse a category from its lowercase wire name, falling back to Unknown.
    pub fn parse_or_unknown(s: &str) -> Self {
        match s {
            "layer1" => TokenCategory::Layer1,
            "layer2" => TokenCategory::Layer2,
            "defi" => TokenCategory::Defi,
            "meme" => TokenCategory::Meme,
            "exchange" => TokenCategory::Exchange,
            "governance" => TokenCategory::Governance,
            "wrapped" => TokenCategory::Wrapped,
            _ => TokenCategory::Unknown,
        }
    }

    /// Lowercase wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenCategory::Layer1 => "layer1",
            TokenCategory::Layer2 => "layer2",
            TokenCategory::Defi => "defi",
            TokenCategory::Meme => "meme",
            TokenCategory::Exchange => "exchange",
            TokenCategory::Governance => "governance",
            TokenCategory::Wrapped => "wrapped",
            TokenCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&TokenCategory::Meme).unwrap();
        assert_eq!(json, "\"meme\"");

        let parsed: TokenCategory = serde_json::from_str("\"layer1\"").unwrap();
        assert_eq!(parsed, TokenCategory::Layer1);
    }

    #[test]
    fn test_category_parse_fallback() {
        assert_eq!(TokenCategory::parse_or_unknown("meme"), TokenCategory::Meme);
        assert_eq!(
            TokenCategory::parse_or_unknown("stablecoin"),
            TokenCategory::Unknown
        );
    }

    #[test]
    fn test_address_display() {
        let addr = TokenAddress::new("0xabc123");
        assert_eq!(addr.to_string(), "0xabc123");
    }

    #[test]
    fn test_timems_ordering() {
        let t1 = TimeMs::new(1000);
        let t2 = TimeMs::new(2000);
        assert!(t1 < t2);
    }
}
