//! Recipient list normalization

/// Characters accepted as list separators besides whitespace
const SEPARATORS: [char; 2] = [',', ';'];

/// Normalized recipient list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipientList {
    addresses: Vec<String>,
    fallback: bool,
}

impl RecipientList {
    /// Parse a free-form recipient string.
    ///
    /// Commas, semicolons and whitespace all separate entries. Only tokens
    /// containing `@` are kept, in input order and without deduplication.
    /// When nothing looks like an address, the trimmed input is kept as a
    /// single entry so a malformed list is rejected downstream instead of
    /// silently dropped. Blank input yields an empty list.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        let addresses: Vec<String> = trimmed
            .replace(&SEPARATORS[..], " ")
            .split_whitespace()
            .filter(|token| token.contains('@'))
            .map(str::to_string)
            .collect();

        if addresses.is_empty() {
            Self {
                addresses: vec![trimmed.to_string()],
                fallback: true,
            }
        } else {
            Self {
                addresses,
                fallback: false,
            }
        }
    }

    /// True when the raw input was kept because no address token was found
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.addresses
    }

    pub fn into_vec(self) -> Vec<String> {
        self.addresses
    }
}

/// Split a free-form recipient string into address tokens
pub fn normalize_recipients(raw: &str) -> Vec<String> {
    RecipientList::parse(raw).into_vec()
}
