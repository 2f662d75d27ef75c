/// URL scheme classification.
///
/// Special schemes get WHATWG-mandated treatment elsewhere in the crate:
/// they always carry an authority and a non-opaque path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeKind {
    Http,
    Https,
    Ws,
    Wss,
    Ftp,
    File,
    #[default]
    Other,
}

impl SchemeKind {
    /// Look up the kind for a scheme name (without the trailing `:`).
    /// Filters by length and first byte to minimize comparisons.
    pub fn parse(scheme: &str) -> Self {
        let bytes = scheme.as_bytes();
        match (bytes.len(), bytes.first()) {
            (2, Some(b'w')) if bytes == b"ws" => Self::Ws,
            (3, Some(b'w')) if bytes == b"wss" => Self::Wss,
            (3, Some(b'f')) if bytes == b"ftp" => Self::Ftp,
            (4, Some(b'h')) if bytes == b"http" => Self::Http,
            (4, Some(b'f')) if bytes == b"file" => Self::File,
            (5, Some(b'h')) if bytes == b"https" => Self::Https,
            _ => Self::Other,
        }
    }

    /// Check if this is a special scheme
    pub fn is_special(self) -> bool {
        self != Self::Other
    }

    /// Get the default port for this scheme
    pub fn default_port(self) -> Option<u16> {
        match self {
            Self::Http | Self::Ws => Some(80),
            Self::Https | Self::Wss => Some(443),
            Self::Ftp => Some(21),
            Self::File | Self::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_kind() {
        assert_eq!(SchemeKind::parse("http"), SchemeKind::Http);
        assert_eq!(SchemeKind::parse("https"), SchemeKind::Https);
        assert_eq!(SchemeKind::parse("ftp"), SchemeKind::Ftp);
        assert_eq!(SchemeKind::parse("file"), SchemeKind::File);
        assert_eq!(SchemeKind::parse("custom"), SchemeKind::Other);
        assert!(!SchemeKind::Other.is_special());
        assert_eq!(SchemeKind::Https.default_port(), Some(443));
    }
}
