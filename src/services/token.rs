/// Identifies one issued request so its response can be matched against the
/// latest request for the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Hands out strictly increasing tokens
#[derive(Debug, Default)]
pub struct TokenIssuer {
    last: u64,
}

impl TokenIssuer {
    pub fn issue(&mut self) -> RequestToken {
        self.last += 1;
        RequestToken(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase() {
        let mut issuer = TokenIssuer::default();
        let first = issuer.issue();
        let second = issuer.issue();
        assert!(second > first);
        assert_ne!(first, second);
    }
}
