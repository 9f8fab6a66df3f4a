//! Explicit auth context for store-adapter calls.

/// Bearer-token session handed to every store-adapter call.
///
/// Token acquisition (SSO redirect flow) is an external collaborator; nothing
/// in this crate reads the token from global state.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_value() {
        let session = Session::new("secret");
        assert_eq!(session.bearer(), "Bearer secret");
    }
}
