use secrecy::{ExposeSecret, SecretString};

/// Process-wide settings shared with the request handlers.
///
/// Built once at startup and cloned into the router; nothing mutates it afterwards.
#[derive(Clone)]
pub struct GlobalArgs {
    pub admin_secret: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(admin_secret: SecretString) -> Self {
        Self { admin_secret }
    }

    /// Compare a candidate admin key against the configured secret.
    ///
    /// Every byte is inspected regardless of where the first mismatch occurs.
    #[must_use]
    pub fn admin_key_matches(&self, candidate: Option<&str>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };

        let expected = self.admin_secret.expose_secret().as_bytes();
        let candidate = candidate.as_bytes();

        if expected.is_empty() || expected.len() != candidate.len() {
            return false;
        }

        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("admin_secret", &"***")
            .finish()
    }
}
