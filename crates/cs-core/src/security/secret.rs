use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// A sensitive string that must never be logged or serialized.
///
/// Used for the bearer credential pasted by the user:
/// - not `Clone`
/// - no `Serialize` / `Deserialize`
/// - `Debug` / `Display` print a placeholder
/// - zeroed on drop
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Borrow the secret. The only way to read it.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn is_blank(&self) -> bool {
        self.inner.trim().is_empty()
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value.trim().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Deref for SecretString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.expose()
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}
