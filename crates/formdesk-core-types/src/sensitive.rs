//! Sensitive data marker for log redaction
//!
//! Sender ids are phone numbers or channel handles. They go into replies
//! (the submitter is echoed back) but never into log lines in the clear.

use std::fmt;

/// Shortest value whose tail is shown by [`Sensitive::masked`]
pub const MASK_MIN_LEN: usize = 8;

/// Wrapper that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use formdesk_core_types::Sensitive;
///
/// let sender = Sensitive::new("whatsapp:+15551234567");
/// assert_eq!(format!("{}", sender), "***REDACTED***");
/// assert_eq!(sender.expose(), &"whatsapp:+15551234567");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: AsRef<str>> Sensitive<T> {
    /// Last four characters prefixed by a mask, e.g. `***4567`
    ///
    /// Enough for an operator to tell two senders apart in a log stream.
    /// Values shorter than [`MASK_MIN_LEN`] characters are masked entirely.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.as_ref().chars().collect();
        if chars.len() < MASK_MIN_LEN {
            return "***".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("***{}", tail)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let sender = Sensitive::new("whatsapp:+15550001111");
        let debug_str = format!("{:?}", sender);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("+1555"));
    }

    #[test]
    fn test_sensitive_masked_keeps_tail() {
        let sender = Sensitive::new("whatsapp:+15550001111".to_string());
        assert_eq!(sender.masked(), "***1111");
    }

    #[test]
    fn test_sensitive_masked_short_value_hides_everything() {
        for value in ["s", "ab", "1234", "alice", "+155500"] {
            assert_eq!(Sensitive::new(value).masked(), "***", "value {}", value);
        }
    }

    #[test]
    fn test_sensitive_masked_at_threshold_keeps_tail() {
        assert_eq!(Sensitive::new("12345678").masked(), "***5678");
    }

    #[test]
    fn test_sensitive_into_inner() {
        let secret = Sensitive::new(String::from("test"));
        assert_eq!(secret.into_inner(), "test");
    }
}
