//! User Data Entity

/// The single text blob stored per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_name: String,
    pub content: String,
}

impl UserData {
    /// Build from a raw request body, dropping invalid UTF-8 sequences.
    pub fn from_body(user_name: impl Into<String>, body: &[u8]) -> Self {
        Self {
            user_name: user_name.into(),
            content: strip_invalid_utf8(body),
        }
    }
}

/// Keep every valid UTF-8 run and drop the invalid bytes between them.
pub fn strip_invalid_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_utf8_is_untouched() {
        assert_eq!(strip_invalid_utf8("hello 世界".as_bytes()), "hello 世界");
        assert_eq!(strip_invalid_utf8(b""), "");
    }

    #[test]
    fn test_invalid_sequences_are_removed() {
        assert_eq!(strip_invalid_utf8(b"he\xffllo"), "hello");
        assert_eq!(strip_invalid_utf8(b"\xc3\x28abc"), "(abc");
        assert_eq!(strip_invalid_utf8(b"\xf0\x9f\x98"), "");
    }

    #[test]
    fn test_from_body() {
        let data = UserData::from_body("alice", b"hi\x80!");
        assert_eq!(data.user_name, "alice");
        assert_eq!(data.content, "hi!");
    }
}
