//! Records decoded from the stream.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// One decoded unit from the stream source.
///
/// Only the `text` field matters for matching. Control messages that carry no
/// text (limit notices, deletes) decode with an empty string and match nothing
/// unless an empty term is tracked.
///
/// Text that is not valid UTF-8, including lone surrogate escapes, decodes
/// with U+FFFD in place of the bad sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StreamRecord {
    #[serde(default, deserialize_with = "lossy_text")]
    pub text: String,
}

impl StreamRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

fn lossy_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct LossyText;

    impl Visitor<'_> for LossyText {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<String, E> {
            Ok(String::from_utf8_lossy(v).into_owned())
        }
    }

    // Raw bytes skip UTF-8 validation; lone surrogates arrive WTF-8 encoded.
    deserializer.deserialize_bytes(LossyText)
}
