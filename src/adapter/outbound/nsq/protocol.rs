//! nsqd V2 wire format.
//!
//! Commands are newline-terminated text, optionally followed by a 4-byte
//! big-endian body size and the body. Every reply from nsqd is a frame:
//!
//! ```text
//! [ size: u32 BE ][ frame type: i32 BE ][ data: size - 4 bytes ]
//! ```

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// Protocol magic sent once, right after connecting.
pub const MAGIC_V2: &[u8; 4] = b"  V2";

/// No-op command, the required answer to a heartbeat.
pub const NOP: &[u8] = b"NOP\n";

pub const HEARTBEAT: &[u8] = b"_heartbeat_";
pub const OK: &[u8] = b"OK";

const FRAME_TYPE_RESPONSE: i32 = 0;
const FRAME_TYPE_ERROR: i32 = 1;
const FRAME_TYPE_MESSAGE: i32 = 2;

/// Upper bound on an incoming frame; anything larger is a corrupt stream.
const MAX_FRAME_SIZE: u32 = 16 * 1024 * 1024;

const MAX_TOPIC_LENGTH: usize = 64;
const EPHEMERAL_SUFFIX: &str = "#ephemeral";

/// A frame received from nsqd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Response(Vec<u8>),
    Error(Vec<u8>),
    Message(Vec<u8>),
}

/// Whether nsqd would accept `name` as a topic.
#[must_use]
pub fn is_valid_topic_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_TOPIC_LENGTH {
        return false;
    }
    let stem = name.strip_suffix(EPHEMERAL_SUFFIX).unwrap_or(name);
    !stem.is_empty()
        && stem
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// `PUB <topic>\n[size][body]`.
///
/// # Errors
///
/// Returns [`Error::Broker`] for an invalid topic or an oversized body.
pub fn encode_pub(topic: &str, body: &[u8]) -> Result<Vec<u8>> {
    if !is_valid_topic_name(topic) {
        return Err(Error::Broker(format!("invalid topic name '{topic}'")));
    }
    let size = u32::try_from(body.len())
        .map_err(|_| Error::Broker(format!("message too large: {} bytes", body.len())))?;

    let mut out = Vec::with_capacity(5 + topic.len() + 4 + body.len());
    out.extend_from_slice(b"PUB ");
    out.extend_from_slice(topic.as_bytes());
    out.push(b'\n');
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(body);
    Ok(out)
}

/// Encode a frame the way nsqd sends it.
#[must_use]
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let (frame_type, data) = match frame {
        Frame::Response(data) => (FRAME_TYPE_RESPONSE, data),
        Frame::Error(data) => (FRAME_TYPE_ERROR, data),
        Frame::Message(data) => (FRAME_TYPE_MESSAGE, data),
    };
    let size = (data.len() + 4) as u32;
    let mut out = Vec::with_capacity(8 + data.len());
    out.extend_from_slice(&size.to_be_bytes());
    out.extend_from_slice(&frame_type.to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// Read one frame.
///
/// # Errors
///
/// Returns [`Error::Io`] if the connection fails and [`Error::Protocol`] for
/// a malformed frame.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let size = reader.read_u32().await?;
    if !(4..=MAX_FRAME_SIZE).contains(&size) {
        return Err(Error::Protocol(format!("invalid frame size {size}")));
    }
    let frame_type = reader.read_i32().await?;
    let mut data = vec![0u8; (size - 4) as usize];
    reader.read_exact(&mut data).await?;

    match frame_type {
        FRAME_TYPE_RESPONSE => Ok(Frame::Response(data)),
        FRAME_TYPE_ERROR => Ok(Frame::Error(data)),
        FRAME_TYPE_MESSAGE => Ok(Frame::Message(data)),
        other => Err(Error::Protocol(format!("unknown frame type {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_names_follow_nsqd_rules() {
        assert!(is_valid_topic_name("votes"));
        assert!(is_valid_topic_name("poll.votes_v2-a"));
        assert!(is_valid_topic_name("votes#ephemeral"));
        assert!(is_valid_topic_name(&"a".repeat(64)));

        assert!(!is_valid_topic_name(""));
        assert!(!is_valid_topic_name("#ephemeral"));
        assert!(!is_valid_topic_name("votes!"));
        assert!(!is_valid_topic_name("two words"));
        assert!(!is_valid_topic_name(&"a".repeat(65)));
    }

    #[test]
    fn pub_command_layout() {
        let encoded = encode_pub("votes", b"cats").unwrap();
        assert_eq!(&encoded[..10], b"PUB votes\n");
        assert_eq!(&encoded[10..14], &4u32.to_be_bytes());
        assert_eq!(&encoded[14..], b"cats");
    }

    #[test]
    fn pub_rejects_invalid_topic() {
        assert!(matches!(encode_pub("bad topic", b"x"), Err(Error::Broker(_))));
    }

    #[tokio::test]
    async fn reads_response_and_error_frames() {
        let mut bytes = encode_frame(&Frame::Response(OK.to_vec()));
        bytes.extend(encode_frame(&Frame::Error(b"E_BAD_TOPIC".to_vec())));
        let mut reader = bytes.as_slice();

        assert_eq!(read_frame(&mut reader).await.unwrap(), Frame::Response(b"OK".to_vec()));
        assert_eq!(
            read_frame(&mut reader).await.unwrap(),
            Frame::Error(b"E_BAD_TOPIC".to_vec())
        );
    }

    #[tokio::test]
    async fn frame_split_across_reads_is_reassembled() {
        let bytes = encode_frame(&Frame::Response(HEARTBEAT.to_vec()));
        let mut reader = tokio_test::io::Builder::new()
            .read(&bytes[..3])
            .read(&bytes[3..10])
            .read(&bytes[10..])
            .build();

        assert_eq!(
            read_frame(&mut reader).await.unwrap(),
            Frame::Response(HEARTBEAT.to_vec())
        );
    }

    #[tokio::test]
    async fn undersized_frame_is_a_protocol_error() {
        let bytes = 2u32.to_be_bytes();
        let mut reader = &bytes[..];
        assert!(matches!(read_frame(&mut reader).await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn truncated_frame_is_an_io_error() {
        let mut bytes = encode_frame(&Frame::Response(OK.to_vec()));
        bytes.truncate(9);
        let mut reader = bytes.as_slice();
        assert!(matches!(read_frame(&mut reader).await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn unknown_frame_type_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&9i32.to_be_bytes());
        bytes.extend_from_slice(b"OK");
        let mut reader = bytes.as_slice();
        assert!(matches!(read_frame(&mut reader).await, Err(Error::Protocol(_))));
    }
}
