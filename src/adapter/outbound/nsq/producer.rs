//! nsqd producer connection.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::protocol::{self, Frame, HEARTBEAT, MAGIC_V2, NOP, OK};
use crate::error::{Error, Result};
use crate::infrastructure::config::broker::BrokerConfig;
use crate::port::outbound::broker::Broker;

/// Publishes messages to a single nsqd over one TCP connection.
///
/// The connection is dialed on first publish and redialed on the publish
/// after any failure. Each `PUB` waits for nsqd's reply frame before the next
/// command is written, so replies never interleave. A `PUB` that nsqd does not
/// answer within the publish timeout fails and drops the connection.
pub struct NsqProducer {
    address: String,
    dial_timeout: Duration,
    publish_timeout: Duration,
    conn: Option<TcpStream>,
    stopped: bool,
}

impl NsqProducer {
    pub fn new(config: &BrokerConfig) -> Self {
        Self {
            address: config.address.clone(),
            dial_timeout: config.dial_timeout(),
            publish_timeout: config.publish_timeout(),
            conn: None,
            stopped: false,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connection(&mut self) -> Result<&mut TcpStream> {
        if self.conn.is_none() {
            let dial = TcpStream::connect(&self.address);
            let mut stream = match timeout(self.dial_timeout, dial).await {
                Err(_) => return Err(Error::ConnectTimeout(self.dial_timeout)),
                Ok(Err(e)) => return Err(Error::Dial(format!("{}: {e}", self.address))),
                Ok(Ok(stream)) => stream,
            };
            stream.set_nodelay(true)?;
            stream.write_all(MAGIC_V2).await?;
            info!(address = %self.address, "Connected to nsqd");
            self.conn = Some(stream);
        }
        self.conn
            .as_mut()
            .ok_or_else(|| Error::Broker("connection unavailable".to_string()))
    }

    /// Write one `PUB` and wait for its reply, answering heartbeats on the way.
    async fn exchange(conn: &mut TcpStream, command: &[u8]) -> Result<()> {
        conn.write_all(command).await?;
        loop {
            match protocol::read_frame(&mut *conn).await? {
                Frame::Response(data) if data == HEARTBEAT => {
                    debug!("nsqd heartbeat");
                    conn.write_all(NOP).await?;
                }
                Frame::Response(data) if data == OK => return Ok(()),
                Frame::Response(data) => {
                    return Err(Error::Protocol(format!(
                        "unexpected response '{}'",
                        String::from_utf8_lossy(&data)
                    )))
                }
                Frame::Error(data) => {
                    return Err(Error::Broker(String::from_utf8_lossy(&data).into_owned()))
                }
                Frame::Message(_) => {
                    return Err(Error::Protocol("message frame on producer connection".to_string()))
                }
            }
        }
    }
}

#[async_trait]
impl Broker for NsqProducer {
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if self.stopped {
            return Err(Error::Broker("producer stopped".to_string()));
        }
        let command = protocol::encode_pub(topic, payload)?;

        let publish_timeout = self.publish_timeout;
        let conn = self.connection().await?;
        let result = match timeout(publish_timeout, Self::exchange(conn, &command)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Broker(format!(
                "no reply from nsqd within {publish_timeout:?}"
            ))),
        };
        if let Err(ref e) = result {
            warn!(address = %self.address, error = %e, "Dropping nsqd connection after failed publish");
            self.conn = None;
        }
        result
    }

    async fn stop(&mut self) -> Result<()> {
        self.stopped = true;
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.shutdown().await {
                debug!(error = %e, "nsqd connection already closed");
            }
            info!(address = %self.address, "Disconnected from nsqd");
        }
        Ok(())
    }

    fn broker_name(&self) -> &'static str {
        "nsq"
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    use super::*;
    use crate::adapter::outbound::nsq::protocol::encode_frame;

    /// What the fake nsqd saw on one connection.
    #[derive(Debug, PartialEq, Eq)]
    enum Seen {
        Magic,
        Pub { topic: String, body: Vec<u8> },
        Nop,
    }

    /// How the fake nsqd answers each `PUB`.
    #[derive(Clone)]
    enum Reply {
        Ok,
        HeartbeatThenOk,
        Error(&'static str),
        Silent,
    }

    /// Fake nsqd: accepts connections in sequence, answering `PUB`s per
    /// `replies` (shared across connections) and reporting what it saw.
    async fn fake_nsqd(replies: Vec<Reply>) -> (BrokerConfig, mpsc::UnboundedReceiver<Seen>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = BrokerConfig {
            address: listener.local_addr().unwrap().to_string(),
            ..BrokerConfig::default()
        };
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut replies = replies.into_iter();
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut magic = [0u8; 4];
                if socket.read_exact(&mut magic).await.is_err() {
                    continue;
                }
                assert_eq!(&magic, MAGIC_V2);
                let _ = seen_tx.send(Seen::Magic);

                'conn: loop {
                    let mut line = Vec::new();
                    loop {
                        let Ok(byte) = socket.read_u8().await else {
                            break 'conn;
                        };
                        if byte == b'\n' {
                            break;
                        }
                        line.push(byte);
                    }
                    if line == b"NOP" {
                        let _ = seen_tx.send(Seen::Nop);
                        continue;
                    }
                    let line = String::from_utf8(line).unwrap();
                    let topic = line.strip_prefix("PUB ").unwrap().to_string();
                    let size = socket.read_u32().await.unwrap();
                    let mut body = vec![0u8; size as usize];
                    socket.read_exact(&mut body).await.unwrap();
                    let _ = seen_tx.send(Seen::Pub { topic, body });

                    match replies.next().unwrap_or(Reply::Ok) {
                        Reply::Ok => {
                            socket
                                .write_all(&encode_frame(&Frame::Response(OK.to_vec())))
                                .await
                                .unwrap();
                        }
                        Reply::HeartbeatThenOk => {
                            socket
                                .write_all(&encode_frame(&Frame::Response(HEARTBEAT.to_vec())))
                                .await
                                .unwrap();
                            socket
                                .write_all(&encode_frame(&Frame::Response(OK.to_vec())))
                                .await
                                .unwrap();
                        }
                        Reply::Error(message) => {
                            socket
                                .write_all(&encode_frame(&Frame::Error(message.as_bytes().to_vec())))
                                .await
                                .unwrap();
                            break 'conn;
                        }
                        Reply::Silent => {}
                    }
                }
            }
        });

        (config, seen_rx)
    }

    #[tokio::test]
    async fn publishes_after_magic_and_reuses_connection() {
        let (config, mut seen) = fake_nsqd(vec![Reply::Ok, Reply::Ok]).await;
        let mut producer = NsqProducer::new(&config);

        producer.publish("votes", b"cats").await.unwrap();
        producer.publish("votes", b"dogs").await.unwrap();
        assert!(producer.is_connected());

        assert_eq!(seen.recv().await, Some(Seen::Magic));
        assert_eq!(
            seen.recv().await,
            Some(Seen::Pub {
                topic: "votes".to_string(),
                body: b"cats".to_vec()
            })
        );
        assert_eq!(
            seen.recv().await,
            Some(Seen::Pub {
                topic: "votes".to_string(),
                body: b"dogs".to_vec()
            })
        );
    }

    #[tokio::test]
    async fn answers_heartbeat_with_nop() {
        let (config, mut seen) = fake_nsqd(vec![Reply::HeartbeatThenOk]).await;
        let mut producer = NsqProducer::new(&config);

        producer.publish("votes", b"cats").await.unwrap();

        assert_eq!(seen.recv().await, Some(Seen::Magic));
        assert!(matches!(seen.recv().await, Some(Seen::Pub { .. })));
        assert_eq!(seen.recv().await, Some(Seen::Nop));
    }

    #[tokio::test]
    async fn error_frame_fails_publish_and_next_publish_redials() {
        let (config, mut seen) = fake_nsqd(vec![Reply::Error("E_BAD_MESSAGE"), Reply::Ok]).await;
        let mut producer = NsqProducer::new(&config);

        let err = producer.publish("votes", b"cats").await.unwrap_err();
        assert!(matches!(err, Error::Broker(ref m) if m == "E_BAD_MESSAGE"));
        assert!(!producer.is_connected());

        producer.publish("votes", b"dogs").await.unwrap();

        assert_eq!(seen.recv().await, Some(Seen::Magic));
        assert!(matches!(seen.recv().await, Some(Seen::Pub { .. })));
        assert_eq!(seen.recv().await, Some(Seen::Magic));
        assert_eq!(
            seen.recv().await,
            Some(Seen::Pub {
                topic: "votes".to_string(),
                body: b"dogs".to_vec()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn silent_nsqd_times_out_and_drops_connection() {
        let (mut config, mut seen) = fake_nsqd(vec![Reply::Silent, Reply::Ok]).await;
        config.dial_timeout_secs = 86_400;
        let mut producer = NsqProducer::new(&config);

        let started = tokio::time::Instant::now();
        let err = producer.publish("votes", b"cats").await.unwrap_err();
        assert!(matches!(err, Error::Broker(_)), "got {err}");
        assert_eq!(started.elapsed(), config.publish_timeout());
        assert!(!producer.is_connected());

        producer.publish("votes", b"dogs").await.unwrap();
        assert_eq!(seen.recv().await, Some(Seen::Magic));
        assert!(matches!(seen.recv().await, Some(Seen::Pub { .. })));
        assert_eq!(seen.recv().await, Some(Seen::Magic));
    }

    #[tokio::test]
    async fn unreachable_nsqd_is_a_dial_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = BrokerConfig {
            address: listener.local_addr().unwrap().to_string(),
            ..BrokerConfig::default()
        };
        drop(listener);

        let mut producer = NsqProducer::new(&config);
        let err = producer.publish("votes", b"cats").await.unwrap_err();
        assert!(matches!(err, Error::Dial(_)));
    }

    #[tokio::test]
    async fn invalid_topic_is_rejected_without_dialing() {
        let mut producer = NsqProducer::new(&BrokerConfig {
            address: "127.0.0.1:1".to_string(),
            ..BrokerConfig::default()
        });
        let err = producer.publish("bad topic", b"cats").await.unwrap_err();
        assert!(matches!(err, Error::Broker(_)));
        assert!(!producer.is_connected());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_blocks_further_publishes() {
        let (config, _seen) = fake_nsqd(vec![Reply::Ok]).await;
        let mut producer = NsqProducer::new(&config);
        producer.publish("votes", b"cats").await.unwrap();

        producer.stop().await.unwrap();
        producer.stop().await.unwrap();
        assert!(!producer.is_connected());

        let err = producer.publish("votes", b"dogs").await.unwrap_err();
        assert!(matches!(err, Error::Broker(_)));
    }
}
