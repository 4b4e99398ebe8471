//! Message transport seam
//!
//! A [`Connector`] opens one bidirectional text-message channel to the
//! Gateway. The production connector is a WebSocket via
//! `tokio-tungstenite`; tests plug in an in-memory pair.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::{Error, Result};

/// Outbound half: accepts serialized frames
pub type FrameSink = Pin<Box<dyn Sink<String, Error = Error> + Send>>;

/// Inbound half: yields serialized frames; ends when the peer closes
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens transport connections
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the connection cannot be established
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream)>;
}

/// WebSocket connector
#[derive(Debug, Clone)]
pub struct WsConnector {
    /// Upper bound on TCP + TLS + upgrade time
    pub connect_timeout: Duration,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<(FrameSink, FrameStream)> {
        let (ws, _response) =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| Error::Transport(format!("connect to {url} timed out")))?
                .map_err(|e| Error::Transport(format!("connect to {url} failed: {e}")))?;

        tracing::debug!(url, "websocket open");

        let (write, read) = ws.split();

        let sink = write
            .sink_map_err(|e| Error::Transport(format!("websocket send failed: {e}")))
            .with(|text: String| futures::future::ready(Ok::<_, Error>(Message::Text(text))));

        // Ping/pong is answered by tungstenite itself; binary frames are not part
        // of the protocol
        let stream = futures::stream::unfold(Some(read), |state| async move {
            let mut read = state?;
            loop {
                match read.next().await? {
                    Ok(Message::Text(text)) => return Some((Ok(text), Some(read))),
                    Ok(Message::Close(frame)) => {
                        tracing::debug!(?frame, "websocket closed by peer");
                        return None;
                    }
                    Ok(_) => {}
                    // A read error ends the stream after it is reported
                    Err(e) => {
                        return Some((
                            Err(Error::Transport(format!("websocket read failed: {e}"))),
                            None,
                        ));
                    }
                }
            }
        });

        Ok((Box::pin(sink), Box::pin(stream)))
    }
}
