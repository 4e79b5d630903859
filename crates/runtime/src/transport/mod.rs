//! WebSocket transport for the multiworld protocol.
//!
//! Every frame is a text message holding a JSON array of packets. The sender
//! half batches outbound packets into one frame; the receiver half yields the
//! decoded packets of each inbound frame.
//!
//! # Addressing
//!
//! A bare host is tried as `wss://host:port` first and `ws://host:port`
//! second. An explicit scheme is used as given.

use std::time::Duration;

use ap_protocol::{ClientPacket, ServerPacket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// WebSocket stream produced by [`connect`].
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Returns the URLs to try for `host:port`, in order.
pub fn candidate_urls(host: &str, port: u16) -> Vec<String> {
	let (scheme, rest) = match host.split_once("://") {
		Some((scheme, rest)) => (Some(scheme), rest),
		None => (None, host),
	};
	let rest = rest.trim_end_matches('/');
	let address = if rest.contains(':') {
		rest.to_string()
	} else {
		format!("{rest}:{port}")
	};

	match scheme {
		Some(scheme) => vec![format!("{scheme}://{address}")],
		None => vec![format!("wss://{address}"), format!("ws://{address}")],
	}
}

/// Opens a WebSocket to `host:port`, trying each candidate URL in turn.
///
/// Each attempt is bounded by `timeout`.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<WsStream> {
	let mut last_error = String::from("no address to try");

	for url in candidate_urls(host, port) {
		debug!(target = "ap.transport", %url, "Opening WebSocket");
		match tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url.as_str())).await {
			Ok(Ok((stream, _response))) => {
				debug!(target = "ap.transport", %url, "WebSocket open");
				return Ok(stream);
			}
			Ok(Err(e)) => {
				debug!(target = "ap.transport", %url, error = %e, "WebSocket attempt failed");
				last_error = e.to_string();
			}
			Err(_) => {
				debug!(target = "ap.transport", %url, "WebSocket attempt timed out");
				last_error = format!("timed out after {}s", timeout.as_secs());
			}
		}
	}

	Err(Error::ConnectionFailed {
		address: format!("{host}:{port}"),
		reason: last_error,
	})
}

/// Serializes packets into one frame.
pub fn encode(packets: &[ClientPacket]) -> Result<String> {
	Ok(serde_json::to_string(packets)?)
}

/// Parses one frame.
///
/// A frame that is not a JSON array is an error. A single malformed packet
/// inside an array is logged and skipped; unknown commands decode to
/// [`ServerPacket::Unknown`].
pub fn decode(text: &str) -> Result<Vec<ServerPacket>> {
	let values: Vec<Value> = serde_json::from_str(text)
		.map_err(|e| Error::Protocol(format!("frame is not a packet array: {e}")))?;

	let mut packets = Vec::with_capacity(values.len());
	for value in values {
		let cmd = value.get("cmd").and_then(Value::as_str).unwrap_or("<missing>").to_string();
		match serde_json::from_value::<ServerPacket>(value) {
			Ok(packet) => packets.push(packet),
			Err(e) => warn!(target = "ap.transport", %cmd, error = %e, "Dropping malformed packet"),
		}
	}
	Ok(packets)
}

/// One read from the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
	Packets(Vec<ServerPacket>),
	/// The peer closed the socket, with its reason if any.
	Closed(String),
}

/// Splits a WebSocket into its packet-level halves.
pub fn split<S>(stream: WebSocketStream<S>) -> (TransportSender<S>, TransportReceiver<S>)
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	let (sink, stream) = stream.split();
	(TransportSender { sink }, TransportReceiver { stream })
}

/// Write half of a WebSocket transport.
pub struct TransportSender<S> {
	sink: SplitSink<WebSocketStream<S>, Message>,
}

impl<S> TransportSender<S>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	/// Sends `packets` as one frame.
	pub async fn send(&mut self, packets: &[ClientPacket]) -> Result<()> {
		let text = encode(packets)?;
		self.sink
			.send(Message::Text(text))
			.await
			.map_err(|e| Error::Transport(format!("send failed: {e}")))
	}

	/// Sends a close frame. Errors are ignored; the socket is going away.
	pub async fn close(&mut self) {
		if let Err(e) = self.sink.close().await {
			debug!(target = "ap.transport", error = %e, "Close handshake failed");
		}
	}
}

/// Read half of a WebSocket transport.
pub struct TransportReceiver<S> {
	stream: SplitStream<WebSocketStream<S>>,
}

impl<S> TransportReceiver<S>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	/// Waits for the next frame carrying packets, or for the socket to close.
	pub async fn recv(&mut self) -> Result<Inbound> {
		loop {
			let message = match self.stream.next().await {
				Some(Ok(message)) => message,
				Some(Err(e)) => return Err(Error::Transport(format!("read failed: {e}"))),
				None => return Ok(Inbound::Closed("stream ended".to_string())),
			};

			match message {
				Message::Text(text) => return decode(&text).map(Inbound::Packets),
				Message::Binary(data) => {
					let text = String::from_utf8(data)
						.map_err(|e| Error::Protocol(format!("binary frame is not UTF-8: {e}")))?;
					return decode(&text).map(Inbound::Packets);
				}
				Message::Close(frame) => {
					let reason = frame
						.map(|f| f.reason.to_string())
						.filter(|r| !r.is_empty())
						.unwrap_or_else(|| "closed by server".to_string());
					return Ok(Inbound::Closed(reason));
				}
				Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
			}
		}
	}
}
