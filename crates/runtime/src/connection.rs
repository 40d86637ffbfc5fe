//! DevTools connection layer.
//!
//! Implements request/response correlation on top of a target's WebSocket:
//! - Generating unique request IDs
//! - Correlating responses with pending requests
//! - Distinguishing events from responses
//!
//! # Message Flow
//!
//! 1. Caller invokes [`Connection::send`] with a method and params
//! 2. Connection allocates an ID and parks a oneshot sender under it
//! 3. The request is serialized and written to the socket
//! 4. The reader task receives the response and completes the oneshot
//! 5. Caller receives the result (or times out after [`DEFAULT_TIMEOUT`])

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, StreamExt};
use futures_util::SinkExt;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use slotwatch_protocol::{ErrorPayload, Message, Request};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::engine::DEFAULT_TIMEOUT;
use crate::error::{Error, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Callbacks = Arc<Mutex<HashMap<u64, tokio::sync::oneshot::Sender<Result<Value>>>>>;

/// Connection to a single DevTools target.
pub struct Connection {
	last_id: AtomicU64,
	callbacks: Callbacks,
	sink: tokio::sync::Mutex<SplitSink<WsStream, WsMessage>>,
	reader: JoinHandle<()>,
	timeout: Duration,
}

impl Connection {
	/// Opens the WebSocket at `ws_url` and starts the reader task.
	pub async fn connect(ws_url: &str) -> Result<Self> {
		let (stream, _) = tokio_tungstenite::connect_async(ws_url).await?;
		let (sink, stream) = stream.split();
		let callbacks: Callbacks = Arc::new(Mutex::new(HashMap::new()));

		let reader = tokio::spawn(read_loop(stream, Arc::clone(&callbacks)));
		debug!(target = "slotwatch.cdp", %ws_url, "connected to target");

		Ok(Self {
			last_id: AtomicU64::new(1),
			callbacks,
			sink: tokio::sync::Mutex::new(sink),
			reader,
			timeout: DEFAULT_TIMEOUT,
		})
	}

	/// Overrides the per-call response timeout.
	pub fn set_timeout(&mut self, timeout: Duration) {
		self.timeout = timeout;
	}

	/// Sends `method` and awaits its raw result.
	pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = tokio::sync::oneshot::channel();
		self.callbacks.lock().insert(id, tx);

		let request = Request {
			id,
			method: method.to_string(),
			params,
		};
		let frame = serde_json::to_string(&request)?;
		trace!(target = "slotwatch.cdp", id, %method, "send");

		if let Err(e) = self.sink.lock().await.send(WsMessage::Text(frame.into())).await {
			self.callbacks.lock().remove(&id);
			return Err(e.into());
		}

		match tokio::time::timeout(self.timeout, rx).await {
			Ok(Ok(result)) => result,
			Ok(Err(_)) => Err(Error::ChannelClosed),
			Err(_) => {
				self.callbacks.lock().remove(&id);
				Err(Error::Timeout {
					ms: self.timeout.as_millis() as u64,
					condition: format!("response to {method}"),
				})
			}
		}
	}

	/// Typed variant of [`send`](Self::send).
	pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
	where
		P: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		let params = serde_json::to_value(params)?;
		let result = self.send(method, params).await?;
		Ok(serde_json::from_value(result)?)
	}

	/// Closes the socket and stops the reader task.
	pub async fn close(&self) {
		if let Err(e) = self.sink.lock().await.close().await {
			debug!(target = "slotwatch.cdp", error = %e, "socket close failed");
		}
		self.reader.abort();
		fail_pending(&self.callbacks);
	}

	#[cfg(test)]
	fn pending(&self) -> usize {
		self.callbacks.lock().len()
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		self.reader.abort();
	}
}

async fn read_loop(mut stream: futures_util::stream::SplitStream<WsStream>, callbacks: Callbacks) {
	while let Some(frame) = stream.next().await {
		let text = match frame {
			Ok(WsMessage::Text(text)) => text,
			Ok(WsMessage::Close(_)) => break,
			Ok(_) => continue,
			Err(e) => {
				warn!(target = "slotwatch.cdp", error = %e, "socket read failed");
				break;
			}
		};

		match serde_json::from_str::<Message>(&text) {
			Ok(message) => {
				if let Err(e) = dispatch(&callbacks, message) {
					debug!(target = "slotwatch.cdp", error = %e, "dropping frame");
				}
			}
			Err(e) => warn!(target = "slotwatch.cdp", error = %e, "unparseable frame"),
		}
	}

	debug!(target = "slotwatch.cdp", "reader loop ended (socket closed)");
	fail_pending(&callbacks);
}

/// Routes one inbound frame: responses complete their pending request, events are logged.
fn dispatch(callbacks: &Callbacks, message: Message) -> Result<()> {
	match message {
		Message::Response(response) => {
			let callback = callbacks.lock().remove(&response.id).ok_or_else(|| Error::Protocol {
				code: 0,
				message: format!("Cannot find request to respond: id={}", response.id),
			})?;

			let result = match response.error {
				Some(error) => Err(parse_protocol_error(error)),
				None => Ok(response.result.unwrap_or(Value::Null)),
			};

			let _ = callback.send(result);
			Ok(())
		}
		Message::Event(event) => {
			trace!(target = "slotwatch.cdp", method = %event.method, "event");
			Ok(())
		}
	}
}

fn fail_pending(callbacks: &Callbacks) {
	for (_, callback) in callbacks.lock().drain() {
		let _ = callback.send(Err(Error::ChannelClosed));
	}
}

fn parse_protocol_error(error: ErrorPayload) -> Error {
	if error.message.contains("Target closed") || error.message.contains("Session closed") {
		return Error::TargetClosed(error.message);
	}
	Error::Protocol {
		code: error.code,
		message: match error.data {
			Some(data) => format!("{} ({})", error.message, data),
			None => error.message,
		},
	}
}
