//! Subscription session.
//!
//! A session owns one connection and drives the control protocol over it:
//! send a request, wait for the acknowledgment tagged with the same method,
//! then read the data stream. There are no client-generated correlation ids
//! and no background reader. Every operation runs on the caller's task and
//! is bounded by its own deadline.

use crate::{SessionConfig, SessionError, Transport, WsTransport};
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::time::Duration;
use streamprobe_core::{ControlAck, ControlRequest, DataMessage, Inbound, Method, Options};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Exclusive owner of one streaming connection.
pub struct SubscriptionSession {
    config: SessionConfig,
    transport: Option<Box<dyn Transport>>,
}

impl SubscriptionSession {
    /// Create a closed session.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Create a session that is already open over `transport`.
    pub fn with_transport(config: SessionConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Some(Box::new(transport)),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Connect to the configured endpoint.
    ///
    /// An already open connection is replaced and dropped without a close
    /// handshake.
    pub async fn open(&mut self) -> Result<(), SessionError> {
        if self.transport.is_some() {
            warn!("open() on an open session, dropping previous connection");
        }

        let connect_timeout = self.config.connect_timeout();
        let transport = tokio::time::timeout(connect_timeout, WsTransport::connect(&self.config.ws_url))
            .await
            .map_err(|_| {
                SessionError::Connection(format!(
                    "connect to {} timed out after {:?}",
                    self.config.ws_url, connect_timeout
                ))
            })??;

        info!("Session opened: {}", self.config.ws_url);
        self.transport = Some(Box::new(transport));
        Ok(())
    }

    /// Release the connection. No-op when not open.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                debug!("Error while closing connection: {}", e);
            }
            info!("Session closed");
        }
    }

    /// Open a session, run `f` on it and close it on every exit path.
    pub async fn scoped<T, F>(config: SessionConfig, f: F) -> Result<T, SessionError>
    where
        F: for<'a> FnOnce(&'a mut SubscriptionSession) -> BoxFuture<'a, Result<T, SessionError>>,
    {
        let mut session = Self::new(config);
        session.open().await?;
        let result = f(&mut session).await;
        session.close().await;
        result
    }

    fn transport(&mut self) -> Result<&mut Box<dyn Transport>, SessionError> {
        self.transport.as_mut().ok_or(SessionError::NotOpen)
    }

    /// Send an arbitrary JSON message.
    pub async fn send_raw(&mut self, message: &Value) -> Result<(), SessionError> {
        let text = message.to_string();
        debug!("Sending: {}", text);
        self.transport()?.send_text(text).await
    }

    pub async fn send_request(&mut self, request: &ControlRequest) -> Result<(), SessionError> {
        self.send_raw(&request.to_value()).await
    }

    /// Wait for the next acknowledgment tagged `method`, skipping everything
    /// else. The acknowledgment is returned whatever its `success` flag.
    pub async fn wait_for_method(
        &mut self,
        method: Method,
        timeout: Duration,
    ) -> Result<ControlAck, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.next_inbound_until(deadline, timeout).await? {
                Inbound::Ack(ack) if method.matches(&ack.method) => return Ok(ack),
                other => debug!(
                    "Skipping {:?} while awaiting {} acknowledgment",
                    other.channel().or(other.method()),
                    method
                ),
            }
        }
    }

    /// Subscribe and return the acknowledgment even when it is a rejection.
    pub async fn try_subscribe<S: AsRef<str>>(
        &mut self,
        channel: impl AsRef<str>,
        symbols: &[S],
        options: Options,
    ) -> Result<ControlAck, SessionError> {
        self.control(Method::Subscribe, channel.as_ref(), symbols, options).await
    }

    /// Unsubscribe and return the acknowledgment even when it is a rejection.
    pub async fn try_unsubscribe<S: AsRef<str>>(
        &mut self,
        channel: impl AsRef<str>,
        symbols: &[S],
        options: Options,
    ) -> Result<ControlAck, SessionError> {
        self.control(Method::Unsubscribe, channel.as_ref(), symbols, options).await
    }

    /// Subscribe to `channel` for `symbols`.
    ///
    /// Fails with `SubscriptionRejected` carrying the remote error text when
    /// the acknowledgment reports `success: false`, and with `Timeout` when no
    /// `subscribe` acknowledgment arrives within the configured timeout.
    pub async fn subscribe<S: AsRef<str>>(
        &mut self,
        channel: impl AsRef<str>,
        symbols: &[S],
        options: Options,
    ) -> Result<ControlAck, SessionError> {
        let ack = self.try_subscribe(channel, symbols, options).await?;
        Self::accepted(ack)
    }

    /// Unsubscribe from `channel` for `symbols`. Same contract as [`subscribe`](Self::subscribe).
    pub async fn unsubscribe<S: AsRef<str>>(
        &mut self,
        channel: impl AsRef<str>,
        symbols: &[S],
        options: Options,
    ) -> Result<ControlAck, SessionError> {
        let ack = self.try_unsubscribe(channel, symbols, options).await?;
        Self::accepted(ack)
    }

    async fn control<S: AsRef<str>>(
        &mut self,
        method: Method,
        channel: &str,
        symbols: &[S],
        options: Options,
    ) -> Result<ControlAck, SessionError> {
        let request = ControlRequest::new(method, channel, symbols, options);
        self.send_request(&request).await?;

        let ack = self.wait_for_method(method, self.config.timeout()).await?;
        if ack.success {
            info!("{} {} {:?}: ok", method, channel, request.symbols);
        } else {
            warn!("{} {} {:?}: {}", method, channel, request.symbols, ack.error_text());
        }
        Ok(ack)
    }

    fn accepted(ack: ControlAck) -> Result<ControlAck, SessionError> {
        if ack.success {
            Ok(ack)
        } else {
            Err(SessionError::SubscriptionRejected {
                error: ack.error_text().to_string(),
                method: ack.method,
            })
        }
    }

    /// Next inbound message of any kind.
    pub async fn receive_one(&mut self, timeout: Duration) -> Result<Inbound, SessionError> {
        self.next_inbound_until(Instant::now() + timeout, timeout).await
    }

    /// Collect `count` data messages under one aggregate deadline, skipping
    /// heartbeats, status messages and acknowledgments.
    ///
    /// Once at least one data message has been collected, a deadline or a
    /// connection or decoding error ends collection and the partial result is
    /// returned. With nothing collected the error is returned.
    pub async fn receive_data(
        &mut self,
        count: usize,
        timeout: Duration,
    ) -> Result<Vec<DataMessage>, SessionError> {
        let deadline = Instant::now() + timeout;
        let mut collected = Vec::with_capacity(count);
        let mut skipped = 0usize;

        while collected.len() < count {
            match self.next_inbound_until(deadline, timeout).await {
                Ok(Inbound::Data(msg)) => collected.push(msg),
                Ok(_) => skipped += 1,
                Err(e) if collected.is_empty() => return Err(e),
                Err(e) => {
                    warn!(
                        "Returning {} of {} data messages: {}",
                        collected.len(),
                        count,
                        e
                    );
                    break;
                }
            }
        }

        debug!(
            "Collected {} data messages ({} control messages skipped)",
            collected.len(),
            skipped
        );
        Ok(collected)
    }

    /// Watch the stream for `window` and return every data message on
    /// `channel` that arrived. An empty result means the channel was silent.
    ///
    /// Each receive waits at most `poll`. Receive timeouts are expected and
    /// ignored; any other error is returned.
    pub async fn watch_silence(
        &mut self,
        channel: &str,
        window: Duration,
        poll: Duration,
    ) -> Result<Vec<DataMessage>, SessionError> {
        let end = Instant::now() + window;
        let mut leaked = Vec::new();

        loop {
            let now = Instant::now();
            if now >= end {
                break;
            }
            let wait = poll.min(end - now);
            match self.receive_one(wait).await {
                Ok(Inbound::Data(msg)) if msg.channel == channel => {
                    warn!("Received {} data after unsubscribe", channel);
                    leaked.push(msg);
                }
                Ok(_) | Err(SessionError::Timeout(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if leaked.is_empty() {
            debug!("No {} data for {:?}", channel, window);
        }
        Ok(leaked)
    }

    async fn next_inbound_until(
        &mut self,
        deadline: Instant,
        budget: Duration,
    ) -> Result<Inbound, SessionError> {
        // An elapsed deadline still polls the transport once, so queued
        // frames are delivered even with a zero budget.
        let transport = self.transport()?;
        let text = tokio::time::timeout_at(deadline, transport.next_text())
            .await
            .map_err(|_| SessionError::Timeout(budget))??;

        Ok(Inbound::parse(&text)?)
    }
}
