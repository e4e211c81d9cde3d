//! Session loop: connect, read, dispatch, write, ping.
//!
//! One task owns the transport, the outbound queue and the dispatcher, so no
//! locking is needed. Any transport failure other than rate limiting drops
//! the session back to `Disconnected`, after which the connection is retried
//! forever with exponential backoff.

use std::time::Duration;

use backon::BackoffBuilder;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use crate::bot::{CommandDispatcher, ReleaseSource};
use crate::common::error::{TransportError, TransportResult};
use crate::common::{InboundEvent, OutboundQueue};
use crate::config::types::SessionConfig;
use crate::slack::transport::{ChatTransport, Delivery};

/// Connection state of the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// Owns the chat session and drives the steady-state cycle.
pub struct Session<T, S> {
    transport: T,
    dispatcher: CommandDispatcher<S>,
    queue: OutboundQueue,
    config: SessionConfig,
    state: SessionState,
    last_ping: Option<Instant>,
}

impl<T: ChatTransport, S: ReleaseSource> Session<T, S> {
    pub fn new(transport: T, dispatcher: CommandDispatcher<S>, config: SessionConfig) -> Self {
        Self {
            transport,
            dispatcher,
            queue: OutboundQueue::new(),
            config,
            state: SessionState::Disconnected,
            last_ping: None,
        }
    }

    /// Run until the process is stopped.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// One iteration: reconnect if needed, tick, then idle.
    ///
    /// A rate-limited call pauses the session instead of dropping it.
    pub async fn step(&mut self) {
        if self.state == SessionState::Disconnected {
            self.reconnect().await;
        }

        match self.tick().await {
            Ok(()) => sleep(self.config.tick_interval()).await,
            Err(TransportError::RateLimited {
                method,
                retry_after_secs,
            }) => {
                warn!("Rate limited on {}, pausing for {}s", method, retry_after_secs);
                let pause = Duration::from_secs(retry_after_secs).max(self.config.tick_interval());
                sleep(pause).await;
            }
            Err(e) => {
                warn!("Session lost: {}", e);
                self.state = SessionState::Disconnected;
            }
        }
    }

    /// Retry the handshake until it succeeds.
    pub async fn reconnect(&mut self) {
        let mut backoff = self.backoff();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            info!("Connecting to chat transport (attempt {})...", attempt);

            match self.transport.connect().await {
                Ok(()) => {
                    info!("Connected");
                    self.state = SessionState::Connected;
                    self.last_ping = None;
                    return;
                }
                Err(e) => {
                    let delay = backoff.next().unwrap_or(self.config.reconnect_max_delay());
                    warn!(
                        "Connection failed: {}. Reconnecting in {:.1}s...",
                        e,
                        delay.as_secs_f64()
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    /// Read available events, handle messages, flush replies, probe liveness.
    pub async fn tick(&mut self) -> TransportResult<()> {
        let events = self.transport.read().await?;
        for event in &events {
            self.process_event(event).await;
        }

        self.flush().await?;
        self.ping().await
    }

    async fn process_event(&mut self, event: &InboundEvent) {
        if !event.is_message() || event.is_from_bot() {
            return;
        }
        let Some(text) = event.text.as_deref() else {
            return;
        };

        match self.dispatcher.handle_message(text, &mut self.queue).await {
            Ok(0) => {}
            Ok(queued) => debug!("Queued {} replies", queued),
            Err(e) => error!("Failed to process message {:?}: {}", text, e),
        }
    }

    /// Deliver every queued message.
    ///
    /// Messages the transport reports as undeliverable are dropped with a
    /// warning. On a transport error the failed message and everything after
    /// it go back to the front of the queue before the error is returned.
    pub async fn flush(&mut self) -> TransportResult<usize> {
        if self.queue.is_empty() {
            return Ok(0);
        }
        debug!("Flushing {} queued messages", self.queue.len());

        let mut pending = self.queue.drain().into_iter();
        let mut delivered = 0;
        let mut first = true;

        while let Some(message) = pending.next() {
            if !first {
                sleep(self.config.send_pause()).await;
            }
            first = false;

            match self.transport.send(&message).await {
                Ok(Delivery::Delivered) => delivered += 1,
                Ok(Delivery::ChannelUnresolved) => {
                    warn!(
                        "Dropping message {:?}: channel #{} could not be resolved",
                        message.text, message.channel
                    );
                }
                Ok(Delivery::Rejected(reason)) => {
                    warn!("Dropping message {:?}: rejected ({})", message.text, reason);
                }
                Err(e) => {
                    let mut undelivered = vec![message];
                    undelivered.extend(pending);
                    self.queue.requeue_front(undelivered);
                    return Err(e);
                }
            }
        }

        Ok(delivered)
    }

    /// Liveness probe, at most once per ping interval.
    async fn ping(&mut self) -> TransportResult<()> {
        let now = Instant::now();
        if let Some(last) = self.last_ping {
            if now.duration_since(last) < self.config.ping_interval() {
                return Ok(());
            }
        }
        self.last_ping = Some(now);

        if self.transport.ping().await? {
            Ok(())
        } else {
            Err(TransportError::PingFailed)
        }
    }

    /// Exponential backoff for reconnection, with jitter and no retry cap.
    fn backoff(&self) -> impl Iterator<Item = Duration> {
        backon::ExponentialBuilder::default()
            .with_min_delay(self.config.reconnect_min_delay())
            .with_max_delay(self.config.reconnect_max_delay())
            .with_factor(2.0)
            .with_jitter()
            .without_max_times()
            .build()
    }
}
