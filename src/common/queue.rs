//! Pending outbound message queue.

use std::collections::VecDeque;

use crate::common::messages::OutboundMessage;

/// FIFO of replies waiting to be flushed to the transport.
///
/// Flushing takes the whole queue at once; messages that could not be
/// attempted are handed back with [`OutboundQueue::requeue_front`].
#[derive(Debug, Default)]
pub struct OutboundQueue {
    pending: VecDeque<OutboundMessage>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the back of the queue.
    pub fn push(&mut self, message: OutboundMessage) {
        self.pending.push_back(message);
    }

    /// Remove and return every pending message, oldest first.
    pub fn drain(&mut self) -> Vec<OutboundMessage> {
        self.pending.drain(..).collect()
    }

    /// Put undelivered messages back ahead of anything queued since the drain.
    pub fn requeue_front(&mut self, messages: Vec<OutboundMessage>) {
        for message in messages.into_iter().rev() {
            self.pending.push_front(message);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::Reply;

    fn msg(text: &str) -> OutboundMessage {
        OutboundMessage::new("thrones", Reply::text(text))
    }

    #[test]
    fn test_drain_empties_queue_in_order() {
        let mut queue = OutboundQueue::new();
        queue.push(msg("a"));
        queue.push(msg("b"));

        let drained = queue.drain();
        assert!(queue.is_empty());
        assert_eq!(drained, vec![msg("a"), msg("b")]);
    }

    #[test]
    fn test_requeue_front_keeps_original_order() {
        let mut queue = OutboundQueue::new();
        queue.push(msg("a"));
        queue.push(msg("b"));
        let drained = queue.drain();

        queue.push(msg("c"));
        queue.requeue_front(drained);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain(), vec![msg("a"), msg("b"), msg("c")]);
    }
}
