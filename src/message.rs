//! Diagnostic output channel.
//!
//! Human-readable diagnostics (cube listings, per-pass summaries) go through
//! a [`MessageHandler`] handed to the abstractor, so callers decide where they
//! end up. [`LogHandler`] forwards to the `log` facade; [`BufferHandler`]
//! keeps a transcript.

use std::cell::RefCell;
use std::rc::Rc;

use log::Level;

pub trait MessageHandler {
    fn message(&self, level: Level, text: &str);
}

/// Forwards every message to the `log` facade.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogHandler;

impl MessageHandler for LogHandler {
    fn message(&self, level: Level, text: &str) {
        log::log!(level, "{}", text);
    }
}

/// Records messages in memory.
///
/// Clones share the same transcript, so a clone can be handed to the
/// abstractor while the first handle is kept for inspection.
#[derive(Debug, Default, Clone)]
pub struct BufferHandler {
    messages: Rc<RefCell<Vec<(Level, String)>>>,
}

impl BufferHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages.borrow().clone()
    }

    /// Message texts, levels dropped.
    pub fn texts(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl MessageHandler for BufferHandler {
    fn message(&self, level: Level, text: &str) {
        self.messages.borrow_mut().push((level, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_buffer_handler_shares_transcript() {
        let buffer = BufferHandler::new();
        let handler: Box<dyn MessageHandler> = Box::new(buffer.clone());
        handler.message(Level::Info, "first");
        handler.message(Level::Debug, "second");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.texts(), vec!["first", "second"]);
        assert_eq!(buffer.messages()[1].0, Level::Debug);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_log_handler() {
        LogHandler.message(Level::Info, "forwarded to the logger");
    }
}
