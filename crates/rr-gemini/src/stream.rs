//! Chat stream surface

use futures::Stream;
use tokio::sync::mpsc;

use crate::types::ChatEvent;

/// A stream of chat events
///
/// Yields `Ok(ChatEvent::Delta)` per content chunk, then exactly one
/// `Ok(ChatEvent::Done)` at normal completion; on failure the stream yields
/// exactly one `Err` and ends. Never both.
pub struct ChatStream {
    rx: mpsc::Receiver<Result<ChatEvent, String>>,
}

impl ChatStream {
    pub(crate) fn new(rx: mpsc::Receiver<Result<ChatEvent, String>>) -> Self {
        Self { rx }
    }

    /// A stream that immediately fails with the given message
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 guarantees this send succeeds
        let _ = tx.try_send(Err(message.into()));
        Self { rx }
    }

    /// Build a stream from pre-recorded items (test support)
    #[must_use]
    pub fn from_items(items: Vec<Result<ChatEvent, String>>) -> Self {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            let _ = tx.try_send(item);
        }
        Self { rx }
    }
}

impl Stream for ChatStream {
    type Item = Result<ChatEvent, String>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Collect a stream into its full text, or the first error
pub async fn collect_text(mut stream: ChatStream) -> Result<String, String> {
    use futures::StreamExt;

    let mut text = String::new();
    while let Some(event) = stream.next().await {
        match event? {
            ChatEvent::Delta { text: delta, .. } => text.push_str(&delta),
            ChatEvent::Done => break,
        }
    }
    Ok(text)
}
