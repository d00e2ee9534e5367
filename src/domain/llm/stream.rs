use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use super::{StreamEvent, StreamUnit};
use crate::domain::DomainError;

/// Decoded provider units, before sequencing
pub type UnitStream = Pin<Box<dyn Stream<Item = Result<StreamUnit, DomainError>> + Send>>;

/// Live, cancellable sequence of stream events consumed by a single reader.
///
/// Ends after the terminal chunk or the terminal error. After `cancel` the
/// stream yields nothing more, even if events were already buffered.
#[derive(Debug)]
pub struct ChunkStream {
    rx: mpsc::Receiver<StreamEvent>,
    cancelled: bool,
    finished: bool,
}

impl ChunkStream {
    pub fn new(rx: mpsc::Receiver<StreamEvent>) -> Self {
        Self {
            rx,
            cancelled: false,
            finished: false,
        }
    }

    /// Stop the stream; the producer observes the closed channel and releases its resources
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.rx.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Stream for ChunkStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancelled || self.finished {
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                    self.rx.close();
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
