//! Provider stream decoding and the relay task feeding a ChunkStream

use eventsource_stream::Eventsource;
use futures::{stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::http_client::ByteStream;
use super::registry::ProviderConfig;
use crate::domain::{
    ChunkStream, DomainError, StreamChunk, StreamEvent, StreamUnit, UnitStream,
};

/// Decode a provider's server-sent events into stream units.
///
/// Frames split across network reads are reassembled before decoding. For
/// providers without an end marker the end of the body yields `Done`.
pub fn decode_units(config: ProviderConfig, bytes: ByteStream) -> UnitStream {
    let ends_at_eof = config.ends_at_eof();
    let units = bytes.eventsource().map(move |event| match event {
        Ok(event) if event.data.trim().is_empty() => Ok(StreamUnit::Skip),
        Ok(event) => config.parse_stream_data(&event.data),
        Err(e) => Err(DomainError::upstream(None, format!("Stream decode failed: {}", e))),
    });

    if ends_at_eof {
        Box::pin(units.chain(stream::once(async { Ok(StreamUnit::Done) })))
    } else {
        Box::pin(units)
    }
}

/// Start relaying `units` into a bounded channel and return its reading end.
///
/// A full channel pauses provider reads. Closing or dropping the returned
/// stream stops the relay, which drops `units` and with it the provider connection.
pub fn spawn_relay(units: UnitStream, buffer: usize) -> ChunkStream {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    tokio::spawn(relay(units, tx));
    ChunkStream::new(rx)
}

async fn relay(mut units: UnitStream, tx: mpsc::Sender<StreamEvent>) {
    let mut seq: u64 = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => {
                debug!(seq, "Stream receiver closed, releasing provider stream");
                return;
            }
            next = units.next() => next,
        };

        match next {
            Some(Ok(StreamUnit::Delta(text))) => {
                if text.is_empty() {
                    continue;
                }

                if tx
                    .send(StreamEvent::Chunk(StreamChunk::delta(seq, text)))
                    .await
                    .is_err()
                {
                    debug!(seq, "Stream receiver closed, releasing provider stream");
                    return;
                }
                seq += 1;
            }
            Some(Ok(StreamUnit::Skip)) => continue,
            Some(Ok(StreamUnit::Done)) => {
                debug!(seq, "Provider stream completed");
                let _ = tx
                    .send(StreamEvent::Chunk(StreamChunk::terminal(seq)))
                    .await;
                return;
            }
            None => {
                warn!(seq, "Provider stream closed without an end marker");
                let error = DomainError::upstream(None, "provider stream ended before completion");
                let _ = tx.send(StreamEvent::Error((&error).into())).await;
                return;
            }
            Some(Err(e)) => {
                warn!(seq, error = %e, "Provider stream failed");
                let _ = tx.send(StreamEvent::Error((&e).into())).await;
                return;
            }
        }
    }
}
