use bytes::{Bytes, BytesMut};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::domain::model::ByteStream;
use crate::utils::error::Result;

/// Chunk size used by all streaming operations.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

struct RechunkState {
    inner: BoxStream<'static, Result<Bytes>>,
    buffer: BytesMut,
    done: bool,
}

/// Folds an arbitrary byte stream into fixed-size chunks. Only the final
/// chunk may be shorter. After the first error nothing further is yielded,
/// including data already buffered.
pub fn rechunk<S>(stream: S, chunk_size: usize) -> ByteStream
where
    S: Stream<Item = Result<Bytes>> + Send + 'static,
{
    let chunk_size = chunk_size.max(1);
    let state = RechunkState {
        inner: stream.boxed(),
        buffer: BytesMut::new(),
        done: false,
    };

    Box::pin(futures::stream::unfold(state, move |mut state| async move {
        loop {
            if state.buffer.len() >= chunk_size {
                let chunk = state.buffer.split_to(chunk_size).freeze();
                return Some((Ok(chunk), state));
            }
            if state.done {
                if state.buffer.is_empty() {
                    return None;
                }
                let chunk = state.buffer.split().freeze();
                return Some((Ok(chunk), state));
            }
            match state.inner.next().await {
                Some(Ok(bytes)) => state.buffer.extend_from_slice(&bytes),
                Some(Err(err)) => {
                    state.buffer.clear();
                    state.done = true;
                    return Some((Err(err), state));
                }
                None => state.done = true,
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::StorageError;

    fn ok_chunks(chunks: Vec<&'static [u8]>) -> impl Stream<Item = Result<Bytes>> {
        futures::stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from_static(c))))
    }

    #[tokio::test]
    async fn test_rechunk_exact_and_tail() {
        let stream = ok_chunks(vec![b"abc", b"defg", b"hi"]);
        let chunks: Vec<_> = rechunk(stream, 4).collect().await;

        let collected: Vec<Vec<u8>> = chunks
            .into_iter()
            .map(|c| c.unwrap().to_vec())
            .collect();
        assert_eq!(collected, vec![b"abcd".to_vec(), b"efgh".to_vec(), b"i".to_vec()]);
    }

    #[tokio::test]
    async fn test_rechunk_empty_stream() {
        let stream = ok_chunks(vec![]);
        let chunks: Vec<_> = rechunk(stream, 4).collect().await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_rechunk_single_short_chunk() {
        let stream = ok_chunks(vec![b"xy"]);
        let chunks: Vec<_> = rechunk(stream, DEFAULT_CHUNK_SIZE).collect().await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().as_ref(), b"xy");
    }

    #[tokio::test]
    async fn test_rechunk_stops_after_error() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Err(StorageError::OperationFailed {
                status_code: 500,
                message: "broken".to_string(),
            }),
            Ok(Bytes::from_static(b"never")),
        ]);

        let chunks: Vec<_> = rechunk(stream, 8).collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(matches!(
            chunks[0],
            Err(StorageError::OperationFailed { status_code: 500, .. })
        ));
    }
}
