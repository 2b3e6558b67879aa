//! Streaming transport for sequential activation.
//!
//! The endpoint takes a POST body, so the event stream is opened as a plain
//! request and the body is read chunk by chunk. Consumers pull typed events
//! with [`ActivationStream::next_event`]; dropping or closing the stream is the
//! whole of cancellation.

use std::collections::VecDeque;

use anyhow::anyhow;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use pikreg_api_models::{SequentialActivateRequest, paths};
use pikreg_events::{ActivationEvent, FrameDecoder};
use tracing::{debug, warn};

use crate::client::{AppContext, CliError, CliResult, classify_problem};

type ChunkStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

/// Open activation event stream.
pub(crate) struct ActivationStream {
    chunks: Option<ChunkStream>,
    decoder: FrameDecoder,
    ready: VecDeque<ActivationEvent>,
}

impl ActivationStream {
    /// Submit the batch and return the stream of its progress events.
    pub(crate) async fn open(
        ctx: &AppContext,
        request: &SequentialActivateRequest,
    ) -> CliResult<Self> {
        let url = ctx.endpoint(paths::ACTIVATE_SEQUENTIAL)?;
        debug!(
            accounts = request.names.len(),
            all = request.all,
            "opening activation stream"
        );
        let response = ctx
            .authorize(ctx.stream_client.post(url))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to open activation stream: {err}")))?;

        if !response.status().is_success() {
            return Err(classify_problem(response).await);
        }

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(Self::from_chunks(chunks))
    }

    pub(crate) fn from_chunks(chunks: ChunkStream) -> Self {
        Self {
            chunks: Some(chunks),
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
        }
    }

    /// Next decoded event, or `None` once the body ends or the stream is closed.
    ///
    /// Frames that fail to decode are logged and skipped. A transport failure
    /// while reading is returned as an error and closes the stream.
    pub(crate) async fn next_event(&mut self) -> CliResult<Option<ActivationEvent>> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Ok(Some(event));
            }
            let Some(chunks) = self.chunks.as_mut() else {
                return Ok(None);
            };
            match chunks.next().await {
                Some(Ok(chunk)) => {
                    for frame in self.decoder.push(&chunk) {
                        match frame {
                            Ok(event) => self.ready.push_back(event),
                            Err(err) => warn!(
                                error = %err,
                                payload = %err.payload_preview(),
                                "discarding malformed activation frame"
                            ),
                        }
                    }
                }
                Some(Err(err)) => {
                    self.close();
                    return Err(CliError::failure(anyhow!(
                        "activation stream interrupted: {err}"
                    )));
                }
                None => {
                    self.close();
                    return Ok(None);
                }
            }
        }
    }

    /// Stop reading; events not yet returned are dropped.
    pub(crate) fn close(&mut self) {
        if self.chunks.take().is_some() {
            let dropped = self.decoder.finish();
            if dropped > 0 {
                debug!(bytes = dropped, "dropped unterminated frame fragment");
            }
        }
        self.ready.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::context_with;
    use futures_util::stream;
    use httpmock::prelude::*;
    use pikreg_test_support::sse::{sse_body, successful_run};
    use serde_json::json;

    fn split_stream(body: &str, size: usize) -> ActivationStream {
        let chunks: Vec<reqwest::Result<Vec<u8>>> = body
            .as_bytes()
            .chunks(size)
            .map(|chunk| Ok(chunk.to_vec()))
            .collect();
        ActivationStream::from_chunks(stream::iter(chunks).boxed())
    }

    async fn drain(stream: &mut ActivationStream) -> Vec<ActivationEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await.expect("event") {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn events_split_across_chunks_arrive_once_in_order() {
        let body = sse_body(&successful_run(&["alpha", "beta"]));
        let mut stream = split_stream(&body, 5);
        let kinds: Vec<&str> = drain(&mut stream)
            .await
            .iter()
            .map(ActivationEvent::kind)
            .collect();
        assert_eq!(
            kinds,
            [
                "init",
                "start",
                "processing",
                "result",
                "delay",
                "processing",
                "result",
                "complete"
            ]
        );
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let body = "data: {\"status\":\"init\"}\n\ndata: {broken\n\ndata: {\"status\":\"complete\",\"message\":\"done\"}\n\n";
        let mut stream = split_stream(body, 64);
        let events = drain(&mut stream).await;
        assert_eq!(events.len(), 2);
        assert!(events[1].is_terminal());
    }

    #[tokio::test]
    async fn closed_stream_yields_nothing_more() {
        let body = sse_body(&successful_run(&["alpha"]));
        let mut stream = split_stream(&body, 4096);
        let first = stream.next_event().await.expect("event");
        assert!(matches!(first, Some(ActivationEvent::Init { .. })));
        stream.close();
        assert!(stream.next_event().await.expect("closed").is_none());
    }

    #[tokio::test]
    async fn open_posts_the_selection_and_reads_the_body() {
        let server = MockServer::start_async().await;
        let body = sse_body(&successful_run(&["alpha"]));
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(paths::ACTIVATE_SEQUENTIAL)
                .header("X-Session-ID", "abc123")
                .json_body(json!({
                    "key": "K-1",
                    "names": ["alpha"],
                    "all": false,
                    "delay_min": 10,
                    "delay_max": 30
                }));
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(body);
        });

        let request = SequentialActivateRequest {
            key: "K-1".into(),
            names: vec!["alpha".into()],
            all: false,
            delay_min: 10,
            delay_max: 30,
        };
        let mut stream = ActivationStream::open(&context_with(&server), &request)
            .await
            .expect("stream");
        let events = drain(&mut stream).await;
        mock.assert();
        assert_eq!(events.len(), 5);
        assert!(events.last().is_some_and(ActivationEvent::is_terminal));
    }

    #[tokio::test]
    async fn rejected_open_is_classified() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(paths::ACTIVATE_SEQUENTIAL);
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"status": "error", "message": "no accounts selected"}));
        });
        let request = SequentialActivateRequest {
            key: "K-1".into(),
            names: Vec::new(),
            all: false,
            delay_min: 1,
            delay_max: 2,
        };
        let err = ActivationStream::open(&context_with(&server), &request)
            .await
            .err()
            .expect("rejected");
        assert_eq!(err.exit_code(), 2);
    }
}
