use super::client::ApiClient;
use super::stream::StreamParser;
use crate::types::SseEvent;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum GenerationUpdate {
    Event(SseEvent),
    /// The response body ended without a transport error.
    Finished,
    /// The request could not start, or the stream broke mid-way.
    Failed(String),
}

/// Owner of one in-flight `POST /generate` stream.
pub struct GenerationHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl GenerationHandle {
    /// Stop dispatching. Nothing, not even `Failed`, is reported afterwards.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stream task. False if it panicked.
    pub async fn join(self) -> bool {
        match self.task.await {
            Ok(()) => true,
            Err(error) => {
                tracing::error!(%error, "generation task did not complete");
                false
            }
        }
    }
}

/// Spawn the streaming request and feed every update to `on_update` in stream
/// order.
pub fn start_generation<F>(
    client: ApiClient,
    topic: String,
    as_of: String,
    mut on_update: F,
) -> GenerationHandle
where
    F: FnMut(GenerationUpdate) + Send + 'static,
{
    let token = CancellationToken::new();
    let task_token = token.clone();

    let task = tokio::spawn(async move {
        let opened = tokio::select! {
            biased;
            _ = task_token.cancelled() => return,
            opened = client.open_generation_stream(&topic, &as_of) => opened,
        };

        let mut stream = match opened {
            Ok(stream) => stream,
            Err(error) => {
                tracing::warn!(%error, "generation request failed");
                on_update(GenerationUpdate::Failed(error.to_string()));
                return;
            }
        };

        let mut parser = StreamParser::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    tracing::debug!("generation cancelled");
                    return;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for event in parser.process(&chunk) {
                        if task_token.is_cancelled() {
                            return;
                        }
                        on_update(GenerationUpdate::Event(event));
                    }
                }
                Some(Err(error)) => {
                    if task_token.is_cancelled() {
                        return;
                    }
                    tracing::warn!(%error, "generation stream broke");
                    on_update(GenerationUpdate::Failed(error.to_string()));
                    return;
                }
                None => break,
            }
        }

        if task_token.is_cancelled() {
            return;
        }
        if let Some(event) = parser.finish() {
            on_update(GenerationUpdate::Event(event));
        }
        on_update(GenerationUpdate::Finished);
    });

    GenerationHandle { token, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_client::{framed, MockApiClient};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn collect_into(
        tx: mpsc::UnboundedSender<GenerationUpdate>,
    ) -> impl FnMut(GenerationUpdate) + Send + 'static {
        move |update| {
            let _ = tx.send(update);
        }
    }

    #[tokio::test]
    async fn dispatches_events_then_finished() {
        let mock = MockApiClient::new(vec![framed(&[
            r#"data: {"type":"progress","node":"router","data":{"mode":"open_book"}}"#,
            r#"data: {"type":"error","message":"quota"}"#,
        ])]);
        let client = ApiClient::new_mock(Arc::new(mock));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = start_generation(client, "t".into(), "2025-01-01".into(), collect_into(tx));
        handle.join().await;

        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        assert_eq!(updates.len(), 3);
        assert!(matches!(
            &updates[0],
            GenerationUpdate::Event(SseEvent::Progress { node, .. }) if node == "router"
        ));
        assert!(matches!(
            &updates[1],
            GenerationUpdate::Event(SseEvent::Error { message }) if message == "quota"
        ));
        assert!(matches!(updates[2], GenerationUpdate::Finished));
    }

    #[tokio::test]
    async fn start_failure_reports_failed() {
        let client = ApiClient::new_mock(Arc::new(MockApiClient::new(vec![])));
        let (tx, mut rx) = mpsc::unbounded_channel();

        start_generation(client, "t".into(), "2025-01-01".into(), collect_into(tx))
            .join()
            .await;

        match rx.recv().await {
            Some(GenerationUpdate::Failed(message)) => {
                assert!(message.starts_with("Failed to start generation"));
            }
            other => panic!("unexpected update: {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancel_stops_dispatch_without_error() {
        let mock = MockApiClient::new(vec![framed(&[
            r#"data: {"type":"progress","node":"router","data":{}}"#,
        ])])
        .holding_open();
        let client = ApiClient::new_mock(Arc::new(mock));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let handle = start_generation(client, "t".into(), "2025-01-01".into(), collect_into(tx));
        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("first update");
        assert!(matches!(first, Some(GenerationUpdate::Event(_))));

        handle.cancel();
        assert!(handle.is_cancelled());
        handle.join().await;

        assert!(rx.recv().await.is_none(), "no updates after cancel");
    }

    #[tokio::test]
    async fn join_reports_a_panicked_task() {
        let handle = GenerationHandle {
            token: CancellationToken::new(),
            task: tokio::spawn(async { panic!("stream task blew up") }),
        };
        assert!(!handle.join().await);

        let handle = GenerationHandle {
            token: CancellationToken::new(),
            task: tokio::spawn(async {}),
        };
        assert!(handle.join().await);
    }
}
