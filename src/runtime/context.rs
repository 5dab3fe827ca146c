use super::UiUpdate;
use crate::api::{start_generation, ApiClient, GenerationHandle};
use crate::types::DownloadKind;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Handles a mode uses to start background work. Results come back as
/// `UiUpdate`s through the runtime's channel.
pub struct RuntimeContext {
    client: ApiClient,
    update_tx: mpsc::UnboundedSender<UiUpdate>,
    active_generation: Option<(u64, GenerationHandle)>,
    next_generation_id: u64,
    download_dir: PathBuf,
}

impl RuntimeContext {
    pub fn new(
        client: ApiClient,
        update_tx: mpsc::UnboundedSender<UiUpdate>,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            client,
            update_tx,
            active_generation: None,
            next_generation_id: 0,
            download_dir,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Start streaming a new generation, cancelling any previous one.
    /// Returns the id its updates will carry.
    pub fn start_generation(&mut self, topic: String, as_of: String) -> u64 {
        self.cancel_generation();
        self.next_generation_id += 1;
        let id = self.next_generation_id;

        let update_tx = self.update_tx.clone();
        let handle = start_generation(self.client.clone(), topic, as_of, move |update| {
            let _ = update_tx.send(UiUpdate::Generation { id, update });
        });
        self.active_generation = Some((id, handle));
        id
    }

    /// Returns true if a live generation was cancelled.
    pub fn cancel_generation(&mut self) -> bool {
        match self.active_generation.take() {
            Some((id, handle)) if !handle.is_finished() => {
                tracing::info!(generation = id, "cancelling generation");
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn active_generation_id(&self) -> Option<u64> {
        self.active_generation.as_ref().map(|(id, _)| *id)
    }

    pub fn load_past_blogs(&self) {
        let client = self.client.clone();
        let update_tx = self.update_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_blogs().await.map_err(|error| {
                tracing::error!(%error, "failed to load past blogs");
                error.to_string()
            });
            let _ = update_tx.send(UiUpdate::PastBlogsLoaded(result));
        });
    }

    pub fn load_blog(&self, id: String) {
        let client = self.client.clone();
        let update_tx = self.update_tx.clone();
        tokio::spawn(async move {
            let result = client
                .fetch_blog(&id)
                .await
                .map(Box::new)
                .map_err(|error| {
                    tracing::error!(%error, blog_id = %id, "failed to load blog");
                    error.to_string()
                });
            let _ = update_tx.send(UiUpdate::BlogLoaded(result));
        });
    }

    /// Fetch an artifact and write it into the download directory under the
    /// name the server suggested.
    pub fn download(&self, id: String, kind: DownloadKind) {
        let client = self.client.clone();
        let update_tx = self.update_tx.clone();
        let download_dir = self.download_dir.clone();
        tokio::spawn(async move {
            let result = async {
                let download = client.download(&id, kind).await?;
                let path = download_dir.join(&download.filename);
                tokio::fs::write(&path, &download.bytes).await?;
                anyhow::Ok(path)
            }
            .await
            .map_err(|error| {
                tracing::error!(error = %error, blog_id = %id, kind = kind.label(), "download failed");
                error.to_string()
            });
            let _ = update_tx.send(UiUpdate::DownloadFinished { kind, result });
        });
    }
}
