use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::assets::decode::DecodedImage;
use crate::assets::fetch::AssetFetcher;
use crate::assets::loader::AssetLoader;
use crate::foundation::core::{AssetId, SurfaceId};
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::SurfaceBackend;
use crate::scene::messages::{AssetRequest, CoreEvent, ExportRequest, HostMessage};
use crate::scene::ops::{Operation, RawOperation};
use crate::stage::config::StageConfig;
use crate::stage::export::export as export_region;
use crate::stage::interpreter::apply_raw;
use crate::stage::registry::SurfaceRegistry;

enum Command {
    Message(HostMessage),
    Shutdown,
}

struct LoadOutcome {
    id: SurfaceId,
    generation: u64,
    result: StageResult<Vec<Arc<DecodedImage>>>,
}

/// A surface whose assets are still loading, with the requests that arrived meanwhile.
struct PendingLoad {
    generation: u64,
    queued: VecDeque<HostMessage>,
}

/// The task that owns a [`SurfaceRegistry`] and serves host messages one at a time.
///
/// Asset loads run on their own tasks and report back here, so drawing never observes a
/// half-loaded manifest: renders and exports for a loading surface wait in a queue and are replayed
/// in arrival order once the load settles.
pub struct StageService<B: SurfaceBackend> {
    registry: SurfaceRegistry<B>,
    loader: AssetLoader,
    pending: HashMap<SurfaceId, PendingLoad>,
    events: mpsc::Sender<CoreEvent>,
    loads_tx: mpsc::UnboundedSender<LoadOutcome>,
    loads_rx: mpsc::UnboundedReceiver<LoadOutcome>,
}

impl<B> StageService<B>
where
    B: SurfaceBackend + 'static,
{
    /// Start the service on the current tokio runtime.
    pub fn spawn(backend: B, config: StageConfig, fetcher: Arc<dyn AssetFetcher>) -> StageHandle {
        let capacity = config.event_buffer.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
        let (events_tx, events_rx) = mpsc::channel(capacity);
        let (loads_tx, loads_rx) = mpsc::unbounded_channel();

        let service = Self {
            registry: SurfaceRegistry::new(backend, config),
            loader: AssetLoader::new(fetcher),
            pending: HashMap::new(),
            events: events_tx,
            loads_tx,
            loads_rx,
        };
        let join = tokio::spawn(service.run(cmd_rx));

        StageHandle {
            commands: cmd_tx,
            events: events_rx,
            join,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!("stage service started");
        loop {
            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(Command::Message(msg)) => self.handle(msg).await,
                    Some(Command::Shutdown) | None => break,
                },
                Some(outcome) = self.loads_rx.recv() => self.finish_load(outcome).await,
            }
        }
        tracing::debug!(surfaces = self.registry.len(), "stage service stopped");
    }

    async fn handle(&mut self, msg: HostMessage) {
        if let Some(pending) = self.pending.get_mut(msg.surface_id()) {
            if matches!(msg, HostMessage::Render { .. } | HostMessage::Export(_)) {
                tracing::trace!(id = %msg.surface_id(), "queued until assets load");
                pending.queued.push_back(msg);
                return;
            }
        }

        match msg {
            HostMessage::Register {
                id,
                width,
                height,
                assets,
            } => self.register(id, width, height, assets).await,
            HostMessage::Render {
                surface_id,
                operations,
            } => self.render(surface_id, &operations).await,
            HostMessage::Export(req) => self.export(req).await,
            HostMessage::Unregister { id } => self.unregister(id).await,
        }
    }

    async fn register(
        &mut self,
        id: SurfaceId,
        width: Option<u32>,
        height: Option<u32>,
        assets: Vec<AssetRequest>,
    ) {
        self.drop_pending(&id, "surface was re-registered before its assets loaded")
            .await;

        let generation = match self.registry.register(id.clone(), width, height) {
            Ok(generation) => generation,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "register failed");
                self.emit(CoreEvent::RegisterFailed {
                    id,
                    reason: e.to_string(),
                })
                .await;
                return;
            }
        };

        if assets.is_empty() {
            self.emit(CoreEvent::Ready { id }).await;
            return;
        }

        self.pending.insert(
            id.clone(),
            PendingLoad {
                generation,
                queued: VecDeque::new(),
            },
        );
        let loader = self.loader.clone();
        let done = self.loads_tx.clone();
        tokio::spawn(async move {
            let result = loader.load_all(&id, &assets).await;
            // The service may already be gone; nothing to report to then.
            let _ = done.send(LoadOutcome {
                id,
                generation,
                result,
            });
        });
    }

    async fn finish_load(&mut self, outcome: LoadOutcome) {
        let LoadOutcome {
            id,
            generation,
            result,
        } = outcome;
        let current = self.pending.get(&id).map(|p| p.generation);
        if current != Some(generation) {
            tracing::debug!(id = %id, generation, "discarding result of a superseded load");
            return;
        }
        let Some(pending) = self.pending.remove(&id) else {
            return;
        };

        match result {
            Ok(images) => match self.registry.install_images(&id, generation, images) {
                Ok(true) => self.emit(CoreEvent::Ready { id: id.clone() }).await,
                Ok(false) => {}
                Err(e) => tracing::warn!(id = %id, error = %e, "could not install assets"),
            },
            Err(e) => {
                let (asset, url) = match &e {
                    StageError::AssetLoadFailed { asset, url, .. } => (asset.clone(), url.clone()),
                    _ => (AssetId::from(""), String::new()),
                };
                self.emit(CoreEvent::LoadFailed {
                    id: id.clone(),
                    asset,
                    url,
                    reason: e.to_string(),
                })
                .await;
            }
        }

        for msg in pending.queued {
            self.handle(msg).await;
        }
    }

    async fn render(&mut self, id: SurfaceId, operations: &[RawOperation]) {
        match apply_raw(&mut self.registry, &id, operations) {
            Ok(()) => self.emit(CoreEvent::Rendered { surface_id: id }).await,
            Err(e) => {
                let (index, tag) = match &e {
                    StageError::BatchAborted { index, tag, .. } => (Some(*index), Some(tag.clone())),
                    _ => (None, None),
                };
                self.emit(CoreEvent::RenderFailed {
                    surface_id: id,
                    index,
                    tag,
                    reason: e.to_string(),
                })
                .await;
            }
        }
    }

    async fn export(&mut self, req: ExportRequest) {
        let event = match export_region(&self.registry, &req) {
            Ok(image) => CoreEvent::Exported {
                surface_id: req.surface_id,
                encoded_image: image.data_uri(),
                pixels: image.pixels,
            },
            Err(e) => {
                tracing::warn!(id = %req.surface_id, error = %e, "export failed");
                CoreEvent::ExportFailed {
                    surface_id: req.surface_id,
                    reason: e.to_string(),
                }
            }
        };
        self.emit(event).await;
    }

    async fn unregister(&mut self, id: SurfaceId) {
        self.drop_pending(&id, "surface was unregistered before its assets loaded")
            .await;
        if let Err(e) = self.registry.unregister(&id) {
            tracing::debug!(id = %id, error = %e, "unregister of unknown surface");
        }
    }

    /// Forget an in-flight load and fail whatever was queued behind it.
    async fn drop_pending(&mut self, id: &SurfaceId, reason: &str) {
        let Some(pending) = self.pending.remove(id) else {
            return;
        };
        for msg in pending.queued {
            let event = match msg {
                HostMessage::Render { surface_id, .. } => CoreEvent::RenderFailed {
                    surface_id,
                    index: None,
                    tag: None,
                    reason: reason.to_owned(),
                },
                HostMessage::Export(req) => CoreEvent::ExportFailed {
                    surface_id: req.surface_id,
                    reason: reason.to_owned(),
                },
                HostMessage::Register { .. } | HostMessage::Unregister { .. } => continue,
            };
            self.emit(event).await;
        }
    }

    async fn emit(&mut self, event: CoreEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

/// Client side of a running [`StageService`].
#[derive(Debug)]
pub struct StageHandle {
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<CoreEvent>,
    join: JoinHandle<()>,
}

impl StageHandle {
    /// Submit a host message.
    pub async fn send(&self, msg: HostMessage) -> StageResult<()> {
        self.commands
            .send(Command::Message(msg))
            .await
            .map_err(|_| stopped())
    }

    /// Register (or replace) a surface.
    pub async fn register(
        &self,
        id: impl Into<SurfaceId>,
        width: Option<u32>,
        height: Option<u32>,
        assets: Vec<AssetRequest>,
    ) -> StageResult<()> {
        self.send(HostMessage::Register {
            id: id.into(),
            width,
            height,
            assets,
        })
        .await
    }

    /// Submit a batch of typed operations.
    pub async fn render(
        &self,
        surface_id: impl Into<SurfaceId>,
        operations: &[Operation],
    ) -> StageResult<()> {
        self.send(HostMessage::Render {
            surface_id: surface_id.into(),
            operations: operations.iter().map(RawOperation::from).collect(),
        })
        .await
    }

    /// Request a pixel export.
    pub async fn export(&self, req: ExportRequest) -> StageResult<()> {
        self.send(HostMessage::Export(req)).await
    }

    /// Drop a surface.
    pub async fn unregister(&self, id: impl Into<SurfaceId>) -> StageResult<()> {
        self.send(HostMessage::Unregister { id: id.into() }).await
    }

    /// Next event from the service; `None` once it has stopped and the queue is drained.
    pub async fn next_event(&mut self) -> Option<CoreEvent> {
        self.events.recv().await
    }

    /// Stop the service and wait for its task to finish.
    pub async fn shutdown(self) -> StageResult<()> {
        // A send error means the task already stopped.
        let _ = self.commands.send(Command::Shutdown).await;
        self.join
            .await
            .map_err(|e| StageError::Other(anyhow::anyhow!("stage service task failed: {e}")))
    }
}

fn stopped() -> StageError {
    StageError::Other(anyhow::anyhow!("stage service has stopped"))
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(msg) => f.debug_tuple("Message").field(msg).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/actor.rs"]
mod tests;
