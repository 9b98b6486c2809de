//! Wall session: the host event loop around [`EngineCore`].
//!
//! DESIGN
//! ======
//! One task owns the engine. It selects over three sources: snapshots from
//! the store subscription, commands from the UI host, and a frame interval
//! that drives [`EngineCore::tick`] and the header typing effect. Engine
//! actions are split on the way out: `Remote` ops go to a writer task that
//! executes them in order, every other action is forwarded to the host, and
//! a `watch` channel carries the latest notes, viewport, and header title.
//!
//! ERROR HANDLING
//! ==============
//! Remote writes are fire-and-forget. A failed write is logged and local
//! state is left as it is; the next snapshot from the store is authoritative.

use std::sync::Arc;
use std::time::Duration;

use canvas::camera::{Point, Viewport};
use canvas::engine::{Action, EngineCore, Now};
use canvas::input::{Control, Modifiers, WheelDelta};
use canvas::note::{Note, NoteId};
use canvas::remote::RemoteOp;
use canvas::typing::TypingEffect;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WallConfig;
use crate::remote::{self, RealtimeStore, RemoteError, Subscription};

const COMMAND_QUEUE_CAPACITY: usize = 256;
const WRITE_QUEUE_CAPACITY: usize = 1024;

/// Input and requests from the UI host.
#[derive(Debug, Clone)]
pub enum WallCommand {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp { detail: u32 },
    PointerCancel,
    PointerEnter(NoteId),
    PointerLeave,
    Wheel { delta: WheelDelta, modifiers: Modifiers },
    TouchStart(Vec<Point>),
    TouchMove(Vec<Point>),
    TouchEnd { remaining: Vec<Point>, detail: u32 },
    TouchCancel,
    Control { id: NoteId, control: Control },
    CreateNote,
    SaveNote(Note),
    MoveNote { id: NoteId, x: f64, y: f64 },
    BringToFront(NoteId),
    DeleteNote(NoteId),
    BulkDelete,
    Undo,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Resize { width: f64, height: f64 },
    Shutdown,
}

/// What the presentation layer paints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WallView {
    /// Paint order, bottom first.
    pub notes: Vec<Note>,
    pub viewport: Viewport,
    /// Visible prefix of the animated header title.
    pub title: String,
}

impl WallView {
    fn of(engine: &EngineCore, title: &TypingEffect) -> Self {
        Self {
            notes: engine.notes().cloned().collect(),
            viewport: engine.viewport(),
            title: title.visible().to_owned(),
        }
    }
}

/// Handle to a running wall session.
pub struct WallSession {
    id: Uuid,
    commands: mpsc::Sender<WallCommand>,
    actions: mpsc::UnboundedReceiver<Action>,
    view: watch::Receiver<WallView>,
    task: JoinHandle<()>,
}

impl WallSession {
    /// Subscribe to the notes collection and start the session loop.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the subscription cannot be opened.
    pub async fn spawn(store: Arc<dyn RealtimeStore>, config: &WallConfig) -> Result<Self, RemoteError> {
        let id = Uuid::new_v4();
        let feed = store.subscribe(&config.notes_path).await?;
        let engine = EngineCore::new(config.engine_settings());
        let mut title = TypingEffect::default();
        title.start_at(now().instant);

        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(WallView::of(&engine, &title));

        let session = SessionLoop {
            id,
            engine,
            title,
            feed,
            feed_open: true,
            writes: spawn_remote_writer(store),
            actions: action_tx,
            view: view_tx,
        };
        let task = tokio::spawn(session.run(command_rx, config.frame_interval()));

        info!(session_id = %id, path = %config.notes_path, "wall session started");
        Ok(Self { id, commands: command_tx, actions: action_rx, view: view_rx, task })
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a command. Returns `false` once the session has stopped.
    pub async fn send(&self, command: WallCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// A sender for hosts that feed commands from several tasks.
    #[must_use]
    pub fn commands(&self) -> mpsc::Sender<WallCommand> {
        self.commands.clone()
    }

    /// Wait for the next presentation action. `None` once the session has stopped.
    pub async fn next_action(&mut self) -> Option<Action> {
        self.actions.recv().await
    }

    /// Latest view; `changed()` wakes on every repaint.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<WallView> {
        self.view.clone()
    }

    /// Stop the loop, tear the engine down, and wait for queued writes to finish.
    pub async fn shutdown(self) {
        if self.commands.send(WallCommand::Shutdown).await.is_err() {
            debug!(session_id = %self.id, "session already stopped");
        }
        if let Err(e) = self.task.await {
            warn!(session_id = %self.id, error = %e, "wall session task failed");
        }
    }
}

struct SessionLoop {
    id: Uuid,
    engine: EngineCore,
    title: TypingEffect,
    feed: Subscription,
    feed_open: bool,
    writes: (mpsc::Sender<RemoteOp>, JoinHandle<()>),
    actions: mpsc::UnboundedSender<Action>,
    view: watch::Sender<WallView>,
}

impl SessionLoop {
    async fn run(mut self, mut commands: mpsc::Receiver<WallCommand>, frame_interval: Duration) {
        let mut ticker = tokio::time::interval(frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let mut retitled = false;
            let actions = tokio::select! {
                snapshot = self.feed.next(), if self.feed_open => match snapshot {
                    Some(value) => {
                        debug!(session_id = %self.id, "snapshot received");
                        self.engine.apply_remote_snapshot(&value, now())
                    }
                    None => {
                        warn!(session_id = %self.id, path = %self.feed.path(), "note feed closed");
                        self.feed_open = false;
                        Vec::new()
                    }
                },
                command = commands.recv() => match command {
                    None | Some(WallCommand::Shutdown) => break,
                    Some(command) => handle_command(&mut self.engine, command, now()),
                },
                _ = ticker.tick() => {
                    let at = now();
                    retitled = self.title.poll_at(at.instant);
                    self.engine.tick(at)
                }
            };
            self.dispatch(actions, retitled).await;
        }

        self.engine.teardown();
        self.title.stop();
        let (write_tx, writer) = self.writes;
        drop(write_tx);
        if let Err(e) = writer.await {
            warn!(session_id = %self.id, error = %e, "remote writer failed");
        }
        info!(session_id = %self.id, "wall session stopped");
    }

    async fn dispatch(&mut self, actions: Vec<Action>, retitled: bool) {
        if actions.is_empty() && !retitled {
            return;
        }
        for action in actions {
            match action {
                Action::Remote(op) => {
                    if self.writes.0.send(op).await.is_err() {
                        warn!(session_id = %self.id, "remote writer gone; dropping write");
                    }
                }
                other => {
                    if self.actions.send(other).is_err() {
                        debug!(session_id = %self.id, "host stopped listening for actions");
                    }
                }
            }
        }
        let view = WallView::of(&self.engine, &self.title);
        self.view.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view;
            true
        });
    }
}

/// Route one host command to the engine.
fn handle_command(engine: &mut EngineCore, command: WallCommand, now: Now) -> Vec<Action> {
    match command {
        WallCommand::PointerDown(p) => engine.on_pointer_down(p),
        WallCommand::PointerMove(p) => engine.on_pointer_move(p),
        WallCommand::PointerUp { detail } => engine.on_pointer_up(detail, now),
        WallCommand::PointerCancel => engine.on_pointer_cancel(now),
        WallCommand::PointerEnter(id) => engine.on_pointer_enter(&id),
        WallCommand::PointerLeave => engine.on_pointer_leave(),
        WallCommand::Wheel { delta, modifiers } => engine.on_wheel(delta, modifiers),
        WallCommand::TouchStart(touches) => engine.on_touch_start(&touches),
        WallCommand::TouchMove(touches) => engine.on_touch_move(&touches),
        WallCommand::TouchEnd { remaining, detail } => engine.on_touch_end(&remaining, detail, now),
        WallCommand::TouchCancel => engine.on_touch_cancel(now),
        WallCommand::Control { id, control } => engine.on_control(&id, control),
        WallCommand::CreateNote => {
            let (id, actions) = engine.create_note(now);
            info!(note_id = %id, "note created");
            actions
        }
        WallCommand::SaveNote(note) => engine.save_note(note, now),
        WallCommand::MoveNote { id, x, y } => engine.move_note(&id, x, y, now),
        WallCommand::BringToFront(id) => engine.bring_to_front(&id),
        WallCommand::DeleteNote(id) => engine.delete_note(&id),
        WallCommand::BulkDelete => engine.bulk_delete(now),
        WallCommand::Undo => engine.undo(now),
        WallCommand::ZoomIn => engine.zoom_in(),
        WallCommand::ZoomOut => engine.zoom_out(),
        WallCommand::ResetZoom => engine.reset_zoom(),
        WallCommand::Resize { width, height } => engine.set_viewport_size(width, height),
        WallCommand::Shutdown => Vec::new(),
    }
}

/// Spawn the ordered write-through worker. Dropping the sender drains and stops it.
fn spawn_remote_writer(store: Arc<dyn RealtimeStore>) -> (mpsc::Sender<RemoteOp>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<RemoteOp>(WRITE_QUEUE_CAPACITY);
    let handle = tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            let path = op.path().to_owned();
            if let Err(e) = remote::execute(store.as_ref(), op).await {
                warn!(%path, error = %e, "remote write failed");
            }
        }
    });
    (tx, handle)
}

/// Wall-clock stamp with the monotonic part taken from tokio's clock, so
/// timers follow paused time in tests.
fn now() -> Now {
    Now { instant: tokio::time::Instant::now().into_std(), ..Now::current() }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
