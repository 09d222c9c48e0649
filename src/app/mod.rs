//! Application core: owns the mail store, the message list and the UI state

mod actions;
mod event_loop;
pub mod state;
mod terminal;

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::input::KeyBindings;
use crate::lazylist::LazyList;
use crate::mail::{ApiClient, Folder, FolderSource, MessageSummary, RemoteMessage, Store};
use crate::ui::{self, Panes};
use state::AppState;
use terminal::Tui;

type MessageList = LazyList<FolderSource<ApiClient>, MessageSummary>;

/// Results of background work that the UI waits on
#[derive(Debug)]
pub(crate) enum AppEvent {
    ContentLoaded {
        id: String,
        text: String,
        attachments: Vec<String>,
    },
    ContentFailed {
        id: String,
        error: String,
    },
}

pub struct App {
    pub(crate) config: Config,
    pub(crate) store: Store,
    pub(crate) api: Arc<ApiClient>,
    pub(crate) bindings: KeyBindings,
    pub(crate) folders: Vec<Arc<Folder>>,
    pub(crate) list: Option<MessageList>,
    pub(crate) message: Option<Arc<RemoteMessage>>,
    pub(crate) events_tx: mpsc::UnboundedSender<AppEvent>,
    pub(crate) events_rx: mpsc::UnboundedReceiver<AppEvent>,
    pub(crate) state: AppState,
    pub(crate) panes: Panes,
    pub(crate) dirty: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config.api)?;
        let store = Store::new(api.clone());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let state = AppState {
            split_ratio: config.ui.split_ratio(),
            ..AppState::default()
        };
        let panes = ui::layout(Default::default(), state.split_ratio);

        Ok(Self {
            config,
            store,
            api: Arc::new(api),
            bindings: KeyBindings::default(),
            folders: Vec::new(),
            list: None,
            message: None,
            events_tx,
            events_rx,
            state,
            panes,
            dirty: true,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Restores the terminal on drop, whatever the outcome
        let mut tui = Tui::enter()?;
        self.resize(tui.area()?);

        self.state.status.set_message("Loading folders...");
        tui.draw(&self.state)?;
        self.load_folders().await;

        self.event_loop(&mut tui).await
    }

    async fn load_folders(&mut self) {
        match self.store.folders().await {
            Ok(folders) => {
                self.folders = folders.to_vec();
                self.state.folders.rebuild(&self.folders);
                self.state
                    .status
                    .set_message(format!("{} folders", self.state.folders.rows.len()));
                // Start out in the first folder, usually the inbox
                if let Some(first) = self.folders.first().map(|f| f.path.clone()) {
                    self.open_folder(&first);
                }
            }
            Err(e) => {
                tracing::error!("Failed to load folders: {:#}", e);
                self.state.status.set_error(format!("{:#}", e));
            }
        }
        self.dirty = true;
    }

    pub(crate) fn resize(&mut self, area: ratatui::layout::Rect) {
        self.panes = ui::layout(area, self.state.split_ratio);
        self.scroll_list_to_selection();
    }
}
