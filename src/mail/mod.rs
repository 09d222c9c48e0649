pub mod api;
pub mod folder;
pub mod message;
pub mod render;
pub mod types;

pub use api::{ApiClient, MessageApi, Store};
pub use folder::{Folder, FolderSource};
pub use message::{DraftMessage, Message, RemoteMessage};
pub use render::{RenderedContent, render_content, to_text};
pub use types::{Address, Content, MessageSummary};
