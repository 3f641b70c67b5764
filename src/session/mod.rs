//! Client session.
//!
//! Holds what a user sees while refining prompts: the input, its live cost
//! estimate, the latest output, the last ten refinements, a copy
//! acknowledgement and an optional diff view. The current pair is mirrored
//! into a [`ShareLink`] so the same view can be reopened later.
//!
//! # Overview
//!
//! - **state**: [`SessionState`] and its pure `update` function
//! - **driver**: [`SessionDriver`], which executes effects against storage,
//!   clipboard and a [`RefineBackend`]
//! - **store**: file and in-memory history slot and address bar
//! - **remote**: [`HttpRefineBackend`] for a running proxy server

mod driver;
mod history;
mod remote;
mod share;
mod state;
mod store;

pub use driver::{Clipboard, ClipboardError, MemoryClipboard, RefineBackend, SessionDriver};
pub use history::{History, TextPair, HISTORY_CAPACITY};
pub use remote::HttpRefineBackend;
pub use share::{ShareLink, INPUT_PARAM, OUTPUT_PARAM};
pub use state::{Effect, SessionEvent, SessionState, REFINE_FAILED_MESSAGE};
pub use store::{
    AddressBar, FileAddressBar, FileHistoryStore, HistoryStore, MemoryAddressBar,
    MemoryHistoryStore, StorageError, HISTORY_FILE_NAME, LINK_FILE_NAME,
};
