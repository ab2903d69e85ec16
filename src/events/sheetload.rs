//! Messages exchanged with the background sheet loader thread.
//!
//! [`SheetLoadCmd`] goes *to* the loader, [`SheetDecoded`] comes back, and
//! once the main thread has applied a result it publishes a
//! [`SheetLoadEvent`] into the ECS message queue.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bevy_ecs::message::Message;

use crate::resources::spritesheets::{SheetError, SheetImage};

/// Identity of a load request: the same sheet from the same source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadKey {
    pub sheet_id: String,
    pub source: String,
}

impl LoadKey {
    pub fn new(sheet_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for LoadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sheet_id, self.source)
    }
}

/// Where the loader gets the encoded image from.
#[derive(Debug, Clone)]
pub enum SheetPayload {
    /// Bytes already in memory (an uploaded file).
    Bytes(Arc<[u8]>),
    /// A file on disk.
    Path(PathBuf),
}

/// Commands sent *to* the loader thread.
#[derive(Debug)]
pub enum SheetLoadCmd {
    Load {
        key: LoadKey,
        /// Request number, echoed back to tell stale results apart.
        ticket: u64,
        payload: SheetPayload,
        from_url: bool,
    },
    Shutdown,
}

/// Decode results sent *back* from the loader thread.
#[derive(Debug)]
pub struct SheetDecoded {
    pub key: LoadKey,
    pub ticket: u64,
    pub from_url: bool,
    pub result: Result<SheetImage, SheetError>,
}

/// Published once a finished load has been applied to the sheet store.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SheetLoadEvent {
    Loaded {
        sheet_id: String,
        source: String,
        width: u32,
        height: u32,
        /// Cell crops were recomputed from the real image size.
        crops_recalculated: bool,
    },
    Failed {
        sheet_id: String,
        source: String,
        error: String,
    },
}
