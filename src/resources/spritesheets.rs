//! Sprite sheet loading and bookkeeping.
//!
//! [`SpriteSheetManager`] owns one [`SpriteSheet`] record per sheet id and
//! hands image loads to a background thread (see
//! [`sheet_loader_thread`](crate::systems::sheetloader::sheet_loader_thread)).
//! Requests for the same `(sheet id, source)` made while a load is in flight
//! share one [`LoadHandle`]. Finished loads are applied on the main thread by
//! [`SpriteSheetManager::poll`].
//!
//! Sheets are nominally 96×96 (a 3×3 grid of 32×32 cells). Other sizes are
//! accepted with a warning; [`SpriteSheetManager::calculate_crop_coordinates`]
//! rescales the cell geometry to the measured size.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::events::sheetload::{LoadKey, SheetDecoded, SheetLoadCmd, SheetLoadEvent, SheetPayload};
use crate::resources::spriteconfig::{CropRect, SpriteConfiguration};
use crate::systems::sheetloader::sheet_loader_thread;

/// Expected sheet size in pixels (3×3 cells of 32 px).
pub const EXPECTED_SHEET_WIDTH: u32 = 96;
pub const EXPECTED_SHEET_HEIGHT: u32 = 96;
/// Cells per row and per column.
pub const GRID_CELLS: u32 = 3;

/// Sheets that exist (empty) from construction, with their default sources.
pub const DEFAULT_SHEETS: [(&str, &str); 3] = [
    ("A", "bowie_cat_3x3.png"),
    ("B", "happy_buttercup_cat_3x3.png"),
    ("dog", "bonbon_dog_3x3.png"),
];

/// Errors from loading a sheet image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("no file provided for sprite sheet")]
    NoFile,
    #[error("failed to read sprite sheet {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to decode sprite sheet {path}: {message}")]
    Decode { path: String, message: String },
    #[error("unsupported sprite sheet URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("sprite sheet loader is not running")]
    LoaderUnavailable,
    #[error("sprite sheet load was cancelled")]
    Cancelled,
}

/// Decoded RGBA sheet image, cheap to clone.
#[derive(Debug, Clone)]
pub struct SheetImage(Arc<RgbaImage>);

impl SheetImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self(Arc::new(pixels))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.0
    }

    /// True when both handles point at the same decoded image.
    pub fn ptr_eq(&self, other: &SheetImage) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An uploaded sheet file: a display name plus its encoded bytes.
#[derive(Debug, Clone)]
pub struct SheetFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl SheetFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// One sheet slot. `image` is `None` until a load completes or after unload.
#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    pub image: Option<SheetImage>,
}

impl SpriteSheet {
    pub fn loaded(&self) -> bool {
        self.image.is_some()
    }
}

/// Outcome of a finished load: the decoded `(width, height)` or the error.
pub type LoadOutcome = Result<(u32, u32), SheetError>;

/// Shared handle on one in-flight (or finished) sheet load.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    key: LoadKey,
    outcome: Arc<OnceLock<LoadOutcome>>,
}

impl LoadHandle {
    fn pending(key: LoadKey) -> Self {
        Self {
            key,
            outcome: Arc::new(OnceLock::new()),
        }
    }

    fn resolve(&self, outcome: LoadOutcome) {
        // First completion wins; later ones are stale.
        let _ = self.outcome.set(outcome);
    }

    pub fn key(&self) -> &LoadKey {
        &self.key
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// `None` while the load is still running.
    pub fn outcome(&self) -> Option<&LoadOutcome> {
        self.outcome.get()
    }

    /// True when both handles belong to the same request.
    pub fn same_request(&self, other: &LoadHandle) -> bool {
        Arc::ptr_eq(&self.outcome, &other.outcome)
    }
}

/// Per-sheet entry of [`SheetStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetDetail {
    pub loaded: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Load progress across every known sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetStats {
    pub total_sheets: usize,
    pub loaded_sheets: usize,
    pub loading_progress: f32,
    pub sheets: BTreeMap<String, SheetDetail>,
}

/// Channels and join handle of the loader thread.
struct SheetLoaderBridge {
    tx_cmd: Sender<SheetLoadCmd>,
    rx_msg: Receiver<SheetDecoded>,
    handle: Option<JoinHandle<()>>,
}

impl SheetLoaderBridge {
    fn spawn() -> Self {
        let (tx_cmd, rx_cmd) = unbounded::<SheetLoadCmd>();
        let (tx_msg, rx_msg) = unbounded::<SheetDecoded>();
        let handle = std::thread::spawn(move || sheet_loader_thread(rx_cmd, tx_msg));
        Self {
            tx_cmd,
            rx_msg,
            handle: Some(handle),
        }
    }
}

impl Drop for SheetLoaderBridge {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(SheetLoadCmd::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A request the manager still expects a result for.
struct InFlight {
    handle: LoadHandle,
    ticket: u64,
}

/// Registry of sprite sheets and their pending loads.
pub struct SpriteSheetManager {
    sheets: FxHashMap<String, SpriteSheet>,
    in_flight: FxHashMap<LoadKey, InFlight>,
    next_ticket: u64,
    /// Results resolved without touching the loader (bad URLs, dead thread).
    early: Vec<SheetDecoded>,
    asset_root: PathBuf,
    loader: Option<SheetLoaderBridge>,
}

impl Default for SpriteSheetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteSheetManager {
    /// Manager with empty `A`, `B` and `dog` sheets resolving URLs against `.`.
    pub fn new() -> Self {
        Self::with_asset_root(".")
    }

    pub fn with_asset_root(asset_root: impl Into<PathBuf>) -> Self {
        let sheets = DEFAULT_SHEETS
            .iter()
            .map(|(id, _)| (id.to_string(), SpriteSheet::default()))
            .collect();
        Self {
            sheets,
            in_flight: FxHashMap::default(),
            next_ticket: 0,
            early: Vec::new(),
            asset_root: asset_root.into(),
            loader: None,
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn set_asset_root(&mut self, root: impl Into<PathBuf>) {
        self.asset_root = root.into();
    }

    /// Start loading an uploaded file into `sheet_id`.
    ///
    /// Fails straight away when the file is empty. Crops are left as
    /// configured; only URL loads rescale them.
    pub fn load_sheet(&mut self, sheet_id: &str, file: &SheetFile) -> Result<LoadHandle, SheetError> {
        if file.name.is_empty() || file.bytes.is_empty() {
            return Err(SheetError::NoFile);
        }
        let key = LoadKey::new(sheet_id, file.name.clone());
        Ok(self.request(key, SheetPayload::Bytes(file.bytes.clone()), false))
    }

    /// Start loading `sheet_id` from a URL.
    ///
    /// `file://` URLs and plain paths are read from disk, relative ones under
    /// the asset root. Network schemes fail through the returned handle.
    pub fn load_sheet_from_url(&mut self, sheet_id: &str, url: &str) -> LoadHandle {
        let key = LoadKey::new(sheet_id, url);
        if let Some(existing) = self.in_flight.get(&key) {
            return existing.handle.clone();
        }

        match self.resolve_url(url) {
            Ok(path) => self.request(key, SheetPayload::Path(path), true),
            Err(e) => self.fail_early(key, true, e),
        }
    }

    fn resolve_url(&self, url: &str) -> Result<PathBuf, SheetError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(SheetError::UnsupportedScheme(url.to_string()));
        }
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.asset_root.join(path))
        }
    }

    fn request(&mut self, key: LoadKey, payload: SheetPayload, from_url: bool) -> LoadHandle {
        if let Some(existing) = self.in_flight.get(&key) {
            return existing.handle.clone();
        }

        let ticket = self.take_ticket();
        let loader = self.loader.get_or_insert_with(SheetLoaderBridge::spawn);
        let cmd = SheetLoadCmd::Load {
            key: key.clone(),
            ticket,
            payload,
            from_url,
        };
        if loader.tx_cmd.send(cmd).is_err() {
            return self.fail_early(key, from_url, SheetError::LoaderUnavailable);
        }

        self.track(key, ticket)
    }

    fn fail_early(&mut self, key: LoadKey, from_url: bool, error: SheetError) -> LoadHandle {
        let ticket = self.take_ticket();
        self.early.push(SheetDecoded {
            key: key.clone(),
            ticket,
            from_url,
            result: Err(error),
        });
        self.track(key, ticket)
    }

    fn take_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn track(&mut self, key: LoadKey, ticket: u64) -> LoadHandle {
        let handle = LoadHandle::pending(key.clone());
        self.in_flight.insert(
            key,
            InFlight {
                handle: handle.clone(),
                ticket,
            },
        );
        handle
    }

    /// Resolve every pending load matching `pred` as cancelled. Their results
    /// are dropped when the loader delivers them.
    fn cancel_where(&mut self, pred: impl Fn(&LoadKey) -> bool) -> usize {
        let cancelled: Vec<LoadKey> = self
            .in_flight
            .keys()
            .filter(|k| pred(k))
            .cloned()
            .collect();
        for key in &cancelled {
            if let Some(pending) = self.in_flight.remove(key) {
                pending.handle.resolve(Err(SheetError::Cancelled));
            }
        }
        self.early.retain(|msg| !pred(&msg.key));
        cancelled.len()
    }

    /// Start loading every default sheet, with `overrides` replacing URLs.
    ///
    /// Each sheet loads independently; a failure only leaves that sheet on
    /// fallback rendering.
    pub fn load_all_sheets(&mut self, overrides: &[(&str, &str)]) -> Vec<LoadHandle> {
        let mut urls: BTreeMap<&str, &str> = DEFAULT_SHEETS.iter().copied().collect();
        urls.extend(overrides.iter().copied());
        urls.into_iter()
            .map(|(id, url)| self.load_sheet_from_url(id, url))
            .collect()
    }

    /// Apply every load that finished since the last call.
    pub fn poll(&mut self) -> Vec<SheetLoadEvent> {
        let mut finished: Vec<SheetDecoded> = std::mem::take(&mut self.early);
        if let Some(loader) = &self.loader {
            finished.extend(loader.rx_msg.try_iter());
        }
        finished
            .into_iter()
            .filter_map(|msg| self.complete(msg))
            .collect()
    }

    /// Block until nothing is in flight or `timeout` elapses.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> Vec<SheetLoadEvent> {
        let deadline = Instant::now() + timeout;
        let mut done = self.poll();
        while !self.in_flight.is_empty() {
            let Some(loader) = &self.loader else { break };
            let remaining = deadline.saturating_duration_since(Instant::now());
            match loader.rx_msg.recv_timeout(remaining) {
                Ok(msg) => done.extend(self.complete(msg)),
                Err(RecvTimeoutError::Timeout) => {
                    warn!("Timed out waiting for {} sprite sheet(s)", self.in_flight.len());
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        done
    }

    /// Apply one loader result. Results of cancelled or superseded requests
    /// are dropped and yield no event.
    fn complete(&mut self, msg: SheetDecoded) -> Option<SheetLoadEvent> {
        let SheetDecoded {
            key,
            ticket,
            from_url,
            result,
        } = msg;
        if self.in_flight.get(&key).is_none_or(|p| p.ticket != ticket) {
            debug!("Dropping stale sheet result {}", key);
            return None;
        }
        let handle = self.in_flight.remove(&key).map(|p| p.handle);

        match result {
            Ok(image) => {
                let (width, height) = (image.width(), image.height());
                info!("Loaded sprite sheet {} from {}", key.sheet_id, key.source);
                if !self.validate_sheet_dimensions(width, height, &key.sheet_id) {
                    warn!(
                        "Sheet {} has unexpected dimensions: {}x{}",
                        key.sheet_id, width, height
                    );
                }
                self.sheets.entry(key.sheet_id.clone()).or_default().image = Some(image);
                if let Some(handle) = handle {
                    handle.resolve(Ok((width, height)));
                }
                Some(SheetLoadEvent::Loaded {
                    sheet_id: key.sheet_id,
                    source: key.source,
                    width,
                    height,
                    crops_recalculated: from_url,
                })
            }
            Err(e) => {
                error!("Failed to load sprite sheet {}: {}", key.sheet_id, e);
                warn!(
                    "Failed to load sheet {}, will use fallback rendering",
                    key.sheet_id
                );
                if let Some(handle) = handle {
                    handle.resolve(Err(e.clone()));
                }
                Some(SheetLoadEvent::Failed {
                    sheet_id: key.sheet_id,
                    source: key.source,
                    error: e.to_string(),
                })
            }
        }
    }

    /// Number of loads still running.
    pub fn pending_loads(&self) -> usize {
        self.in_flight.len()
    }

    /// True for exactly 96×96. Anything else is only warned about.
    pub fn validate_sheet_dimensions(&self, width: u32, height: u32, sheet_id: &str) -> bool {
        if width != EXPECTED_SHEET_WIDTH || height != EXPECTED_SHEET_HEIGHT {
            warn!(
                "Sheet {} dimensions ({}x{}) do not match expected ({}x{})",
                sheet_id, width, height, EXPECTED_SHEET_WIDTH, EXPECTED_SHEET_HEIGHT
            );
            return false;
        }
        true
    }

    /// Rewrite every cell crop of `config` for a `width`×`height` sheet.
    ///
    /// Cell `idx` lands on row `idx / 3`, column `idx % 3` of an even 3×3
    /// grid; coordinates are floored to whole pixels.
    pub fn calculate_crop_coordinates(config: &mut SpriteConfiguration, width: u32, height: u32) {
        if config.cells.is_empty() {
            warn!("No cells in config {}, skipping crop calculation", config.id);
            return;
        }

        let cell_width = width as f32 / GRID_CELLS as f32;
        let cell_height = height as f32 / GRID_CELLS as f32;
        info!(
            "Calculating crops for {}: {}x{} cells",
            config.sheet,
            cell_width.floor(),
            cell_height.floor()
        );

        for (idx, cell) in config.cells.iter_mut().enumerate() {
            let r = (idx as u32 / GRID_CELLS) as f32;
            let c = (idx as u32 % GRID_CELLS) as f32;
            cell.crop = CropRect::new(
                (c * cell_width).floor(),
                (r * cell_height).floor(),
                cell_width.floor(),
                cell_height.floor(),
            );
        }

        info!(
            "Updated {} crop coordinates for {}",
            config.cells.len(),
            config.sheet
        );
    }

    pub fn get_sheet(&self, sheet_id: &str) -> Option<&SpriteSheet> {
        let sheet = self.sheets.get(sheet_id);
        if sheet.is_none() {
            warn!("Sheet not found: {}", sheet_id);
        }
        sheet
    }

    pub fn get_sheet_image(&self, sheet_id: &str) -> Option<&SheetImage> {
        self.sheets.get(sheet_id).and_then(|s| s.image.as_ref())
    }

    pub fn is_sheet_loaded(&self, sheet_id: &str) -> bool {
        self.sheets.get(sheet_id).is_some_and(SpriteSheet::loaded)
    }

    /// Drop the image of `sheet_id`, keeping the slot. Pending loads into
    /// that sheet are cancelled.
    pub fn unload_sheet(&mut self, sheet_id: &str) {
        self.cancel_where(|key| key.sheet_id == sheet_id);
        if let Some(sheet) = self.sheets.get_mut(sheet_id) {
            sheet.image = None;
            info!("Unloaded sprite sheet: {}", sheet_id);
        }
    }

    /// Ids of loaded sheets, sorted.
    pub fn get_loaded_sheets(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .sheets
            .iter()
            .filter(|(_, s)| s.loaded())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Unload every sheet and cancel pending requests.
    pub fn clear(&mut self) {
        let cancelled = self.cancel_where(|_| true);
        for sheet in self.sheets.values_mut() {
            sheet.image = None;
        }
        info!("Cleared all sprite sheets ({} pending load(s) cancelled)", cancelled);
    }

    /// Nearest-neighbour thumbnail of a loaded sheet.
    pub fn generate_preview(&self, sheet_id: &str, size: u32) -> Option<RgbaImage> {
        let Some(image) = self.get_sheet_image(sheet_id) else {
            warn!("Cannot generate preview: sheet {} not loaded", sheet_id);
            return None;
        };
        Some(imageops::resize(image.pixels(), size, size, FilterType::Nearest))
    }

    pub fn get_stats(&self) -> SheetStats {
        let sheets: BTreeMap<String, SheetDetail> = self
            .sheets
            .iter()
            .map(|(id, sheet)| {
                let detail = SheetDetail {
                    loaded: sheet.loaded(),
                    width: sheet.image.as_ref().map(SheetImage::width),
                    height: sheet.image.as_ref().map(SheetImage::height),
                };
                (id.clone(), detail)
            })
            .collect();
        let total_sheets = sheets.len();
        let loaded_sheets = sheets.values().filter(|d| d.loaded).count();
        SheetStats {
            total_sheets,
            loaded_sheets,
            loading_progress: if total_sheets > 0 {
                loaded_sheets as f32 / total_sheets as f32
            } else {
                0.0
            },
            sheets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::spriteconfig::default_pet_a;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_new_has_default_empty_sheets() {
        let m = SpriteSheetManager::new();
        let stats = m.get_stats();
        assert_eq!(stats.total_sheets, 3);
        assert_eq!(stats.loaded_sheets, 0);
        assert_eq!(stats.loading_progress, 0.0);
        assert!(stats.sheets.contains_key("dog"));
        assert!(!m.is_sheet_loaded("A"));
    }

    #[test]
    fn test_validate_sheet_dimensions() {
        let m = SpriteSheetManager::new();
        assert!(m.validate_sheet_dimensions(96, 96, "A"));
        assert!(!m.validate_sheet_dimensions(192, 192, "A"));
        assert!(!m.validate_sheet_dimensions(96, 64, "A"));
    }

    #[test]
    fn test_crop_recalculation_tiles_image_exactly() {
        let mut config = default_pet_a();
        SpriteSheetManager::calculate_crop_coordinates(&mut config, 192, 192);

        let mut covered = vec![false; 9];
        for cell in &config.cells {
            assert_eq!((cell.crop.w, cell.crop.h), (64.0, 64.0));
            let col = (cell.crop.x / 64.0) as usize;
            let row = (cell.crop.y / 64.0) as usize;
            assert_eq!(cell.crop.x % 64.0, 0.0);
            assert_eq!(cell.crop.y % 64.0, 0.0);
            assert!(!covered[row * 3 + col], "overlapping cell");
            covered[row * 3 + col] = true;
        }
        assert!(covered.iter().all(|c| *c));
    }

    #[test]
    fn test_crop_recalculation_floors_odd_sizes() {
        let mut config = default_pet_a();
        SpriteSheetManager::calculate_crop_coordinates(&mut config, 100, 50);
        assert_eq!(config.cells[4].crop, CropRect::new(33.0, 16.0, 33.0, 16.0));
        assert_eq!(config.cells[8].crop, CropRect::new(66.0, 33.0, 33.0, 16.0));
    }

    #[test]
    fn test_load_sheet_rejects_empty_file() {
        let mut m = SpriteSheetManager::new();
        let empty = SheetFile::new("", Vec::<u8>::new());
        assert_eq!(m.load_sheet("A", &empty).unwrap_err(), SheetError::NoFile);
    }

    #[test]
    fn test_load_sheet_from_file_bytes() {
        let mut m = SpriteSheetManager::new();
        let file = SheetFile::new("cat.png", png_bytes(96, 96));
        let handle = m.load_sheet("A", &file).unwrap();
        let again = m.load_sheet("A", &file).unwrap();
        assert!(handle.same_request(&again));

        let events = m.wait_for_loads(WAIT);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            SheetLoadEvent::Loaded { crops_recalculated: false, width: 96, .. }
        ));
        assert_eq!(handle.outcome(), Some(&Ok((96, 96))));
        assert!(m.is_sheet_loaded("A"));
        assert_eq!(m.pending_loads(), 0);

        let fresh = m.load_sheet("A", &file).unwrap();
        assert!(!fresh.same_request(&handle));
        m.wait_for_loads(WAIT);
    }

    #[test]
    fn test_decode_failure_is_reported_through_handle() {
        let mut m = SpriteSheetManager::new();
        let handle = m.load_sheet("B", &SheetFile::new("junk.png", vec![1u8, 2, 3])).unwrap();
        let events = m.wait_for_loads(WAIT);
        assert!(matches!(&events[0], SheetLoadEvent::Failed { sheet_id, .. } if sheet_id == "B"));
        assert!(matches!(handle.outcome(), Some(Err(SheetError::Decode { .. }))));
        assert!(!m.is_sheet_loaded("B"));
    }

    #[test]
    fn test_network_urls_fail_without_loader() {
        let mut m = SpriteSheetManager::new();
        let handle = m.load_sheet_from_url("A", "https://example.com/cat.png");
        assert!(!handle.is_finished());
        let events = m.poll();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            handle.outcome(),
            Some(Err(SheetError::UnsupportedScheme(_)))
        ));
        assert!(m.loader.is_none());
    }

    #[test]
    fn test_load_from_path_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.png"), png_bytes(192, 192)).unwrap();

        let mut m = SpriteSheetManager::with_asset_root(dir.path());
        let h1 = m.load_sheet_from_url("dog", "big.png");
        let h2 = m.load_sheet_from_url("dog", "big.png");
        assert!(h1.same_request(&h2));
        let missing = m.load_sheet_from_url("B", "file://missing.png");

        let events = m.wait_for_loads(WAIT);
        assert_eq!(events.len(), 2);
        assert_eq!(h1.outcome(), Some(&Ok((192, 192))));
        assert!(matches!(missing.outcome(), Some(Err(SheetError::Read { .. }))));

        let stats = m.get_stats();
        assert_eq!(stats.loaded_sheets, 1);
        assert!((stats.loading_progress - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(
            stats.sheets["dog"],
            SheetDetail {
                loaded: true,
                width: Some(192),
                height: Some(192)
            }
        );
        assert_eq!(m.get_loaded_sheets(), vec!["dog"]);

        let preview = m.generate_preview("dog", 48).unwrap();
        assert_eq!(preview.dimensions(), (48, 48));
        assert!(m.generate_preview("A", 48).is_none());

        m.unload_sheet("dog");
        assert!(!m.is_sheet_loaded("dog"));
    }

    #[test]
    fn test_unknown_sheet_ids_get_a_slot() {
        let mut m = SpriteSheetManager::new();
        m.load_sheet("custom", &SheetFile::new("c.png", png_bytes(96, 96)))
            .unwrap();
        m.wait_for_loads(WAIT);
        assert!(m.is_sheet_loaded("custom"));
        assert_eq!(m.get_stats().total_sheets, 4);
        m.clear();
        assert!(m.get_loaded_sheets().is_empty());
    }

    #[test]
    fn test_clear_cancels_pending_loads() {
        let mut m = SpriteSheetManager::new();
        let handle = m
            .load_sheet("A", &SheetFile::new("a.png", png_bytes(96, 96)))
            .unwrap();
        m.clear();
        assert_eq!(handle.outcome(), Some(&Err(SheetError::Cancelled)));
        assert_eq!(m.pending_loads(), 0);

        // The loader answers in order, so A's late result is drained first.
        let b = m
            .load_sheet("B", &SheetFile::new("b.png", png_bytes(96, 96)))
            .unwrap();
        let events = m.wait_for_loads(WAIT);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], SheetLoadEvent::Loaded { sheet_id, .. } if sheet_id == "B"));
        assert_eq!(b.outcome(), Some(&Ok((96, 96))));
        assert!(m.poll().is_empty());
        assert!(!m.is_sheet_loaded("A"));
        assert_eq!(handle.outcome(), Some(&Err(SheetError::Cancelled)));
    }

    #[test]
    fn test_unload_cancels_only_that_sheet() {
        let mut m = SpriteSheetManager::new();
        let dog = m
            .load_sheet("dog", &SheetFile::new("dog.png", png_bytes(96, 96)))
            .unwrap();
        let a = m
            .load_sheet("A", &SheetFile::new("a.png", png_bytes(96, 96)))
            .unwrap();
        m.unload_sheet("dog");
        assert_eq!(dog.outcome(), Some(&Err(SheetError::Cancelled)));

        let events = m.wait_for_loads(WAIT);
        assert_eq!(events.len(), 1);
        assert_eq!(a.outcome(), Some(&Ok((96, 96))));
        assert!(m.is_sheet_loaded("A"));
        assert!(!m.is_sheet_loaded("dog"));
    }

    #[test]
    fn test_reload_after_clear_ignores_earlier_request() {
        let mut m = SpriteSheetManager::new();
        let stale = m
            .load_sheet("A", &SheetFile::new("wide.png", png_bytes(192, 96)))
            .unwrap();
        m.clear();
        let fresh = m
            .load_sheet("A", &SheetFile::new("a.png", png_bytes(96, 96)))
            .unwrap();
        assert!(!fresh.same_request(&stale));

        let events = m.wait_for_loads(WAIT);
        assert_eq!(events.len(), 1);
        assert_eq!(fresh.outcome(), Some(&Ok((96, 96))));
        assert_eq!(m.get_stats().sheets["A"].width, Some(96));
    }

    #[test]
    fn test_clear_drops_queued_failures() {
        let mut m = SpriteSheetManager::new();
        let handle = m.load_sheet_from_url("A", "https://example.com/cat.png");
        m.clear();
        assert!(m.poll().is_empty());
        assert_eq!(handle.outcome(), Some(&Err(SheetError::Cancelled)));
    }
}
