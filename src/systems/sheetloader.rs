//! Background sheet loader thread and the system that drains it.
//!
//! - [`sheet_loader_thread`] runs on its own OS thread, reads and decodes
//!   sheet images in response to [`SheetLoadCmd`]s and sends each result back
//!   as a [`SheetDecoded`].
//! - [`poll_sheet_loads`] runs every tick on the main thread, applies finished
//!   loads through the [`SpriteSystem`] and publishes [`SheetLoadEvent`]s.
//! - [`update_sheet_load_messages`] advances the ECS message queue.
//!
//! File I/O and PNG decoding never block the tick loop; callers poll
//! [`SpriteSystem::are_sheets_loaded`] and render fallbacks meanwhile.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use log::debug;

use crate::events::sheetload::{SheetDecoded, SheetLoadCmd, SheetLoadEvent, SheetPayload};
use crate::resources::spritesheets::{SheetError, SheetImage};
use crate::resources::spritesystem::SpriteSystem;

/// Apply finished loads and publish them as [`SheetLoadEvent`] messages.
pub fn poll_sheet_loads(mut sprites: ResMut<SpriteSystem>, mut writer: MessageWriter<SheetLoadEvent>) {
    let events = sprites.poll_loads();
    if !events.is_empty() {
        writer.write_batch(events);
    }
}

/// Advance the ECS message queue for [`SheetLoadEvent`].
pub fn update_sheet_load_messages(mut msgs: ResMut<Messages<SheetLoadEvent>>) {
    msgs.update();
}

fn decode(payload: &SheetPayload, source: &str) -> Result<SheetImage, SheetError> {
    let bytes: std::borrow::Cow<'_, [u8]> = match payload {
        SheetPayload::Bytes(bytes) => std::borrow::Cow::Borrowed(bytes),
        SheetPayload::Path(path) => {
            std::borrow::Cow::Owned(std::fs::read(path).map_err(|e| SheetError::Read {
                path: source.to_string(),
                message: e.to_string(),
            })?)
        }
    };

    let image = image::load_from_memory(&bytes).map_err(|e| SheetError::Decode {
        path: source.to_string(),
        message: e.to_string(),
    })?;
    Ok(SheetImage::new(image.to_rgba8()))
}

/// Entry point of the dedicated loader thread.
///
/// Blocks on the command channel, decodes one sheet per [`SheetLoadCmd::Load`]
/// and exits on [`SheetLoadCmd::Shutdown`] or when the sender side is gone.
pub fn sheet_loader_thread(rx_cmd: Receiver<SheetLoadCmd>, tx_msg: Sender<SheetDecoded>) {
    debug!(
        "[sheets] loader thread starting (id={:?})",
        std::thread::current().id()
    );

    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            SheetLoadCmd::Load {
                key,
                ticket,
                payload,
                from_url,
            } => {
                let result = decode(&payload, &key.source);
                debug!("[sheets] decoded {} ok={}", key, result.is_ok());
                if tx_msg
                    .send(SheetDecoded {
                        key,
                        ticket,
                        from_url,
                        result,
                    })
                    .is_err()
                {
                    break;
                }
            }
            SheetLoadCmd::Shutdown => break,
        }
    }

    debug!("[sheets] loader thread exiting");
}
