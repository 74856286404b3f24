use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::debounce::Debouncer;
use crate::error::ClientError;
use crate::grid::{Cursor, GridEditor, KeyPress};
use crate::transport::Transport;

/// Idle time after the last edit before the grid is pushed.
pub const SAVE_DELAY: Duration = Duration::from_secs(1);

/// Shared character-grid guestbook controller.
///
/// Edits apply to the local grid immediately. A burst of edits is saved once,
/// [`SAVE_DELAY`] after the last one; save failures are only logged.
pub struct Canvas<T> {
    editor: GridEditor,
    transport: Arc<T>,
    autosave: Debouncer,
}

impl<T: Transport> Canvas<T> {
    pub fn new(transport: T) -> Self {
        Self::with_save_delay(transport, SAVE_DELAY)
    }

    pub fn with_save_delay(transport: T, delay: Duration) -> Self {
        Self {
            editor: GridEditor::new(),
            transport: Arc::new(transport),
            autosave: Debouncer::new(delay),
        }
    }

    pub fn editor(&self) -> &GridEditor {
        &self.editor
    }

    pub fn cursor(&self) -> Cursor {
        self.editor.cursor()
    }

    pub fn render(&self) -> String {
        self.editor.grid().render()
    }

    pub fn save_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Reset to a blank grid and lay the stored grid over it. The canvas is
    /// usable (blank) even when this fails.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.editor = GridEditor::new();

        let document = self.transport.fetch().await.inspect_err(|e| {
            error!("Error loading guestbook: {}", e);
        })?;
        match document.get("grid") {
            Some(Value::Array(rows)) => {
                self.editor.grid_mut().overlay(rows);
                debug!("Loaded guestbook grid with {} rows", rows.len());
            }
            _ => debug!("No stored guestbook grid, starting blank"),
        }
        Ok(())
    }

    /// Handle a key press; content changes (re)arm the autosave.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn key(&mut self, press: KeyPress) -> bool {
        let changed = self.editor.press(press);
        if changed {
            self.schedule_save();
        }
        changed
    }

    /// Move the cursor to the clicked cell. Never saves.
    pub fn click(&mut self, px: f64, py: f64) -> Cursor {
        self.editor.click(px, py)
    }

    fn schedule_save(&mut self) {
        let document = self.editor.grid().to_document();
        let transport = Arc::clone(&self.transport);
        self.autosave.schedule(async move {
            if let Err(e) = transport.save(&document).await {
                error!("Error saving canvas: {}", e);
            }
        });
    }
}
