//! System tray icon with state-based updates.
//!
//! The tray is the recorder's whole UI: the icon tracks the session state,
//! the title/tooltip carries the live elapsed time and file size, and the
//! menu starts and stops recordings.

use crate::{AppError, AppResult, TrayIconState, finished_tooltip};

use std::{panic::Location, path::Path};

use error_location::ErrorLocation;
use screen_recorder_core::ProgressUpdate;
use tracing::{debug, info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const ICON_SIZE: u32 = 32;

/// Menu item ids handed to the async side for event matching.
#[derive(Debug, Clone)]
pub struct TrayMenuIds {
    /// "Start Recording".
    pub start: MenuId,
    /// "Stop Recording".
    pub stop: MenuId,
    /// "Open Recordings Folder".
    pub open_folder: MenuId,
    /// "Exit".
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    start_item: MenuItem,
    stop_item: MenuItem,
    ids: TrayMenuIds,
    state: TrayIconState,
    progress_visible: bool,
    finished: Option<String>,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let start_item = MenuItem::new("Start Recording", true, None);
        let stop_item = MenuItem::new("Stop Recording", false, None);
        let open_item = MenuItem::new("Open Recordings Folder", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let ids = TrayMenuIds {
            start: start_item.id().clone(),
            stop: stop_item.id().clone(),
            open_folder: open_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        menu.append_items(&[
            &start_item,
            &stop_item,
            &PredefinedMenuItem::separator(),
            &open_item,
            &PredefinedMenuItem::separator(),
            &exit_item,
        ])
        .map_err(|e| AppError::UiError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(TrayIconState::Idle.tooltip())
            .with_menu(Box::new(menu))
            .with_icon(Self::render_icon(TrayIconState::Idle)?)
            .build()
            .map_err(|e| AppError::UiError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            start_item,
            stop_item,
            ids,
            state: TrayIconState::Idle,
            progress_visible: false,
            finished: None,
        })
    }

    /// Update icon, tooltip and menu availability for a new state.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(Self::render_icon(state)?))
            .map_err(|e| AppError::UiError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.start_item.set_enabled(state == TrayIconState::Idle);
        self.stop_item.set_enabled(state == TrayIconState::Recording);
        self.state = state;
        if state == TrayIconState::Recording {
            self.finished = None;
        }

        if !self.progress_visible {
            self.set_tooltip(&self.resting_tooltip())?;
        }

        Ok(())
    }

    /// Begin accepting progress updates.
    pub fn show_progress(&mut self) {
        self.progress_visible = true;
    }

    /// Render one progress update as the tray title and tooltip.
    ///
    /// Updates that arrive after [`hide_progress`](Self::hide_progress) are
    /// ignored.
    #[track_caller]
    pub fn update_progress(&mut self, update: &ProgressUpdate) -> AppResult<()> {
        if !self.progress_visible {
            debug!("Progress update after hide, skipped");
            return Ok(());
        }

        let text = format!("● {} · {}", update.duration_text, update.size_text);
        self.tray_icon.set_title(Some(&text));
        self.set_tooltip(&format!("Recording {}", text))
    }

    /// Clear progress text and restore the state tooltip.
    #[track_caller]
    pub fn hide_progress(&mut self) -> AppResult<()> {
        self.progress_visible = false;
        self.tray_icon.set_title(None::<&str>);
        self.set_tooltip(&self.resting_tooltip())
    }

    /// Show where the last recording went. Kept until the next recording.
    #[track_caller]
    pub fn show_finished(&mut self, path: &Path, summary: &str) -> AppResult<()> {
        let tooltip = finished_tooltip(path, summary);
        self.set_tooltip(&tooltip)?;
        self.finished = Some(tooltip);
        Ok(())
    }

    fn resting_tooltip(&self) -> String {
        match (&self.finished, self.state) {
            (Some(finished), TrayIconState::Idle) => finished.clone(),
            _ => self.state.tooltip().to_string(),
        }
    }

    /// Menu ids for event matching.
    pub fn menu_ids(&self) -> &TrayMenuIds {
        &self.ids
    }

    #[track_caller]
    fn set_tooltip(&self, tooltip: &str) -> AppResult<()> {
        self.tray_icon
            .set_tooltip(Some(tooltip))
            .map_err(|e| AppError::UiError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Filled disc in the state colour on a transparent square.
    #[track_caller]
    fn render_icon(state: TrayIconState) -> AppResult<Icon> {
        let [r, g, b] = state.colour();
        let centre = (ICON_SIZE as f32 - 1.0) / 2.0;
        let radius = ICON_SIZE as f32 / 2.0 - 2.0;

        let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
        for y in 0..ICON_SIZE {
            for x in 0..ICON_SIZE {
                let dx = x as f32 - centre;
                let dy = y as f32 - centre;
                let distance = (dx * dx + dy * dy).sqrt();
                // one pixel of antialiasing at the rim
                let alpha = (radius + 0.5 - distance).clamp(0.0, 1.0);
                rgba.extend_from_slice(&[r, g, b, (alpha * 255.0) as u8]);
            }
        }

        Icon::from_rgba(rgba, ICON_SIZE, ICON_SIZE).map_err(|e| AppError::UiError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
