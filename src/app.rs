use crate::config::AppConfig;
use crate::error::Result;
use crate::export;
use crate::lattice::{ClusterStats, Percolation};
use crate::presets::{Preset, PresetManager};
use crate::settings::PercolationSettings;
use rand::rngs::StdRng;
use std::path::PathBuf;

/// Probability step for the arrow keys
const PROBABILITY_STEP: f64 = 0.01;

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    Size,
    Probability,
    // Controls box (not a param)
    #[default]
    Controls,
}

impl Focus {
    /// Tab cycles through parameters
    pub fn next(&self) -> Focus {
        match self {
            Focus::Controls => Focus::Size,
            Focus::Size => Focus::Probability,
            Focus::Probability => Focus::Controls,
        }
    }

    /// Shift+Tab cycles through parameters in reverse
    pub fn prev(&self) -> Focus {
        match self {
            Focus::Size => Focus::Controls,
            Focus::Controls => Focus::Probability,
            Focus::Probability => Focus::Size,
        }
    }

    /// Check if focus is on a parameter (not Controls)
    pub fn is_param(&self) -> bool {
        matches!(self, Focus::Size | Focus::Probability)
    }
}

/// Main application state
pub struct App {
    pub settings: PercolationSettings,
    /// Latest generated lattice, replaced wholesale on every regeneration
    pub percolation: Percolation,
    pub stats: ClusterStats,
    pub presets: PresetManager,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Where `W` writes the config
    pub config_path: Option<PathBuf>,
    /// Where `E` writes the image
    pub export_path: PathBuf,
    pub cell_px: u32,
    /// Last status message shown in the sidebar
    pub message: Option<String>,
    rng: StdRng,
}

impl App {
    /// Create the app and run the first regeneration
    pub fn new(settings: PercolationSettings, presets: PresetManager) -> Result<Self> {
        let settings = settings.normalized();
        let mut rng = settings.rng();
        let percolation = Percolation::run(settings.size, settings.probability, &mut rng)?;
        let stats = ClusterStats::from_percolation(&percolation);

        Ok(Self {
            settings,
            percolation,
            stats,
            presets,
            focus: Focus::default(),
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            config_path: None,
            export_path: PathBuf::from("percolation.png"),
            cell_px: 12,
            message: None,
            rng,
        })
    }

    /// Discard the current lattice and build a new one from the settings
    pub fn regenerate(&mut self) {
        match Percolation::run(self.settings.size, self.settings.probability, &mut self.rng) {
            Ok(percolation) => {
                self.stats = ClusterStats::from_percolation(&percolation);
                self.percolation = percolation;
                tracing::debug!(
                    size = self.settings.size,
                    probability = self.settings.probability,
                    clusters = self.percolation.cluster_count,
                    "regenerated lattice"
                );
            }
            Err(err) => {
                // Settings are clamped before they get here
                tracing::error!(%err, "regeneration failed");
                self.message = Some(err.to_string());
            }
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::Controls => {}
            Focus::Size => self.adjust_size(1),
            Focus::Probability => self.adjust_probability(PROBABILITY_STEP),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::Controls => {}
            Focus::Size => self.adjust_size(-1),
            Focus::Probability => self.adjust_probability(-PROBABILITY_STEP),
        }
    }

    /// Change size and regenerate if it actually moved
    pub fn adjust_size(&mut self, delta: i64) {
        let before = self.settings.size;
        self.settings.adjust_size(delta);
        if self.settings.size != before {
            self.regenerate();
        }
    }

    /// Change probability and regenerate if it actually moved
    pub fn adjust_probability(&mut self, delta: f64) {
        let before = self.settings.probability;
        self.settings.adjust_probability(delta);
        if self.settings.probability != before {
            self.regenerate();
        }
    }

    /// Apply a preset's size and probability
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.settings.size = preset.size;
        self.settings.probability = preset.probability;
        self.message = Some(format!("Preset: {}", preset.name));
        self.regenerate();
    }

    /// Apply a built-in preset by hotkey slot (1-5)
    pub fn apply_preset_slot(&mut self, slot: usize) {
        if let Some(preset) = self.presets.slot(slot).cloned() {
            self.apply_preset(&preset);
        }
    }

    /// Export the current lattice as an image
    pub fn export_image(&mut self) {
        let result = export::export_png(&self.percolation.grid, self.cell_px, &self.export_path);
        self.message = Some(match result {
            Ok(()) => format!("Saved {}", self.export_path.display()),
            Err(err) => format!("Export failed: {}", err),
        });
    }

    /// Write current settings to the config file
    pub fn save_config(&mut self) {
        let result = match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => AppConfig::default_path(),
        }
        .and_then(|path| {
            AppConfig::new(self.settings.clone()).save_to_file(&path)?;
            Ok(path)
        });
        self.message = Some(match result {
            Ok(path) => format!("Saved {}", path.display()),
            Err(err) => format!("Save failed: {}", err),
        });
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }
}
