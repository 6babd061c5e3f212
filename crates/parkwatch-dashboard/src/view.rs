//! Rendering targets for the dashboard loops.

use colored::Colorize;
use parkwatch_types::{OccupancyState, ParkError};
use tracing::warn;

/// Shown in place of the movement label before the first report.
pub const MOVEMENT_PLACEHOLDER: &str = "—";

const BAR_WIDTH: usize = 30;

/// Something that can display the occupancy snapshot.
pub trait DashboardView {
    /// Show `state`, replacing whatever was displayed before.
    fn render(&mut self, state: &OccupancyState);

    /// Called when a tick failed.  The view must keep its previous content.
    fn report_error(&mut self, err: &ParkError) {
        warn!(error = %err, "dashboard update failed");
    }
}

// ---------------------------------------------------------------------------
// TerminalView
// ---------------------------------------------------------------------------

/// Prints one line per update: movement label, free-space count and a
/// horizontal bar scaled to the lot capacity.
#[derive(Debug, Clone)]
pub struct TerminalView {
    capacity: u32,
    last_line: Option<String>,
}

impl TerminalView {
    /// `capacity` is the number of spaces that fills the bar.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            last_line: None,
        }
    }

    /// The most recently rendered line, without colors.
    pub fn last_line(&self) -> Option<&str> {
        self.last_line.as_deref()
    }

    /// Plain-text rendering of `state`.
    pub fn format_line(&self, state: &OccupancyState) -> String {
        format!(
            "{:<12} {:>4} libres  [{}]",
            state.movement_or(MOVEMENT_PLACEHOLDER),
            state.available_spaces,
            bar(state.available_spaces, self.capacity, BAR_WIDTH)
        )
    }
}

impl DashboardView for TerminalView {
    fn render(&mut self, state: &OccupancyState) {
        let line = self.format_line(state);
        if state.available_spaces == 0 {
            println!("{}", line.red().bold());
        } else {
            println!("{}", line.green());
        }
        self.last_line = Some(line);
    }

    fn report_error(&mut self, err: &ParkError) {
        warn!(error = %err, "dashboard update failed");
        eprintln!("{}", format!("  sin conexión: {err}").yellow());
    }
}

/// Horizontal bar of `width` cells with `value / capacity` of them filled.
///
/// A value above capacity fills the bar; a zero capacity scales to the value
/// itself.
pub fn bar(value: u32, capacity: u32, width: usize) -> String {
    let capacity = if capacity == 0 { value.max(1) } else { capacity };
    let filled = ((u64::from(value.min(capacity)) * width as u64) / u64::from(capacity)) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
