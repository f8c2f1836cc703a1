//! Fixed-width task progress bar.

/// Bar width in characters, between the brackets
pub const BAR_WIDTH: usize = 70;

/// Progress as a percentage in [0, 100].
///
/// Tasks report a fraction; values above 1 are taken as percentages already.
pub fn percent(progress: f64) -> f64 {
    let scaled = if progress > 1.0 { progress } else { progress * 100.0 };
    scaled.clamp(0.0, 100.0)
}

/// Render ` [=====>      ]  42% `
///
/// At exactly 100% the bar is full and carries no `>` cursor.
pub fn render(progress: f64) -> String {
    let pct = percent(progress);
    let cursor = if pct == 100.0 { "" } else { ">" };
    let filled = (BAR_WIDTH as f64 * (pct / 100.0)) as usize;
    let content = format!("{}{}", "=".repeat(filled), cursor);
    format!(" [{:<width$}] {:>3}% ", content, pct as u32, width = BAR_WIDTH)
}
