use crate::color::site_color;
use crate::lattice::Grid;
use ratatui::style::Color;

/// Upper half block: foreground paints the top site, background the bottom one.
/// Each terminal cell shows one column and two rows of the lattice, which
/// keeps sites roughly square.
pub const HALF_BLOCK: char = '▀';

/// A single rendered terminal cell with position and colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub fg: Color,
    pub bg: Color,
}

/// Terminal footprint (columns, rows) of a lattice
pub fn footprint(grid_size: usize) -> (u16, u16) {
    let cols = grid_size.min(u16::MAX as usize) as u16;
    let rows = grid_size.div_ceil(2).min(u16::MAX as usize) as u16;
    (cols, rows)
}

/// Render the lattice to half-block cells, centred in the canvas.
/// Sites that do not fit are clipped.
pub fn render_to_blocks(grid: &Grid, canvas_width: u16, canvas_height: u16) -> Vec<BlockCell> {
    let size = grid.size();
    let (cols, rows) = footprint(size);
    let offset_x = canvas_width.saturating_sub(cols) / 2;
    let offset_y = canvas_height.saturating_sub(rows) / 2;

    let visible_cols = cols.min(canvas_width);
    let visible_rows = rows.min(canvas_height);

    let mut cells = Vec::with_capacity(visible_cols as usize * visible_rows as usize);

    for ty in 0..visible_rows {
        let top_row = ty as usize * 2;
        let bottom_row = top_row + 1;

        for tx in 0..visible_cols {
            let col = tx as usize;
            let fg = grid
                .get(top_row, col)
                .map(|c| site_color(c.occupied, c.cluster))
                .unwrap_or(Color::Reset);
            // Odd sizes leave the last terminal row with only a top half
            let bg = grid
                .get(bottom_row, col)
                .map(|c| site_color(c.occupied, c.cluster))
                .unwrap_or(Color::Reset);

            cells.push(BlockCell {
                x: offset_x + tx,
                y: offset_y + ty,
                char: HALF_BLOCK,
                fg,
                bg,
            });
        }
    }

    cells
}
