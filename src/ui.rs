use crate::app::{App, Focus};
use crate::render;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

/// Number of lines in controls content
pub const CONTROLS_CONTENT_LINES: u16 = 11;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Number of controls lines visible for a given terminal height
pub fn get_controls_visible_lines(terminal_height: u16) -> u16 {
    // Status (7) + Parameters (5) + controls borders (2)
    terminal_height.saturating_sub(7 + 5 + 2)
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Status
            Constraint::Length(5), // Parameters
            Constraint::Min(5),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Percolation ");
    let stats = &app.stats;
    let total = app.percolation.grid.size().pow(2).max(1);

    let (span_text, span_color) = if stats.spans {
        ("SPANNING", Color::Green)
    } else {
        ("NOT SPANNING", DIM_TEXT_COLOR)
    };

    let mut content = vec![
        Line::from(Span::styled(
            format!("Clusters: {}", app.percolation.cluster_count),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!(
                "Occupied: {} ({:.0}%)",
                stats.occupied,
                stats.occupied as f64 * 100.0 / total as f64
            ),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("Largest: {}", stats.largest),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        Line::from(Span::styled(span_text, Style::default().fg(span_color))),
    ];

    if let Some(message) = &app.message {
        content.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(HIGHLIGHT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");

    let make_line = |label: &str, value: String, focused: bool| {
        let prefix = if focused { "> " } else { "  " };
        let style = if focused {
            Style::default().fg(HIGHLIGHT_COLOR)
        } else {
            Style::default().fg(TEXT_COLOR)
        };
        Line::from(Span::styled(format!("{}{}: {}", prefix, label, value), style))
    };

    let settings = &app.settings;
    let seed = settings
        .seed
        .map(|s| s.to_string())
        .unwrap_or_else(|| "random".to_string());

    let content = vec![
        make_line("Size", format!("{}", settings.size), app.focus == Focus::Size),
        make_line(
            "Prob",
            format!("{:.2}", settings.probability),
            app.focus == Focus::Probability,
        ),
        Line::from(Span::styled(
            format!("  Seed: {}", seed),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    let make_control = |key: &str, desc: &str| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("R", "regenerate"),
        make_control("Tab", "select param"),
        make_control("↑/↓", "adjust param"),
        make_control("+/-", "probability"),
        make_control("[/]", "size"),
        make_control("1-5", "presets"),
        make_control("E", "export image"),
        make_control("W", "write config"),
        make_control("V", "fullscreen"),
        make_control("H", "help"),
        make_control("Q", "quit"),
    ];

    let content_height = content.len() as u16;
    let visible_height = area.height.saturating_sub(2); // minus borders
    let is_scrollable = content_height > visible_height;

    let title = if is_scrollable {
        " Controls (↑↓) "
    } else {
        " Controls "
    };

    let block = styled_block(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .scroll((app.controls_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block("");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = render::render_to_blocks(&app.percolation.grid, inner.width, inner.height);

    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;

        if x < inner.x + inner.width && y < inner.y + inner.height {
            let cell_rect = Rect {
                x,
                y,
                width: 1,
                height: 1,
            };
            let span = Span::styled(
                cell.char.to_string(),
                Style::default().fg(cell.fg).bg(cell.bg),
            );
            frame.render_widget(Paragraph::new(Line::from(span)), cell_rect);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Centre over the canvas (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    frame.render_widget(Clear, help_area);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled("SITE PERCOLATION", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Each site is occupied independently with probability p. Occupied sites that share an edge belong to the same cluster; every cluster gets its own color."),
        Line::from(""),
        Line::from("Near p = 0.5927 a cluster first spans the whole lattice."),
        Line::from(""),
        Line::from(Span::styled("PRESETS (1-5):", Style::default().fg(HIGHLIGHT_COLOR))),
    ];

    for (i, preset) in app.presets.builtin.iter().enumerate() {
        content.push(Line::from(format!(
            "{}={} (p={:.2}, {}x{})",
            i + 1,
            preset.name,
            preset.probability,
            preset.size,
            preset.size
        )));
    }

    content.extend([
        Line::from(""),
        Line::from(Span::styled("CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("R=Regenerate, Tab/Arrows=Adjust, +/-=Probability, [/]=Size, E=Export PNG, W=Write config, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ]);

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2);
    let is_scrollable = content_height > visible_height;

    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}
