mod app;
mod color;
mod config;
mod error;
mod export;
mod lattice;
mod presets;
mod render;
mod settings;
mod ui;

use anyhow::Context;
use app::{App, Focus};
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lattice::{ClusterStats, Percolation};
use presets::{Preset, PresetManager};
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::PercolationSettings;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "site-percolation")]
#[command(about = "Site percolation cluster visualization in the terminal")]
struct Args {
    // === Lattice Parameters ===
    /// Lattice edge length (clamped to 5-50)
    #[arg(short = 'n', long)]
    size: Option<i64>,

    /// Site occupation probability (clamped to 0.0-1.0)
    #[arg(short = 'p', long)]
    probability: Option<f64>,

    /// RNG seed for reproducible lattices
    #[arg(long)]
    seed: Option<u64>,

    /// Start from a named preset (sparse, subcritical, critical, supercritical, dense, or a saved one)
    #[arg(long)]
    preset: Option<String>,

    // === Config/Presets ===
    /// Load settings from this JSON file; `W` in the UI writes back to it
    #[arg(long)]
    config: Option<PathBuf>,

    /// List available presets and exit
    #[arg(long = "list-presets")]
    list_presets: bool,

    /// Save the resolved size and probability as a user preset and exit
    #[arg(long = "save-preset", value_name = "NAME")]
    save_preset: Option<String>,

    /// Delete a user preset and exit
    #[arg(long = "delete-preset", value_name = "NAME")]
    delete_preset: Option<String>,

    // === Headless Output ===
    /// Print one labeled lattice to stdout instead of starting the UI
    #[arg(long)]
    print: bool,

    /// Write one labeled lattice as a PNG and exit
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Write an animated GIF sweeping probability from 0 to 1 and exit
    #[arg(long, value_name = "PATH")]
    sweep: Option<PathBuf>,

    /// Number of frames in the sweep (2-101)
    #[arg(long, default_value = "21")]
    frames: usize,

    /// Pixels per site in exported images (1-32)
    #[arg(long = "cell-px", default_value = "12")]
    cell_px: u32,

    /// Append logs to this file (the UI owns the terminal otherwise)
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Any output flag runs once without the UI
    fn is_headless(&self) -> bool {
        self.print
            || self.export.is_some()
            || self.sweep.is_some()
            || self.list_presets
            || self.save_preset.is_some()
            || self.delete_preset.is_some()
    }
}

/// Install the tracing subscriber. Without a log file the UI stays silent and
/// headless runs log to stderr.
fn init_logging(log_file: Option<&Path>, headless: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("site_percolation=info"));

    match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if headless => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Merge config file, preset and CLI flags, in that order of precedence (lowest first)
fn resolve_settings(args: &Args, presets: &PresetManager) -> anyhow::Result<PercolationSettings> {
    let mut settings = match &args.config {
        Some(path) if path.exists() => {
            AppConfig::load_from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?
                .settings
        }
        _ => PercolationSettings::default(),
    };

    if let Some(name) = &args.preset {
        let preset = presets
            .find(name)
            .with_context(|| format!("available presets: {}", presets.preset_names().join(", ")))?;
        settings.size = preset.size;
        settings.probability = preset.probability;
    }

    Ok(PercolationSettings::clamped(
        args.size.unwrap_or(settings.size as i64),
        args.probability.unwrap_or(settings.probability),
        args.seed.or(settings.seed),
    ))
}

/// Text rendering: `.` for empty sites, cluster id otherwise
fn format_lattice(percolation: &Percolation) -> String {
    let width = percolation.cluster_count.to_string().len();
    let mut lines: Vec<String> = percolation
        .grid
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.occupied {
                        format!("{:>width$}", cell.cluster)
                    } else {
                        format!("{:>width$}", ".")
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let stats = ClusterStats::from_percolation(percolation);
    lines.push(format!("Number of Clusters: {}", percolation.cluster_count));
    lines.push(format!(
        "Occupied: {}  Largest: {}  Spanning: {}",
        stats.occupied,
        stats.largest,
        if stats.spans { "yes" } else { "no" }
    ));
    let top: Vec<String> = stats.top_sizes(5).iter().map(|s| s.to_string()).collect();
    if !top.is_empty() {
        lines.push(format!("Largest clusters: {}", top.join(", ")));
    }
    lines.join("\n")
}

fn run_headless(
    args: &Args,
    settings: &PercolationSettings,
    presets: &mut PresetManager,
) -> anyhow::Result<()> {
    if args.list_presets {
        for preset in presets.all_presets() {
            println!(
                "{:<16} {:>2}x{:<2} p={:.4}  {}",
                preset.name, preset.size, preset.size, preset.probability, preset.description
            );
        }
        return Ok(());
    }

    if let Some(name) = &args.delete_preset {
        presets.delete_preset(name)?;
        println!("Deleted preset {}", name);
        return Ok(());
    }

    if let Some(name) = &args.save_preset {
        presets.save_preset(Preset::new(
            name.clone(),
            "",
            settings.size,
            settings.probability,
        ))?;
        println!("Saved preset {}", name);
        return Ok(());
    }

    let cell_px = args.cell_px.clamp(1, 32);
    let mut rng = settings.rng();

    if let Some(path) = &args.sweep {
        let frames = args.frames.clamp(2, 101);
        let counts = export::export_sweep_gif(settings.size, frames, cell_px, &mut rng, path)
            .with_context(|| format!("writing sweep {}", path.display()))?;
        for (probability, count) in export::sweep_probabilities(frames).iter().zip(&counts) {
            println!("p={:.3} clusters={}", probability, count);
        }
    }

    if args.print || args.export.is_some() {
        let percolation = Percolation::run(settings.size, settings.probability, &mut rng)?;
        tracing::info!(
            size = settings.size,
            probability = settings.probability,
            clusters = percolation.cluster_count,
            "generated lattice"
        );
        if args.print {
            println!("{}", format_lattice(&percolation));
        }
        if let Some(path) = &args.export {
            export::export_png(&percolation.grid, cell_px, path)
                .with_context(|| format!("writing image {}", path.display()))?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let headless = args.is_headless();
    init_logging(args.log_file.as_deref(), headless)?;

    let mut presets = PresetManager::new();
    let settings = resolve_settings(&args, &presets)?;
    tracing::info!(
        size = settings.size,
        probability = settings.probability,
        seed = ?settings.seed,
        "starting"
    );

    if headless {
        return run_headless(&args, &settings, &mut presets);
    }

    let mut app = App::new(settings, presets)?;
    app.config_path = args.config.clone();
    app.cell_px = args.cell_px.clamp(1, 32);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(%err, "ui loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    // Nothing animates, so redraw on input only
    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            // Resize and others just trigger a redraw
            continue;
        };

        if key.kind != KeyEventKind::Press {
            continue;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
            KeyCode::Char('r') | KeyCode::Char('R') => app.regenerate(),
            KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_fullscreen(),
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => app.toggle_help(),
            KeyCode::Char('e') | KeyCode::Char('E') => app.export_image(),
            KeyCode::Char('w') | KeyCode::Char('W') => app.save_config(),
            KeyCode::Char(c @ '1'..='5') => app.apply_preset_slot(c as usize - '0' as usize),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                app.adjust_probability(0.01);
                app.focus = Focus::Probability;
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                app.adjust_probability(-0.01);
                app.focus = Focus::Probability;
            }
            KeyCode::Char(']') => {
                app.adjust_size(1);
                app.focus = Focus::Size;
            }
            KeyCode::Char('[') => {
                app.adjust_size(-1);
                app.focus = Focus::Size;
            }

            // Navigation
            KeyCode::Tab => app.next_focus(),
            KeyCode::BackTab => app.prev_focus(),
            KeyCode::Up => {
                if !app.show_help {
                    if app.focus.is_param() {
                        app.adjust_focused_up();
                    } else {
                        app.scroll_controls_up();
                    }
                }
            }
            KeyCode::Down => {
                if !app.show_help {
                    if app.focus.is_param() {
                        app.adjust_focused_down();
                    } else {
                        let term_size = terminal.size().unwrap_or_default();
                        let visible = ui::get_controls_visible_lines(term_size.height);
                        app.scroll_controls_down(ui::CONTROLS_CONTENT_LINES.saturating_sub(visible));
                    }
                }
            }
            KeyCode::Esc => {
                if app.show_help {
                    app.toggle_help();
                } else if app.focus.is_param() {
                    app.focus = Focus::Controls;
                }
            }
            KeyCode::Char('j') | KeyCode::Char('J') => {
                if app.show_help {
                    app.scroll_help_down(ui::HELP_CONTENT_LINES);
                }
            }
            KeyCode::Char('k') | KeyCode::Char('K') => {
                if app.show_help {
                    app.scroll_help_up();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(flags: &[&str]) -> Args {
        let argv = std::iter::once("site-percolation").chain(flags.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_flags() {
        let args = parse(&[]);
        let settings = resolve_settings(&args, &PresetManager::with_dir(None)).unwrap();
        assert_eq!(settings, PercolationSettings::default());
        assert!(!args.is_headless());
    }

    #[test]
    fn test_config_then_preset_then_flags() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        let stored = PercolationSettings {
            size: 12,
            probability: 0.3,
            seed: Some(4),
        };
        AppConfig::new(stored.clone()).save_to_file(&config_path).unwrap();
        let config = config_path.to_str().unwrap();
        let presets = PresetManager::with_dir(None);

        let settings = resolve_settings(&parse(&["--config", config]), &presets).unwrap();
        assert_eq!(settings, stored);

        let settings =
            resolve_settings(&parse(&["--config", config, "--preset", "dense"]), &presets).unwrap();
        assert_eq!(settings.size, 30);
        assert_eq!(settings.probability, 0.85);
        assert_eq!(settings.seed, Some(4));

        let args = parse(&["--config", config, "--preset", "dense", "--size", "9"]);
        let settings = resolve_settings(&args, &presets).unwrap();
        assert_eq!(settings.size, 9);
        assert_eq!(settings.probability, 0.85);
        assert_eq!(settings.seed, Some(4));
    }

    #[test]
    fn test_flags_are_clamped() {
        let presets = PresetManager::with_dir(None);
        let settings =
            resolve_settings(&parse(&["--size=200", "--probability=2.5"]), &presets).unwrap();
        assert_eq!(settings.size, 50);
        assert_eq!(settings.probability, 1.0);

        let settings = resolve_settings(&parse(&["-n", "1"]), &presets).unwrap();
        assert_eq!(settings.size, 5);
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        let args = parse(&["--preset", "nope"]);
        assert!(resolve_settings(&args, &PresetManager::with_dir(None)).is_err());
    }

    #[test]
    fn test_output_flags_are_headless() {
        for flags in [
            &["--print"][..],
            &["--export", "out.png"][..],
            &["--sweep", "out.gif"][..],
            &["--list-presets"][..],
            &["--save-preset", "mine"][..],
            &["--delete-preset", "mine"][..],
        ] {
            assert!(parse(flags).is_headless(), "{:?}", flags);
        }
        assert!(!parse(&["--seed", "3"]).is_headless());
    }

    #[test]
    fn test_full_lattice_prints_one_cluster() {
        let args = parse(&["--print", "--size", "5", "--probability", "1", "--seed", "7"]);
        let settings = resolve_settings(&args, &PresetManager::with_dir(None)).unwrap();
        let percolation =
            Percolation::run(settings.size, settings.probability, &mut settings.rng()).unwrap();

        let text = format_lattice(&percolation);
        let lines: Vec<&str> = text.lines().collect();
        for row in &lines[..5] {
            assert_eq!(*row, "1 1 1 1 1");
        }
        assert_eq!(lines[5], "Number of Clusters: 1");
        assert!(text.contains("Spanning: yes"));
        assert!(text.contains("Largest clusters: 25"));
    }

    #[test]
    fn test_empty_lattice_prints_dots() {
        let mut rng = PercolationSettings::default().rng();
        let percolation = Percolation::run(5, 0.0, &mut rng).unwrap();

        let text = format_lattice(&percolation);
        assert!(text.lines().take(5).all(|row| row == ". . . . ."));
        assert!(text.contains("Number of Clusters: 0"));
        assert!(text.contains("Spanning: no"));
        assert!(!text.contains("Largest clusters"));
    }

    #[test]
    fn test_headless_exports_and_preset_commands() {
        let dir = TempDir::new().unwrap();
        let png = dir.path().join("lattice.png");
        let mut presets = PresetManager::with_dir(Some(dir.path().join("presets")));

        let args = parse(&["--export", png.to_str().unwrap(), "--seed", "2"]);
        let settings = resolve_settings(&args, &presets).unwrap();
        run_headless(&args, &settings, &mut presets).unwrap();
        assert!(png.exists());

        let args = parse(&["--save-preset", "mine", "-n", "7", "-p", "0.4"]);
        let settings = resolve_settings(&args, &presets).unwrap();
        run_headless(&args, &settings, &mut presets).unwrap();
        assert_eq!(presets.find("mine").unwrap().size, 7);

        let args = parse(&["--delete-preset", "mine"]);
        run_headless(&args, &settings, &mut presets).unwrap();
        assert!(presets.find("mine").is_err());
        assert!(run_headless(&args, &settings, &mut presets).is_err());

        let args = parse(&["--save-preset", "Critical"]);
        assert!(run_headless(&args, &settings, &mut presets).is_err());
    }
}
