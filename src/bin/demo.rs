// rmh-demo - renders a sample conversation with every built-in component
// plus a registered custom "video" component, into a scrollable TUI.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use serde::Deserialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rich_message_history::{
    ComponentRegistry, Figure, FigureEcosystem, MessageHistory, Options, RenderError, Series,
    TableData, Theme, TuiHost, Value,
};

#[derive(Parser, Debug)]
#[command(name = "rmh-demo", about = "Rich message history showcase", version)]
struct Cli {
    /// Theme name (auto, dracula, nord)
    #[arg(long)]
    theme: Option<String>,

    /// Path to a TOML config file (default: ~/.config/rmh-demo/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    theme: String,
    log_file: Option<PathBuf>,
}

impl Config {
    fn load(path: Option<&PathBuf>) -> Self {
        let path = match path {
            Some(p) => p.clone(),
            None => match dirs::config_dir() {
                Some(dir) => dir.join("rmh-demo").join("config.toml"),
                None => return Self::default(),
            },
        };
        match fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Warning: bad config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

fn init_logging(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "rich_message_history=debug".into());

    // Logs must go to a file: stdout belongs to the TUI.
    if let Some(log_file) = &config.log_file {
        let dir = log_file.parent().unwrap_or_else(|| std::path::Path::new("."));
        let prefix = log_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "rmh-demo.log".to_string());
        if fs::create_dir_all(dir).is_ok() {
            let appender = tracing_appender::rolling::never(dir, prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
            return Some(guard);
        }
    }
    None
}

/// Register a "video" component with its renderer and a message method,
/// then build a conversation exercising every builder.
fn build_history() -> Result<MessageHistory> {
    let video = ComponentRegistry::register_component_type("video")
        .context("registering video type")?;
    ComponentRegistry::register_renderer(video.clone(), |content, options, host| {
        let url = content.as_str().ok_or_else(|| {
            RenderError::msg(format!("video needs a URL, got {}", content.type_name()))
        })?;
        let caption = options
            .get_str("caption")
            .map(|c| format!(" ({})", c))
            .unwrap_or_default();
        host.markup(&format!("▶ video: {}{}", url, caption));
        Ok(())
    });
    MessageHistory::register_component_method("add_video", video);

    let mut history = MessageHistory::new();

    history.add_user_message_create("👤", "Show me the **quarterly report**, please.");

    let report = history.add_assistant_message_create("🤖");
    report
        .add_text("Here is everything we have for **Q3**:")
        .add_metric("98.4%", Some("Forecast accuracy"), Some("+1.2"))
        .add_table(TableData::new(
            ["Region", "Revenue", "Change"],
            vec![
                vec!["EMEA".into(), "1.2M".into(), "+4%".into()],
                vec!["APAC".into(), "0.9M".into(), "+11%".into()],
                vec!["AMER".into(), "2.1M".into(), "-2%".into()],
            ],
        ))
        .add_series(Series::new(
            "Monthly revenue",
            vec![
                ("Jul".into(), 1.31),
                ("Aug".into(), 1.38),
                ("Sep".into(), 1.52),
            ],
        ))
        .add_figure(
            Figure::new(FigureEcosystem::Plotly)
                .with_title("Revenue trend")
                .with_series(
                    "revenue",
                    (0..24).map(|i| (i as f64, (i as f64 * 0.4).sin() + 2.0)).collect(),
                ),
        )
        .add_code(
            "SELECT region, SUM(revenue)\nFROM sales\nGROUP BY region;",
            Some("sql"),
        )
        .add_json(serde_json::json!({
            "quarter": "Q3",
            "finalized": true,
            "regions": ["EMEA", "APAC", "AMER"],
        }))
        .add_dict(vec![
            ("owner".to_string(), Value::text("finance")),
            ("revision".to_string(), Value::number(7.0)),
        ]);
    report
        .call(
            "add_video",
            Value::text("https://example.com/q3-walkthrough.mp4"),
            Options::new().with("caption", "Q3 walkthrough"),
        )
        .context("invoking add_video")?;

    history.add_error_message("⚠️", "Upstream data source timed out; figures may be stale.");

    // A renderer failure shows inline without taking down the transcript.
    let broken = history.add_assistant_message_create("🤖");
    broken.call("add_video", Value::number(42.0), Options::new())?;
    broken.add_text("The transcript keeps rendering after a component fails.");

    Ok(history)
}

fn run_tui(theme: Theme, history: &MessageHistory) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = event_loop(&mut terminal, theme, history);

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    theme: Theme,
    history: &MessageHistory,
) -> Result<()> {
    let mut scroll: u16 = 0;
    let mut rendered_width = 0;
    let mut text = ratatui::text::Text::default();

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            let inner_width = area.width.saturating_sub(4) as usize;
            // Re-render only when the terminal width changes.
            if inner_width != rendered_width {
                let mut host = TuiHost::new(inner_width, theme.clone());
                history.render_all(&mut host);
                text = host.into_text();
                rendered_width = inner_width;
            }

            let max_scroll = (text.lines.len() as u16).saturating_sub(area.height.saturating_sub(2));
            scroll = scroll.min(max_scroll);

            let block = Block::default()
                .title(format!(" rmh-demo · {} ", theme.name))
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(ratatui::style::Style::default().fg(theme.border));
            let paragraph = Paragraph::new(text.clone())
                .block(block)
                .style(
                    ratatui::style::Style::default()
                        .fg(theme.foreground)
                        .bg(theme.background),
                )
                .scroll((scroll, 0));
            frame.render_widget(paragraph, Rect::new(0, 0, area.width, area.height));
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Up | KeyCode::Char('k') => scroll = scroll.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => scroll = scroll.saturating_add(1),
                KeyCode::PageUp => scroll = scroll.saturating_sub(10),
                KeyCode::PageDown => scroll = scroll.saturating_add(10),
                KeyCode::Home => scroll = 0,
                _ => {}
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref());
    let _log_guard = init_logging(&config);

    let theme_name = cli.theme.as_deref().unwrap_or(&config.theme);
    let theme = Theme::by_name(theme_name);

    let history = build_history()?;
    run_tui(theme, &history)
}
