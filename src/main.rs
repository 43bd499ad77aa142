use std::fs::OpenOptions;
use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use ratatui_image::picker::Picker;

use gradscope::persistence;
use gradscope::persistence::config::{config_path, load_config, Config};
use gradscope::tui::app::App;
use gradscope::tui::event::poll_event;

fn init_logging() -> anyhow::Result<()> {
    let dir = persistence::data_dir().unwrap_or_else(std::env::temp_dir);
    let log_path = dir.join("gradscope.log");
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .with_context(|| format!("cannot open log file {}", log_path.display()))?;

    // The terminal belongs to the UI, so everything goes to the file.
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("GRADSCOPE_LOG", "info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("starting gradscope {}", env!("CARGO_PKG_VERSION"));

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("{}", panic_info);
        default_hook(panic_info);
    }));

    let config = load_config();

    // Query terminal for image protocol support BEFORE entering alternate screen
    let picker = Picker::from_query_stdio().ok();
    if picker.is_none() {
        info!("no terminal graphics protocol detected; plots are export-only");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config, picker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!("{:#}", err);
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    picker: Option<Picker>,
) -> anyhow::Result<()> {
    let mut app = App::new(config, config_path(), picker);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Some(event) = poll_event(Duration::from_millis(50)) {
            app.dispatch(event, Instant::now());
        }

        if app.should_quit {
            break;
        }
    }

    info!("bye");
    Ok(())
}
