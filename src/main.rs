use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::error::Error;
use std::io::{self, Stdout};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dextui::config::{Command, Config};
use dextui::fetch::{get_detail, list_page, PokeApiClient};
use dextui::search::search;
use dextui::ui::{draw_ui, App, AppEvent, KeyOutcome, Request};

fn init_logging(config: &Config, interactive: bool) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if interactive {
        // the terminal belongs to the UI
        let file = std::fs::File::create(&config.log_file)?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
    Ok(())
}

/// Run one upstream request on the runtime and post its outcome back to the UI.
fn dispatch(
    api: &Arc<PokeApiClient>,
    search_concurrency: usize,
    tx: &UnboundedSender<AppEvent>,
    request: Request,
) {
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match request {
            Request::Page {
                epoch,
                page,
                gen_filter,
            } => {
                let gen = (!gen_filter.is_empty()).then_some(gen_filter.as_str());
                AppEvent::Page {
                    epoch,
                    limit: page.limit,
                    result: list_page(&*api, page.limit, page.offset, gen).await,
                }
            }
            Request::Search { token, query } => AppEvent::Search {
                token,
                result: search(&*api, &query, search_concurrency).await,
            },
            Request::Detail { token, id_or_name } => AppEvent::Detail {
                token,
                result: get_detail(&*api, &id_or_name).await,
            },
            Request::Sprite { id, url } => AppEvent::Sprite {
                id,
                result: api.sprite_bytes(&url).await,
            },
        };
        // the receiver is gone once the UI has quit
        let _ = tx.send(event);
    });
}

async fn run_command(
    api: &PokeApiClient,
    config: &Config,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    let json = match command {
        Command::List { limit, offset, gen } => {
            let limit = limit.unwrap_or(config.page_size);
            serde_json::to_string_pretty(&list_page(api, limit, offset, gen.as_deref()).await?)?
        }
        Command::Detail { id_or_name } => {
            serde_json::to_string_pretty(&get_detail(api, &id_or_name).await?)?
        }
        Command::Search { query } => serde_json::to_string_pretty(
            &search(api, &query, config.search_concurrency).await?,
        )?,
    };
    println!("{}", json);
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    api: &Arc<PokeApiClient>,
    config: &Config,
    tx: &UnboundedSender<AppEvent>,
    rx: &mut UnboundedReceiver<AppEvent>,
) -> Result<(), Box<dyn Error>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        for request in app.tick(Instant::now()) {
            dispatch(api, config.search_concurrency, tx, request);
        }
        // Pick up whatever background work has finished since the last frame.
        while let Ok(event) = rx.try_recv() {
            for request in app.apply(event) {
                dispatch(api, config.search_concurrency, tx, request);
            }
        }

        draw_ui(terminal, app)?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));
        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                match app.on_key(key.code, Instant::now()) {
                    KeyOutcome::Quit => return Ok(()),
                    KeyOutcome::Continue(requests) => {
                        for request in requests {
                            dispatch(api, config.search_concurrency, tx, request);
                        }
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    init_logging(&config, config.command.is_none())?;

    let api = Arc::new(PokeApiClient::new(&config)?);

    if let Some(command) = config.command.clone() {
        return run_command(&api, &config, command).await;
    }

    info!(
        source = ?config.source,
        page_size = config.page_size,
        "starting interactive browser"
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(config.page_size, config.debounce());

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &api, &config, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(LeaveAlternateScreen)?;
    result
}
