use std::collections::{HashMap, HashSet};
use std::io;
use std::io::Stdout;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::error::Result;
use crate::filter::filter_indices;
use crate::generation::generation_options;
use crate::models::{EvolutionEntry, SpeciesBasic, SpeciesFull, SpeciesPage};
use crate::pagination::{PageRequest, PagedList};
use crate::search::{Debouncer, RequestTokens};
use crate::utils::{
    contrast_on, cycle_option, format_generation, format_name, stat_abbrev, type_color,
    SpriteThumb, TYPE_OPTIONS,
};

/// Rows from the end of the loaded list at which the next page is requested.
const PREFETCH_ROWS: usize = 5;

/// Work the UI wants done off the render loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Page {
        epoch: u64,
        page: PageRequest,
        gen_filter: String,
    },
    Search {
        token: u64,
        query: String,
    },
    Detail {
        token: u64,
        id_or_name: String,
    },
    Sprite {
        id: u32,
        url: String,
    },
}

/// Completed background work, fed back through [`App::apply`].
#[derive(Debug)]
pub enum AppEvent {
    Page {
        epoch: u64,
        limit: u32,
        result: Result<SpeciesPage>,
    },
    Search {
        token: u64,
        result: Result<Vec<EvolutionEntry>>,
    },
    Detail {
        token: u64,
        result: Result<SpeciesFull>,
    },
    Sprite {
        id: u32,
        result: Result<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailPane {
    Empty,
    Loading(String),
    Loaded(Box<SpeciesFull>),
    Failed(String),
}

pub enum KeyOutcome {
    Continue(Vec<Request>),
    Quit,
}

pub struct App {
    pub list: PagedList,
    /// Bumped whenever the list is reset; pages from older epochs are dropped.
    pub list_epoch: u64,
    pub total: Option<u32>,
    pub visible: Vec<usize>, // indices into list.items()
    pub selected_visible: usize,
    pub search_mode: bool,
    pub search_input: String,
    pub debouncer: Debouncer,
    pub type_filter: String,
    pub gen_filter: String,
    pub search_results: Vec<EvolutionEntry>,
    pub search_loading: bool,
    /// Last search failure; kept apart from `error` so it never blocks list paging.
    pub search_error: Option<String>,
    pub selected_result: usize,
    pub focus: Focus,
    pub search_tokens: RequestTokens,
    pub detail_tokens: RequestTokens,
    pub detail: DetailPane,
    pub error: Option<String>,
    pub show_sprites: bool,
    pub show_help: bool,
    pub sprite_cache: HashMap<u32, SpriteThumb>,
    sprites_requested: HashSet<u32>,
}

impl App {
    pub fn new(page_size: u32, debounce: Duration) -> Self {
        Self {
            list: PagedList::new(page_size),
            list_epoch: 0,
            total: None,
            visible: Vec::new(),
            selected_visible: 0,
            search_mode: false,
            search_input: String::new(),
            debouncer: Debouncer::new(debounce),
            type_filter: String::new(),
            gen_filter: String::new(),
            search_results: Vec::new(),
            search_loading: false,
            search_error: None,
            selected_result: 0,
            focus: Focus::List,
            search_tokens: RequestTokens::default(),
            detail_tokens: RequestTokens::default(),
            detail: DetailPane::Empty,
            error: None,
            show_sprites: true,
            show_help: false,
            sprite_cache: HashMap::new(),
            sprites_requested: HashSet::new(),
        }
    }

    pub fn query(&self) -> &str {
        self.debouncer.applied()
    }

    pub fn selected_species(&self) -> Option<&SpeciesBasic> {
        self.visible
            .get(self.selected_visible)
            .and_then(|&i| self.list.items().get(i))
    }

    pub fn request_next_page(&mut self) -> Option<Request> {
        let page = self.list.begin_fetch()?;
        Some(Request::Page {
            epoch: self.list_epoch,
            page,
            gen_filter: self.gen_filter.clone(),
        })
    }

    /// Drops everything loaded and starts over from offset 0.
    pub fn reset_list(&mut self) -> Option<Request> {
        self.list = PagedList::new(self.list.page_size());
        self.list_epoch += 1;
        self.total = None;
        self.error = None;
        self.apply_filter();
        self.request_next_page()
    }

    pub fn apply_filter(&mut self) {
        self.visible = filter_indices(
            self.list.items(),
            self.debouncer.applied(),
            &self.type_filter,
            &self.gen_filter,
        );

        if self.visible.is_empty() {
            self.selected_visible = 0;
        } else if self.selected_visible >= self.visible.len() {
            self.selected_visible = self.visible.len() - 1;
        }
    }

    pub fn next(&mut self) -> Option<Request> {
        match self.focus {
            Focus::List => {
                if !self.visible.is_empty() {
                    self.selected_visible = (self.selected_visible + 1).min(self.visible.len() - 1);
                }
                if self.selected_visible + PREFETCH_ROWS >= self.visible.len() {
                    return self.request_next_page();
                }
            }
            Focus::Results => {
                if !self.search_results.is_empty() {
                    self.selected_result = (self.selected_result + 1) % self.search_results.len();
                }
            }
        }
        None
    }

    pub fn previous(&mut self) {
        match self.focus {
            Focus::List => self.selected_visible = self.selected_visible.saturating_sub(1),
            Focus::Results => {
                if !self.search_results.is_empty() {
                    if self.selected_result == 0 {
                        self.selected_result = self.search_results.len() - 1;
                    } else {
                        self.selected_result -= 1;
                    }
                }
            }
        }
    }

    pub fn open_selected(&mut self) -> Option<Request> {
        let (id_or_name, label) = match self.focus {
            Focus::List => {
                let p = self.selected_species()?;
                (p.id.to_string(), p.name.clone())
            }
            Focus::Results => {
                let e = self.search_results.get(self.selected_result)?;
                let key = if e.id > 0 { e.id.to_string() } else { e.name.clone() };
                (key, e.name.clone())
            }
        };
        let token = self.detail_tokens.issue();
        self.detail = DetailPane::Loading(label);
        Some(Request::Detail { token, id_or_name })
    }

    /// Called with each newly applied (debounced) query.
    fn apply_query(&mut self, query: String) -> Vec<Request> {
        self.apply_filter();
        self.selected_result = 0;
        // A fresh token also invalidates a search still in flight.
        let token = self.search_tokens.issue();
        self.search_error = None;
        if query.trim().is_empty() {
            self.search_results.clear();
            self.search_loading = false;
            self.focus = Focus::List;
            return Vec::new();
        }
        self.search_loading = true;
        vec![Request::Search { token, query }]
    }

    /// Housekeeping run every loop iteration.
    pub fn tick(&mut self, now: Instant) -> Vec<Request> {
        let mut out = Vec::new();
        if let Some(query) = self.debouncer.poll(now) {
            out.extend(self.apply_query(query));
        }
        if self.list.is_empty() && self.error.is_none() {
            out.extend(self.request_next_page());
        }
        out
    }

    pub fn on_key(&mut self, key: KeyCode, now: Instant) -> KeyOutcome {
        let mut out = Vec::new();
        if self.search_mode {
            match key {
                KeyCode::Enter => {
                    self.search_mode = false;
                    if let Some(query) = self.debouncer.flush() {
                        out.extend(self.apply_query(query));
                    }
                }
                KeyCode::Esc => self.search_mode = false,
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.debouncer.input(&self.search_input, now);
                }
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                    self.debouncer.input(&self.search_input, now);
                }
                _ => {}
            }
            return KeyOutcome::Continue(out);
        }

        match key {
            KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::F(1) | KeyCode::Char('h') | KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Char('/') => {
                self.search_mode = true;
                self.search_input.clear();
                self.debouncer.input("", now);
            }
            KeyCode::Down | KeyCode::Char('j') => out.extend(self.next()),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Enter => out.extend(self.open_selected()),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::List if !self.search_results.is_empty() => Focus::Results,
                    _ => Focus::List,
                };
            }
            KeyCode::Char('t') => {
                // Type only narrows what is loaded; unlike generation it never refetches.
                self.type_filter = cycle_option(&TYPE_OPTIONS, &self.type_filter);
                self.apply_filter();
            }
            KeyCode::Char('g') => {
                let options: Vec<&str> = generation_options().collect();
                self.gen_filter = cycle_option(&options, &self.gen_filter);
                out.extend(self.reset_list());
            }
            KeyCode::Char('n') => out.extend(self.request_next_page()),
            KeyCode::Char('r') => out.extend(self.reset_list()),
            KeyCode::Char('s') => self.show_sprites = !self.show_sprites,
            _ => {}
        }
        KeyOutcome::Continue(out)
    }

    pub fn apply(&mut self, event: AppEvent) -> Vec<Request> {
        let mut out = Vec::new();
        match event {
            AppEvent::Page { epoch, limit, result } => {
                if epoch != self.list_epoch {
                    debug!(epoch, current = self.list_epoch, "dropping page for reset list");
                    return out;
                }
                match result {
                    Ok(page) => {
                        self.total = Some(page.total);
                        self.list.append_page(page.items, limit);
                        self.error = None;
                        self.apply_filter();
                    }
                    Err(err) => {
                        self.list.fail_fetch();
                        self.error = Some(err.to_string());
                    }
                }
            }
            AppEvent::Search { token, result } => {
                if !self.search_tokens.is_latest(token) {
                    debug!(token, "dropping stale search result");
                    return out;
                }
                self.search_loading = false;
                self.selected_result = 0;
                match result {
                    Ok(results) => {
                        self.search_results = results;
                        self.search_error = None;
                    }
                    Err(err) => {
                        self.search_results.clear();
                        self.search_error = Some(err.to_string());
                    }
                }
                if self.search_results.is_empty() {
                    self.focus = Focus::List;
                }
            }
            AppEvent::Detail { token, result } => {
                if !self.detail_tokens.is_latest(token) {
                    debug!(token, "dropping stale detail");
                    return out;
                }
                match result {
                    Ok(full) => {
                        let id = full.basic.id;
                        if self.sprites_requested.insert(id) {
                            out.push(Request::Sprite {
                                id,
                                url: full.basic.sprite_url.clone(),
                            });
                        }
                        self.detail = DetailPane::Loaded(Box::new(full));
                    }
                    Err(err) => self.detail = DetailPane::Failed(err.to_string()),
                }
            }
            AppEvent::Sprite { id, result } => match result.and_then(|b| SpriteThumb::decode(&b)) {
                Ok(thumb) => {
                    self.sprite_cache.insert(id, thumb);
                }
                Err(err) => {
                    warn!(id, "sprite unavailable: {err}");
                    // allow a later retry
                    self.sprites_requested.remove(&id);
                }
            },
        }
        out
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_w = r.width.saturating_mul(percent_x) / 100;
    let popup_h = r.height.saturating_mul(percent_y) / 100;
    let popup_x = r.x + (r.width.saturating_sub(popup_w) / 2);
    let popup_y = r.y + (r.height.saturating_sub(popup_h) / 2);
    Rect::new(popup_x, popup_y, popup_w, popup_h)
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn type_badges(types: &[String]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, t) in types.iter().enumerate() {
        let bg = type_color(t);
        spans.push(Span::styled(
            format!(" {} ", format_name(t)),
            Style::default().fg(rgb(contrast_on(bg))).bg(rgb(bg)),
        ));
        if i + 1 < types.len() {
            spans.push(Span::raw(" "));
        }
    }
    spans
}

fn list_title(app: &App) -> String {
    let mut title = match app.total {
        Some(total) => format!("Pokémon {}/{}", app.list.len(), total),
        None => "Pokémon".to_string(),
    };
    if !app.type_filter.is_empty() {
        title.push_str(&format!(" · {}", format_name(&app.type_filter)));
    }
    if !app.gen_filter.is_empty() {
        title.push_str(&format!(" · {}", format_generation(&app.gen_filter)));
    }
    title
}

fn draw_list<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let mut items: Vec<ListItem> = app
        .visible
        .iter()
        .filter_map(|&i| app.list.items().get(i))
        .map(|p| {
            ListItem::new(Spans::from(vec![Span::raw(format!(
                "#{:<4} {}",
                p.id,
                format_name(&p.name)
            ))]))
        })
        .collect();

    let footer = if app.list.is_fetching() {
        "Loading…"
    } else if app.list.has_more() {
        "n: load more"
    } else {
        "No more Pokémon"
    };
    items.push(ListItem::new(Spans::from(Span::styled(
        footer,
        Style::default().fg(Color::DarkGray),
    ))));

    let border = if app.focus == Focus::List {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(list_title(app)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.visible.is_empty() {
        state.select(Some(app.selected_visible));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_status<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let line = if let Some(err) = &app.error {
        Spans::from(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red),
        ))
    } else if app.search_mode {
        Spans::from(Span::raw(format!("/{}", app.search_input)))
    } else if !app.query().is_empty() {
        Spans::from(Span::raw(format!("Query: {}  ('/' to edit)", app.query())))
    } else {
        Spans::from(Span::raw("'/' search · t type · g generation · ? help"))
    };
    let para = Paragraph::new(vec![line]).block(Block::default().borders(Borders::ALL).title("Search"));
    f.render_widget(para, area);
}

fn draw_results<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let title = format!("Matches & evolutions for \"{}\"", app.query());
    let border = if app.focus == Focus::Results {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title);

    if app.search_loading {
        f.render_widget(Paragraph::new("Searching…").block(block), area);
        return;
    }
    if let Some(err) = &app.search_error {
        let para = Paragraph::new(Span::styled(
            format!("Search failed: {}", err),
            Style::default().fg(Color::Red),
        ))
        .block(block);
        f.render_widget(para, area);
        return;
    }
    if app.search_results.is_empty() {
        f.render_widget(Paragraph::new("No results").block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .search_results
        .iter()
        .map(|e| {
            let id = if e.id > 0 { format!("#{}", e.id) } else { "#?".to_string() };
            ListItem::new(Spans::from(Span::raw(format!("{:<6} {}", id, format_name(&e.name)))))
        })
        .collect();
    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    if app.focus == Focus::Results {
        state.select(Some(app.selected_result));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_sprite<B: Backend>(f: &mut Frame<B>, app: &App, id: u32, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Sprite");
    if !app.show_sprites {
        f.render_widget(Paragraph::new("(sprites off)").block(block), area);
        return;
    }
    let Some(thumb) = app.sprite_cache.get(&id) else {
        f.render_widget(Paragraph::new("(no sprite)").block(block), area);
        return;
    };

    let w = area.width.saturating_sub(2).clamp(1, 64) as u32;
    let h = area.height.saturating_sub(2).clamp(1, 64) as u32;
    let lines: Vec<Spans> = thumb
        .rows(w, h)
        .into_iter()
        .map(|row| {
            Spans::from(
                row.into_iter()
                    .map(|px| match px {
                        Some(c) => Span::styled(" ", Style::default().bg(rgb(c))),
                        None => Span::raw(" "),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_detail<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let p = match &app.detail {
        DetailPane::Loaded(p) => p,
        DetailPane::Empty => {
            let para = Paragraph::new("Select a Pokémon and press Enter")
                .block(Block::default().borders(Borders::ALL).title("Details"));
            f.render_widget(para, area);
            return;
        }
        DetailPane::Loading(name) => {
            let para = Paragraph::new(format!("Loading {}…", format_name(name)))
                .block(Block::default().borders(Borders::ALL).title("Details"));
            f.render_widget(para, area);
            return;
        }
        DetailPane::Failed(msg) => {
            let para = Paragraph::new(Spans::from(Span::styled(
                msg.clone(),
                Style::default().fg(Color::Red),
            )))
            .block(Block::default().borders(Borders::ALL).title("Details"))
            .wrap(Wrap { trim: true });
            f.render_widget(para, area);
            return;
        }
    };

    let detail_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(6)])
        .split(area);
    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(10)])
        .split(detail_chunks[0]);

    draw_sprite(f, app, p.basic.id, top_chunks[0]);

    let type_names: Vec<String> = p.basic.types.iter().map(|t| t.type_name.clone()).collect();
    let mut type_spans = vec![Span::raw("Types: ")];
    type_spans.extend(type_badges(&type_names));

    let mut info_lines = vec![
        Spans::from(Span::styled(
            format!("{} (#{})", format_name(&p.basic.name), p.basic.id),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(type_spans),
        Spans::from(Span::raw(format!(
            "Generation: {}",
            format_generation(&p.generation_label)
        ))),
        Spans::from(Span::raw(format!("Capture rate: {}", p.capture_rate))),
    ];
    if p.is_legendary {
        info_lines.push(Spans::from(Span::styled(
            "Legendary",
            Style::default().fg(Color::Yellow),
        )));
    }
    if p.is_mythical {
        info_lines.push(Spans::from(Span::styled(
            "Mythical",
            Style::default().fg(Color::Magenta),
        )));
    }
    let info_para = Paragraph::new(info_lines)
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_para, top_chunks[1]);

    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(10)])
        .split(detail_chunks[1]);

    // NAME | VALUE | bar, scaled against the highest possible base stat
    let stats_rect = bottom_chunks[0];
    let inner_w = stats_rect.width.saturating_sub(2) as usize;
    let name_w = 5usize;
    let val_w = 4usize;
    let bar_max_w = inner_w.saturating_sub(name_w + val_w + 2);
    let scale_max = 255.0f32;

    let stat_lines: Vec<Spans> = p
        .stats
        .iter()
        .map(|st| {
            let bar_len = ((st.base_value as f32 / scale_max) * bar_max_w as f32).round() as usize;
            Spans::from(Span::raw(format!(
                "{:<name_w$} {:>val_w$} {}",
                stat_abbrev(&st.stat_name),
                st.base_value,
                "█".repeat(bar_len.min(bar_max_w)),
                name_w = name_w,
                val_w = val_w
            )))
        })
        .collect();
    let stats_para =
        Paragraph::new(stat_lines).block(Block::default().borders(Borders::ALL).title("Stats"));
    f.render_widget(stats_para, stats_rect);

    let evo_lines: Vec<Spans> = p
        .evolutions
        .iter()
        .map(|e| {
            let label = format!("{} {}", if e.is_current { "▶" } else { " " }, format_name(&e.name));
            if e.is_current {
                Spans::from(Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Spans::from(Span::raw(label))
            }
        })
        .collect();
    let evo_para = Paragraph::new(evo_lines)
        .block(Block::default().borders(Borders::ALL).title("Evolution chain"))
        .wrap(Wrap { trim: false });
    f.render_widget(evo_para, bottom_chunks[1]);
}

fn draw_help<B: Backend>(f: &mut Frame<B>) {
    let popup = centered_rect(60, 50, f.size());
    let help_lines: Vec<Spans> = [
        "q          Quit",
        "/          Enter search mode (matches include evolutions)",
        "Enter/Esc  Apply or leave search mode",
        "Up/Down    Navigate; reaching the end loads more",
        "Enter      Open details of the selection",
        "Tab        Switch between list and search results",
        "t          Cycle type filter",
        "g          Cycle generation filter (reloads list)",
        "n          Load next page",
        "r          Reload list",
        "s          Toggle sprites",
        "?          Toggle this help",
    ]
    .iter()
    .map(|l| Spans::from(Span::raw(*l)))
    .collect();

    let mut lines = vec![
        Spans::from(Span::styled(
            "Keybindings",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::raw("")),
    ];
    lines.extend(help_lines);

    let help_para = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, popup);
    f.render_widget(help_para, popup);
}

pub fn draw_ui(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    terminal
        .draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(f.size());

            let left_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)])
                .split(chunks[0]);
            draw_list(f, app, left_chunks[0]);
            draw_status(f, app, left_chunks[1]);

            if app.query().is_empty() {
                draw_detail(f, app, chunks[1]);
            } else {
                let right_chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(8), Constraint::Min(10)])
                    .split(chunks[1]);
                draw_results(f, app, right_chunks[0]);
                draw_detail(f, app, right_chunks[1]);
            }

            if app.show_help {
                draw_help(f);
            }
        })
        .map(|_| ())
}
