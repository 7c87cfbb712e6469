use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle as CanvasCircle, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use ratatui::{Frame, Terminal};

use disball::config::FeedConfig;
use disball::export::export_match;
use disball::feed::spawn_provider;
use disball::figure::{Figure, MarkerFill, Rgb, Shape};
use disball::ratings::{PlayerRating, RatingTier};
use disball::state::{self, AppState, MatchLoad, MatchView, ProviderCommand, Screen, apply_delta};

struct App {
    state: AppState,
    config: FeedConfig,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(config: FeedConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            config,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => match self.state.screen {
                Screen::Fixtures => self.on_fixtures_key(key),
                Screen::Match { .. } => self.on_match_key(key),
            },
        }
    }

    fn on_fixtures_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('d') | KeyCode::Enter => self.open_selected(),
            KeyCode::Char('r') => self.request_fixtures(),
            _ => {}
        }
    }

    fn on_match_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Fixtures,
            KeyCode::Char('r') => {
                if let Some(match_id) = self.state.current_match_id().map(str::to_string) {
                    self.state.views.remove(&match_id);
                    self.request_match(&match_id);
                }
            }
            KeyCode::Char('e') => self.export_current(),
            _ => {}
        }
    }

    fn open_selected(&mut self) {
        let Some(match_id) = self.state.selected_match_id() else {
            self.state.push_log("[INFO] No fixture selected");
            return;
        };
        self.state.screen = Screen::Match {
            match_id: match_id.clone(),
        };
        let cached = matches!(
            self.state.views.get(&match_id),
            Some(MatchLoad::Ready(_)) | Some(MatchLoad::NoData) | Some(MatchLoad::Loading)
        );
        if !cached {
            self.request_match(&match_id);
        }
    }

    fn request_match(&mut self, match_id: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Match fetch unavailable");
            return;
        };
        let cmd = ProviderCommand::FetchMatch {
            match_id: match_id.to_string(),
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Match request failed");
        } else {
            self.state
                .views
                .insert(match_id.to_string(), MatchLoad::Loading);
        }
    }

    fn request_fixtures(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Fixture fetch unavailable");
            return;
        };
        if tx.send(ProviderCommand::FetchFixtures).is_err() {
            self.state.push_log("[WARN] Fixtures request failed");
        } else {
            self.state.fixtures_loading = true;
        }
    }

    fn export_current(&mut self) {
        let Some(match_id) = self.state.current_match_id().map(str::to_string) else {
            return;
        };
        let Some(MatchLoad::Ready(view)) = self.state.views.get(&match_id) else {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        };
        match export_match(&self.config.export_dir, &match_id, view) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} and {} ({} players)",
                report.svg_path.display(),
                report.xlsx_path.display(),
                report.players
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err:#}")),
        }
    }
}

fn main() -> io::Result<()> {
    let config = FeedConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(config, Some(cmd_tx));
    app.request_fixtures();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.state.screen {
        Screen::Fixtures => render_fixtures(frame, chunks[1], &app.state),
        Screen::Match { .. } => render_match(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    match &state.screen {
        Screen::Fixtures => format!("DISBALL | Fixtures ({})", state.choices().len()),
        Screen::Match { match_id } => {
            let label = state
                .fixture_label(match_id)
                .unwrap_or_else(|| format!("Match {match_id}"));
            format!("DISBALL | {label}")
        }
    }
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Fixtures => {
            "j/k/↑/↓ Move | Enter/d Open | r Reload | ? Help | q Quit".to_string()
        }
        Screen::Match { .. } => {
            "b/Esc Back | r Refetch | e Export SVG+XLSX | ? Help | q Quit".to_string()
        }
    }
}

fn render_fixtures(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(5)])
        .split(area);
    let list_area = sections[0];
    let block = Block::default().title("Select a match").borders(Borders::ALL);
    let inner = block.inner(list_area);
    frame.render_widget(block, list_area);

    let choices = state.choices();
    if choices.is_empty() {
        let text = if state.fixtures_loading {
            "Fetching match data...".to_string()
        } else if let Some(err) = &state.fixtures_error {
            err.clone()
        } else {
            "No fixtures available".to_string()
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
    } else {
        let (start, end) = visible_range(state.selected, choices.len(), inner.height as usize);
        let lines: Vec<Line> = (start..end)
            .map(|idx| {
                let (label, id) = &choices[idx];
                let selected = idx == state.selected;
                let prefix = if selected { "> " } else { "  " };
                let style = if selected {
                    Style::default().fg(Color::White).bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                let marker = match state.views.get(id) {
                    Some(MatchLoad::Ready(_)) => " *",
                    Some(MatchLoad::Loading) => " …",
                    _ => "",
                };
                Line::from(Span::styled(format!("{prefix}{label}{marker}"), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    render_console(frame, sections[1], state);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_match(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(5)])
        .split(area);

    match state.current_load() {
        Some(MatchLoad::Ready(view)) => render_match_view(frame, rows[0], view),
        Some(MatchLoad::NoData) => render_placeholder(frame, rows[0], "Nothing to show for this match"),
        Some(MatchLoad::Failed(reason)) => render_placeholder(frame, rows[0], reason),
        Some(MatchLoad::Loading) | None => render_placeholder(frame, rows[0], "Fetching match data..."),
    }

    render_console(frame, rows[1], state);
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Shot Map").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_match_view(frame: &mut Frame, area: Rect, view: &MatchView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let map_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(columns[0]);

    let figure = &view.shot_map.figure;
    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(figure.title.clone())
                .borders(Borders::ALL),
        )
        .marker(Marker::Braille)
        .background_color(to_color(figure.background))
        .x_bounds(figure.x_bounds)
        .y_bounds(figure.y_bounds)
        .paint(|ctx| paint_figure(ctx, figure));
    frame.render_widget(canvas, map_chunks[0]);

    let legend: Vec<Span> = figure
        .legend
        .iter()
        .flat_map(|entry| {
            [
                Span::styled(" ● ", Style::default().fg(to_color(entry.color))),
                Span::raw(entry.label.clone()),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(legend)), map_chunks[1]);

    let tables = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[1]);
    render_ratings(frame, tables[0], &view.shot_map.home_name, &view.ratings.home);
    render_ratings(frame, tables[1], &view.shot_map.away_name, &view.ratings.away);
}

fn paint_figure(ctx: &mut Context, figure: &Figure) {
    for shape in &figure.shapes {
        match shape {
            Shape::Polyline { points, color } => draw_segments(ctx, points, *color),
            Shape::Circle {
                center,
                radius,
                color,
                filled,
            } => {
                if *filled {
                    draw_disk(ctx, *center, *radius, *color);
                } else {
                    ctx.draw(&CanvasCircle {
                        x: center.0,
                        y: center.1,
                        radius: *radius,
                        color: to_color(*color),
                    });
                }
            }
            Shape::Arc(arc) => draw_segments(ctx, &arc.points(24), arc.color),
            Shape::Marker {
                x,
                y,
                size,
                color,
                fill,
            } => {
                // Braille cells are coarse; keep tiny markers visible.
                let radius = figure.marker_radius(*size).max(0.6);
                match fill {
                    MarkerFill::Filled => draw_disk(ctx, (*x, *y), radius, *color),
                    MarkerFill::Hollow => ctx.draw(&CanvasCircle {
                        x: *x,
                        y: *y,
                        radius,
                        color: to_color(*color),
                    }),
                }
            }
        }
    }
}

fn draw_segments(ctx: &mut Context, points: &[(f64, f64)], color: Rgb) {
    for pair in points.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].0,
            y1: pair[0].1,
            x2: pair[1].0,
            y2: pair[1].1,
            color: to_color(color),
        });
    }
}

fn draw_disk(ctx: &mut Context, center: (f64, f64), radius: f64, color: Rgb) {
    const STEP: f64 = 0.25;
    let mut coords = Vec::new();
    let steps = (radius / STEP).ceil() as i32;
    for i in -steps..=steps {
        for j in -steps..=steps {
            let dx = f64::from(i) * STEP;
            let dy = f64::from(j) * STEP;
            if dx * dx + dy * dy <= radius * radius {
                coords.push((center.0 + dx, center.1 + dy));
            }
        }
    }
    ctx.draw(&Points {
        coords: &coords,
        color: to_color(color),
    });
}

fn render_ratings(frame: &mut Frame, area: Rect, team: &str, players: &[PlayerRating]) {
    let block = Block::default()
        .title(format!("{team} ratings"))
        .borders(Borders::ALL);
    if players.is_empty() {
        let empty = Paragraph::new("No lineup yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = players
        .iter()
        .map(|player| {
            let tier = player.rating.tier();
            let rating_style = Style::default()
                .bg(to_color(tier.color()))
                .fg(tier_text_color(tier));
            Row::new(vec![
                Cell::from(player.name.clone()),
                Cell::from(format!(" {} ", player.rating)).style(rating_style),
            ])
        })
        .collect();
    let header = Row::new(vec!["Player", "Rating"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(rows, [Constraint::Min(12), Constraint::Length(11)])
        .header(header)
        .block(block);
    frame.render_widget(table, area);
}

fn tier_text_color(tier: RatingTier) -> Color {
    match tier {
        RatingTier::Good | RatingTier::Average => Color::Black,
        _ => Color::White,
    }
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let text = if state.logs.is_empty() {
        "No alerts yet".to_string()
    } else {
        let start = state.logs.len().saturating_sub(visible);
        state
            .logs
            .iter()
            .skip(start)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    };
    let console = Paragraph::new(text).block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "DisBall - Help",
        "",
        "Fixtures:",
        "  j/k or ↑/↓   Move",
        "  Enter / d    Open shot map",
        "  r            Reload fixtures",
        "",
        "Match:",
        "  b / Esc      Back",
        "  r            Refetch match",
        "  e            Export SVG + XLSX",
        "",
        "Ratings: purple ≥9, green ≥7, orange ≥6, red <6, black unrated",
        "Shots: filled = goal, hollow = other, size = xG",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
