//! Ratatui-based terminal UI.
//!
//! Two tabs over one loaded sheet: a daily view (per-store keyword tables for
//! a chosen date) and a weekly view (recent vs previous week averages).

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::app::pipeline::Dashboard;
use crate::compare::WeeklyComparison;
use crate::data::{SheetSource, SourceConfig};
use crate::domain::{Platform, Trend, display_date_label};
use crate::error::AppError;
use crate::report::{format_categories, format_change};

mod plotters_chart;

use plotters_chart::{BarPair, WeeklyBarChart, bars_y_max};

/// Start the TUI.
pub fn run(config: SourceConfig) -> Result<(), AppError> {
    let source = SheetSource::from_config(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(Dashboard::new(source));
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Daily,
    Weekly,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Tab::Daily => 0,
            Tab::Weekly => 1,
        }
    }

    fn toggle(self) -> Self {
        match self {
            Tab::Daily => Tab::Weekly,
            Tab::Weekly => Tab::Daily,
        }
    }
}

/// One row of the weekly view, flattened for table and chart.
struct WeeklyRow {
    platform: Platform,
    keyword: String,
    recent: f64,
    previous: f64,
    change: String,
    trend: Trend,
}

struct App {
    dashboard: Dashboard,
    tab: Tab,
    /// Index into `dates()`; 0 is the latest date.
    date_idx: usize,
    store_idx: usize,
    status: String,
    /// Set when a fetch should run right after the next draw.
    pending_refresh: bool,
    /// Recomputed after every refresh.
    comparison: WeeklyComparison,
}

impl App {
    fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            tab: Tab::Daily,
            date_idx: 0,
            store_idx: 0,
            status: "Loading keyword sheet...".to_string(),
            pending_refresh: true,
            comparison: WeeklyComparison::new(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            // The "loading" status is on screen before the blocking fetch starts.
            if self.pending_refresh {
                self.refresh();
                needs_redraw = true;
                continue;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.tab = self.tab.toggle(),
            KeyCode::Char('1') => self.tab = Tab::Daily,
            KeyCode::Char('2') => self.tab = Tab::Weekly,
            KeyCode::Up => self.store_idx = self.store_idx.saturating_sub(1),
            KeyCode::Down => {
                let n = self.dashboard.indices().stores().len();
                if self.store_idx + 1 < n {
                    self.store_idx += 1;
                }
            }
            // Dates are newest-first, so "right" moves toward newer dates.
            KeyCode::Left => {
                let n = self.dashboard.indices().dates().len();
                if self.date_idx + 1 < n {
                    self.date_idx += 1;
                }
            }
            KeyCode::Right => self.date_idx = self.date_idx.saturating_sub(1),
            KeyCode::Char('r') => {
                self.pending_refresh = true;
                self.status = "Refreshing keyword sheet...".to_string();
            }
            KeyCode::Char('d') => {
                if !self.dashboard.has_data() {
                    self.status = "No sheet data loaded.".to_string();
                } else {
                    match crate::debug::write_debug_bundle(&self.dashboard) {
                        Ok(path) => self.status = format!("Wrote debug bundle: {}", path.display()),
                        Err(err) => self.status = format!("Debug write failed: {err}"),
                    }
                }
            }
            _ => {}
        }
        false
    }

    fn refresh(&mut self) {
        self.pending_refresh = false;

        let previous_date = self.selected_date().map(str::to_string);
        let previous_store = self.selected_store().map(str::to_string);

        match self.dashboard.refresh().map(|_| ()) {
            Ok(()) => {
                let indices = self.dashboard.indices();
                self.date_idx = previous_date
                    .and_then(|d| indices.dates().iter().position(|x| *x == d))
                    .unwrap_or(0);
                self.store_idx = previous_store
                    .and_then(|s| indices.stores().iter().position(|x| *x == s))
                    .unwrap_or(0);
                self.status = match self.dashboard.last_fetch() {
                    Some(fetch) => format!(
                        "Loaded via {} at {}",
                        fetch.candidate,
                        fetch.fetched_at.format("%H:%M:%S")
                    ),
                    None => "Loaded.".to_string(),
                };
            }
            Err(err) => {
                self.status = if self.dashboard.has_data() {
                    format!("Refresh failed, showing previous data: {err}")
                } else {
                    format!("Load failed: {err}")
                };
            }
        }
        self.comparison = self.dashboard.weekly_comparison();
    }

    fn selected_date(&self) -> Option<&str> {
        self.dashboard.indices().dates().get(self.date_idx).map(String::as_str)
    }

    fn selected_store(&self) -> Option<&str> {
        self.dashboard.indices().stores().get(self.store_idx).map(String::as_str)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        if self.dashboard.has_data() {
            self.draw_body(frame, chunks[1]);
        } else {
            self.draw_empty(frame, chunks[1]);
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let date = self
            .selected_date()
            .map(display_date_label)
            .unwrap_or_else(|| "-".to_string());
        let titles = vec![
            Line::from(format!("1 Daily ({date})")),
            Line::from("2 Weekly"),
        ];
        let tabs = Tabs::new(titles)
            .block(Block::default().title("kwdash - keyword exposure").borders(Borders::ALL))
            .select(self.tab.index())
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, area);
    }

    fn draw_empty(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Keyword sheet").borders(Borders::ALL);
        let (text, color) = match self.dashboard.last_error() {
            Some(err) => (
                format!("Could not load the keyword sheet.\n\n{err}\n\nPress r to retry."),
                Color::Red,
            ),
            None => ("Waiting for data...".to_string(), Color::Yellow),
        };
        let p = Paragraph::new(text)
            .style(Style::default().fg(color))
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(area);

        self.draw_stores(frame, chunks[0]);
        match self.tab {
            Tab::Daily => self.draw_daily(frame, chunks[1]),
            Tab::Weekly => self.draw_weekly(frame, chunks[1]),
        }
    }

    fn draw_stores(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let indices = self.dashboard.indices();
        let day = self.selected_date().and_then(|d| indices.by_date(d));

        let items: Vec<ListItem> = indices
            .stores()
            .iter()
            .map(|store| {
                let has_rows = match self.tab {
                    Tab::Daily => day.and_then(|d| d.get(store)).is_some_and(|b| !b.is_empty()),
                    Tab::Weekly => self.comparison.contains_key(store),
                };
                let style = if has_rows {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(store.as_str()).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Stores").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.store_idx));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_daily(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let indices = self.dashboard.indices();
        let (Some(date), Some(store)) = (self.selected_date(), self.selected_store()) else {
            return;
        };

        for (platform, rect) in Platform::ALL.into_iter().zip(chunks.iter().copied()) {
            let records = indices.cell(store, date, platform);
            let title = format!("{} - {} keyword(s)", platform.display_name(), records.len());
            let block = Block::default().title(title).borders(Borders::ALL);

            if records.is_empty() {
                let p = Paragraph::new("No data")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                frame.render_widget(p, rect);
                continue;
            }

            let rows: Vec<Row> = records
                .iter()
                .map(|r| {
                    let mut cells = vec![
                        Cell::from(r.main_keyword().to_string()),
                        Cell::from(r.total_posts().to_string()),
                    ];
                    if platform == Platform::Naver {
                        cells.push(Cell::from(format_categories(r)));
                    }
                    Row::new(cells)
                })
                .collect();

            let (header, widths) = match platform {
                Platform::Naver => (
                    Row::new(vec!["keyword", "posts", "categories"]),
                    vec![Constraint::Percentage(30), Constraint::Length(8), Constraint::Min(10)],
                ),
                Platform::Instagram => (
                    Row::new(vec!["keyword", "posts"]),
                    vec![Constraint::Percentage(60), Constraint::Length(8)],
                ),
            };

            let table = Table::new(rows, widths)
                .header(header.style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)))
                .block(block);
            frame.render_widget(table, rect);
        }
    }

    fn weekly_rows(&self, store: &str) -> Vec<WeeklyRow> {
        let Some(platforms) = self.comparison.get(store) else {
            return Vec::new();
        };
        platforms
            .iter()
            .flat_map(|(platform, keywords)| {
                keywords.iter().map(move |(keyword, r)| WeeklyRow {
                    platform: *platform,
                    keyword: keyword.clone(),
                    recent: r.recent_avg,
                    previous: r.previous_avg,
                    change: format_change(r),
                    trend: r.trend(),
                })
            })
            .collect()
    }

    fn draw_weekly(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.comparison.is_empty() {
            let msg = format!(
                "Not enough data for a weekly comparison ({} dates loaded, 7 needed).",
                self.dashboard.indices().dates().len()
            );
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("Weekly").borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        let Some(store) = self.selected_store() else { return };
        let rows = self.weekly_rows(store);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        self.draw_weekly_chart(frame, chunks[0], &rows);

        let table_rows: Vec<Row> = rows
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let color = match r.trend {
                    Trend::Up => Color::Green,
                    Trend::Down => Color::Red,
                    Trend::Flat => Color::Gray,
                };
                Row::new(vec![
                    Cell::from((i + 1).to_string()),
                    Cell::from(r.platform.display_name()),
                    Cell::from(r.keyword.clone()),
                    Cell::from(format!("{:.1}", r.recent)),
                    Cell::from(format!("{:.1}", r.previous)),
                    Cell::from(r.change.clone()).style(Style::default().fg(color)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(10),
        ];
        let table = Table::new(table_rows, widths)
            .header(
                Row::new(vec!["#", "platform", "keyword", "recent", "previous", "change"])
                    .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().title(format!("{store} - weekly")).borders(Borders::ALL));
        frame.render_widget(table, chunks[1]);
    }

    fn draw_weekly_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, rows: &[WeeklyRow]) {
        let title = Line::from(vec![
            Span::raw("Average posts: "),
            Span::styled("recent", Style::default().fg(Color::Cyan)),
            Span::raw(" vs "),
            Span::styled("previous", Style::default().fg(Color::Gray)),
        ]);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if rows.is_empty() {
            let p = Paragraph::new("No keywords for this store.").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(p, inner);
            return;
        }

        let bars: Vec<BarPair> = rows
            .iter()
            .map(|r| BarPair {
                recent: r.recent,
                previous: r.previous,
            })
            .collect();
        let widget = WeeklyBarChart {
            bars: &bars,
            y_max: bars_y_max(&bars),
            y_label: "posts",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1/2 view  ←/→ date  ↑/↓ store  r refresh  d debug  q quit";
        let status_color = if self.dashboard.last_error().is_some() {
            Color::Red
        } else {
            Color::Yellow
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(status_color)),
        ]);
        let p = Paragraph::new(Text::from(line)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    use ratatui::backend::TestBackend;

    use super::*;
    use crate::data::Transport;
    use crate::domain::DelimiterFormat;
    use crate::error::IngestError;
    use crate::io::ingest::ParseOptions;

    /// Serves `bodies[n]` on the n-th call, then fails.
    struct Scripted {
        calls: Rc<StdCell<usize>>,
        bodies: Vec<String>,
    }

    impl Transport for Scripted {
        fn label(&self) -> &str {
            "scripted"
        }

        fn format(&self) -> DelimiterFormat {
            DelimiterFormat::Csv
        }

        fn retrieve(&self) -> Result<String, IngestError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.bodies.get(n).cloned().ok_or_else(|| IngestError::TransportFailure {
                candidate: "scripted".to_string(),
                message: "offline".to_string(),
            })
        }
    }

    fn sheet(rows: &[(&str, &str)]) -> String {
        let mut text = String::from("banner\nnote\nheader\n");
        for (date, store) in rows {
            text.push_str(&format!("1,{date},{store},네이버,맛집,3,카페,2,-,0,-,0\n"));
        }
        text
    }

    fn app(bodies: Vec<String>) -> App {
        let transport = Scripted {
            calls: Rc::new(StdCell::new(0)),
            bodies,
        };
        let source = SheetSource::new(vec![Box::new(transport)], ParseOptions::default(), Duration::ZERO);
        App::new(Dashboard::new(source))
    }

    #[test]
    fn navigation_is_clamped() {
        let mut app = app(vec![sheet(&[("1/1", "A"), ("1/2", "B"), ("1/3", "A")])]);
        app.refresh();
        assert_eq!(app.selected_date(), Some("1/3"));

        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected_date(), Some("1/3"));
        for _ in 0..5 {
            app.handle_key(KeyCode::Left);
        }
        assert_eq!(app.selected_date(), Some("1/1"));

        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected_store(), Some("A"));
        for _ in 0..5 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.selected_store(), Some("B"));
    }

    #[test]
    fn tabs_and_quit_keys() {
        let mut app = app(vec![]);
        assert!(!app.handle_key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Weekly);
        app.handle_key(KeyCode::Char('1'));
        assert_eq!(app.tab, Tab::Daily);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn failed_refresh_keeps_selection_and_data() {
        let mut app = app(vec![sheet(&[("1/1", "A"), ("1/2", "B")])]);
        app.refresh();
        app.handle_key(KeyCode::Left);
        app.handle_key(KeyCode::Down);

        app.handle_key(KeyCode::Char('r'));
        assert!(app.pending_refresh);
        app.refresh();

        assert!(app.status.starts_with("Refresh failed"));
        assert_eq!(app.selected_date(), Some("1/1"));
        assert_eq!(app.selected_store(), Some("B"));
    }

    #[test]
    fn refresh_follows_selected_date_label() {
        let mut app = app(vec![
            sheet(&[("1/1", "A"), ("1/2", "A")]),
            sheet(&[("1/1", "A"), ("1/2", "A"), ("1/3", "A")]),
        ]);
        app.refresh();
        app.handle_key(KeyCode::Left);
        assert_eq!(app.selected_date(), Some("1/1"));

        app.refresh();
        assert_eq!(app.date_idx, 2);
        assert_eq!(app.selected_date(), Some("1/1"));
    }

    #[test]
    fn daily_view_and_error_panel_render() {
        let mut failed = app(vec![]);
        failed.refresh();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| failed.draw(f)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Press r to retry."));

        let mut loaded = app(vec![sheet(&[("1/1", "A")])]);
        loaded.refresh();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| loaded.draw(f)).unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("keyword(s)"));
    }
}
