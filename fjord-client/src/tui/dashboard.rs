// Dashboard view: facet bar lists on the left, the histogram on the right.
//
// Toggling a bar rebuilds the query string and "navigates" to it; the facet check marks are
// then re-derived from that query, the way a page reload would.

use super::{button_text, centered_window, restore_terminal, setup_terminal};
use crate::charts::bars::{BarItem, Facet};
use crate::charts::histogram::Histogram;
use crate::charts::series::Series;
use crate::charts::weekends::DAY_MS;
use crate::charts::{date_range_params, DashboardData};
use crate::ui::surface::{Element, MemorySurface, Surface};
use crate::ui::widgets::Expando;
use crate::utils::querystring::{self, build_query, parse_query, QueryMap, QueryNavigator};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use log::info;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;
use std::time::{Duration, Instant};

const WHEN_TOGGLE_ID: &str = "whentoggle";
const WHEN_PANEL_ID: &str = "when";
const BAR_CELLS: usize = 12;
const HOVER_STEPS: f64 = 60.0;

/// Current filter query. Navigating replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    search: String,
    query: QueryMap,
}

impl FilterState {
    pub fn new(search: &str) -> Self {
        Self {
            search: search.to_string(),
            query: parse_query(search),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn query(&self) -> &QueryMap {
        &self.query
    }
}

impl QueryNavigator for FilterState {
    fn navigate(&mut self, search: &str) {
        info!("[PHASE: dashboard] [STEP: filter] Navigating to {:?}", search);
        self.search = search.to_string();
        self.query = parse_query(search);
    }
}

pub struct DashboardState {
    title: String,
    facets: Vec<Facet>,
    histogram: Histogram,
    filters: FilterState,
    date_start: String,
    date_end: String,
    /// Flat index over every bar of every facet.
    selected: usize,
    hover_x: Option<f64>,
    chrome: MemorySurface,
    when: Expando,
    quit: bool,
}

impl DashboardState {
    pub fn new(data: DashboardData) -> Self {
        let histogram = data.histogram();
        let mut checked = vec![date_range_params(&data.date_start, &data.date_end)];
        for facet in &data.facets {
            for item in facet.items.iter().filter(|i| i.checked) {
                checked.push(vec![(
                    facet.name.clone(),
                    Some(item.query_value().to_string()),
                )]);
            }
        }
        let filters = FilterState::new(&build_query(&checked));

        let mut chrome = MemorySurface::new()
            .with(WHEN_TOGGLE_ID, Element::visible())
            .with(WHEN_PANEL_ID, Element::visible());
        let when = Expando::new(WHEN_TOGGLE_ID, WHEN_PANEL_ID);
        when.init(&mut chrome);
        if !data.date_start.trim().is_empty() || !data.date_end.trim().is_empty() {
            when.open(&mut chrome);
        }

        let mut state = Self {
            title: data.title,
            facets: data.facets,
            histogram,
            filters,
            date_start: data.date_start,
            date_end: data.date_end,
            selected: 0,
            hover_x: None,
            chrome,
            when,
            quit: false,
        };
        state.sync_checked();
        state
    }

    /// Two weeks of sentiment plus two facets. Used for smoke rendering.
    pub fn sample() -> Self {
        const MON: i64 = 1_411_344_000_000; // 2014-09-22
        let day = |i: i64, v: f64| (MON + i * DAY_MS, v);
        let happy = (0..14).map(|i| day(i, 20.0 + (i % 5) as f64 * 3.0)).collect();
        let sad = (0..14).map(|i| day(i, 12.0 + (i % 3) as f64 * 4.0)).collect();
        let bar = |label: &str, count: f64| BarItem {
            label: label.to_string(),
            value: None,
            count,
            checked: false,
        };
        Self::new(DashboardData {
            title: "Firefox OS".to_string(),
            preset: None,
            histogram: vec![Series::new("happy", happy), Series::new("sad", sad)],
            facets: vec![
                Facet {
                    name: "locale".to_string(),
                    total: 120.0,
                    items: vec![bar("en-US", 70.0), bar("de", 30.0), bar("pt-BR", 20.0)],
                },
                Facet {
                    name: "platform".to_string(),
                    total: 120.0,
                    items: vec![bar("Firefox OS", 100.0), bar("Android", 20.0)],
                },
            ],
            date_start: "2014-09-22".to_string(),
            date_end: "2014-10-05".to_string(),
        })
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    fn bar_count(&self) -> usize {
        self.facets.iter().map(|f| f.items.len()).sum()
    }

    /// `(facet, item)` for a flat bar index.
    fn locate(&self, mut index: usize) -> Option<(usize, usize)> {
        for (fi, facet) in self.facets.iter().enumerate() {
            if index < facet.items.len() {
                return Some((fi, index));
            }
            index -= facet.items.len();
        }
        None
    }

    /// Re-derive check marks from the query: one value per facet key.
    fn sync_checked(&mut self) {
        for facet in &mut self.facets {
            let current = querystring::get(&self.filters.query, &facet.name).map(str::to_string);
            for item in &mut facet.items {
                item.checked = current.as_deref() == Some(item.query_value());
            }
        }
    }

    pub fn toggle_selected(&mut self) -> Option<String> {
        let (fi, ii) = self.locate(self.selected)?;
        let current = self.filters.query.clone();
        let search = self.facets[fi].toggle(ii, &current, &mut self.filters)?;
        self.sync_checked();
        Some(search)
    }

    fn move_selection(&mut self, down: bool) {
        let count = self.bar_count();
        if count == 0 {
            return;
        }
        self.selected = if down {
            (self.selected + 1).min(count - 1)
        } else {
            self.selected.saturating_sub(1)
        };
    }

    fn move_hover(&mut self, right: bool) {
        let Some((lo, hi)) = self.histogram.x_bounds() else {
            return;
        };
        let (lo, hi) = (lo as f64, hi as f64);
        let step = (hi - lo) / HOVER_STEPS;
        let x = match self.hover_x {
            None if right => lo,
            None => hi,
            Some(x) if right => (x + step).min(hi),
            Some(x) => (x - step).max(lo),
        };
        self.hover_x = Some(x);
        self.histogram.hover_at(Some(x));
    }

    fn clear_hover(&mut self) -> bool {
        if self.hover_x.take().is_none() {
            return false;
        }
        self.histogram.hover_at(None);
        true
    }
}

pub fn run(data: DashboardData) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: start] Starting dashboard view {:?}",
        data.title
    );
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, DashboardState::new(data));
    restore_terminal(&mut terminal)?;
    result
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, mut state: DashboardState) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    while !state.quit {
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut state, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
    info!(
        "[PHASE: tui] [STEP: exit] Dashboard closed with filter {:?}",
        state.filters.search
    );
    Ok(())
}

fn handle_key(state: &mut DashboardState, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.quit = true;
        return;
    }
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Esc => {
            if !state.clear_hover() {
                state.quit = true;
            }
        }
        KeyCode::Up => state.move_selection(false),
        KeyCode::Down => state.move_selection(true),
        KeyCode::Char(' ') | KeyCode::Enter => {
            state.toggle_selected();
        }
        KeyCode::Left => state.move_hover(false),
        KeyCode::Right => state.move_hover(true),
        KeyCode::Char('w') => {
            state.when.toggle(&mut state.chrome);
        }
        _ => {}
    }
}

pub fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &DashboardState) {
    let (window_area, _) = centered_window(area, 100, 30);
    let title = if state.title.is_empty() {
        " Fjord Dashboard ".to_string()
    } else {
        format!(" Fjord Dashboard: {} ", state.title)
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), window_area);

    let inner = window_area.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    });
    let when_height = if state.chrome.is_visible(WHEN_PANEL_ID) {
        2
    } else {
        0
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(when_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    if when_height > 0 {
        let lines = vec![
            Line::from(format!(
                "When: {} to {}",
                or_dash(&state.date_start),
                or_dash(&state.date_end)
            )),
            Line::from(Span::styled(
                format!("Link: /{}", state.filters.search),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), rows[0]);
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)])
        .split(rows[1]);
    draw_facets(f, cols[0], state);
    state.histogram.render(f, cols[1], "Sentiment");

    let when_label = button_text("When", state.chrome.has_class(WHEN_TOGGLE_ID, "selected"), true);
    let help = Line::from(vec![
        Span::styled(
            "Up/Down select  Space filter  Left/Right hover  w ",
            Style::default().fg(Color::DarkGray),
        ),
        when_label,
        Span::styled("  q quit", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(help), rows[2]);
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

fn draw_facets(f: &mut ratatui::Frame<'_>, area: Rect, state: &DashboardState) {
    let mut lines: Vec<Line> = Vec::new();
    let mut index = 0;
    for facet in &state.facets {
        lines.push(Line::from(Span::styled(
            facet.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for row in facet.rows() {
            let filled = ((row.width_pct / 100.0) * BAR_CELLS as f64).round() as usize;
            let bar = format!(
                "{}{}",
                "█".repeat(filled.min(BAR_CELLS)),
                " ".repeat(BAR_CELLS - filled.min(BAR_CELLS))
            );
            let mark = if row.checked { "x" } else { " " };
            let label: String = row.label.chars().take(12).collect();
            let mut style = Style::default();
            if index == state.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(vec![
                Span::styled(format!("[{}] {:<12} ", mark, label), style),
                Span::styled(bar, Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {:>4}", row.percent)),
            ]));
            index += 1;
        }
        lines.push(Line::from(""));
    }
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Filters")),
        area,
    );
}
