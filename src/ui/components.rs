//! Panels for the leaderboard board

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::model::{Explorer, ExplorerDetail};

/// Ranked explorers with a movable selection
pub struct LeaderboardPanel {
    entries: Vec<Explorer>,
    selected: usize,
}

impl LeaderboardPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
        }
    }

    /// Replace the ranking, keeping the same explorer selected if it is still present
    pub fn set_entries(&mut self, entries: Vec<Explorer>) {
        let previous = self.selected().map(|e| e.id);
        self.entries = entries;
        self.selected = previous
            .and_then(|id| self.entries.iter().position(|e| e.id == id))
            .unwrap_or(0);
    }

    pub fn entries(&self) -> &[Explorer] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&Explorer> {
        self.entries.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec!["#", "Explorer", "Score"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, explorer)| {
                Row::new(vec![
                    Cell::from(format!("{}º", i + 1)),
                    Cell::from(explorer.name.clone()),
                    Cell::from(explorer.score.to_string()),
                ])
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Leaderboard ")
            .border_style(Style::default().fg(Color::Blue));

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Min(10),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = TableState::default();
        if !self.entries.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }
}

/// Star systems and planets credited to the selected explorer
pub struct DetailPanel {
    detail: Option<ExplorerDetail>,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self { detail: None }
    }

    pub fn set_detail(&mut self, detail: Option<ExplorerDetail>) {
        self.detail = detail;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let muted = Style::default().fg(Color::DarkGray);

        let lines = match &self.detail {
            None => vec![Line::from(Span::styled(" No explorer selected", muted))],
            Some(detail) => {
                let mut lines = vec![
                    Line::from(vec![
                        Span::styled(format!(" {} ", detail.explorer.name), heading),
                        Span::raw(format!(
                            "#{} · {} pts",
                            detail.explorer.id, detail.explorer.score
                        )),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!(" Star systems ({})", detail.star_systems.len()),
                        heading,
                    )),
                ];
                for system in &detail.star_systems {
                    lines.push(Line::from(format!(
                        "   #{} {} · {} declared",
                        system.id, system.name, system.declared_planet_count
                    )));
                }

                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(" Planets ({})", detail.planets.len()),
                    heading,
                )));
                for planet in &detail.planets {
                    lines.push(Line::from(format!(
                        "   {} · system #{}",
                        planet.name, planet.system_id
                    )));
                }
                lines
            }
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Discoveries ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Key hints and the last status message
pub struct StatusPanel {
    message: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            message: String::new(),
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" ↑/↓ ", Style::default().fg(Color::Cyan)),
            Span::raw("select  "),
            Span::styled("r ", Style::default().fg(Color::Cyan)),
            Span::raw("reload  "),
            Span::styled("q ", Style::default().fg(Color::Cyan)),
            Span::raw("quit   "),
            Span::styled(&self.message, Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}
