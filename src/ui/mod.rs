//! Interactive leaderboard using ratatui
//!
//! Shows explorers ranked by score next to the star systems and planets
//! credited to the selected explorer. The view reads from the ledger on
//! start and whenever the user asks for a reload.

mod components;

pub use components::{DetailPanel, LeaderboardPanel, StatusPanel};

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use crate::ledger::Ledger;

/// What a key press asks the board to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Next,
    Previous,
    Reload,
    Quit,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Next),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Previous),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }
}

/// Board state, independent of the terminal it is drawn on
pub struct Board {
    leaderboard: LeaderboardPanel,
    detail: DetailPanel,
    status: StatusPanel,
}

impl Board {
    pub fn new() -> Self {
        Self {
            leaderboard: LeaderboardPanel::new(),
            detail: DetailPanel::new(),
            status: StatusPanel::new(),
        }
    }

    pub fn leaderboard(&self) -> &LeaderboardPanel {
        &self.leaderboard
    }

    /// Re-read the ranking and the selected explorer's details
    pub fn reload(&mut self, ledger: &Ledger) -> Result<()> {
        let entries = ledger.leaderboard()?;
        let count = entries.len();
        self.leaderboard.set_entries(entries);
        self.refresh_detail(ledger)?;
        self.status.set_message(format!("{} explorers", count));
        Ok(())
    }

    /// Apply an action; returns false once the board should close
    pub fn apply(&mut self, action: Action, ledger: &Ledger) -> Result<bool> {
        match action {
            Action::Next => {
                self.leaderboard.select_next();
                self.refresh_detail(ledger)?;
            }
            Action::Previous => {
                self.leaderboard.select_previous();
                self.refresh_detail(ledger)?;
            }
            Action::Reload => self.reload(ledger)?,
            Action::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn refresh_detail(&mut self, ledger: &Ledger) -> Result<()> {
        let detail = match self.leaderboard.selected() {
            Some(explorer) => Some(ledger.get_explorer(explorer.id)?),
            None => None,
        };
        self.detail.set_detail(detail);
        Ok(())
    }

    fn draw(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        terminal.draw(|frame| {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(1)])
                .split(frame.area());
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(rows[0]);

            self.leaderboard.render(frame, columns[0]);
            self.detail.render(frame, columns[1]);
            self.status.render(frame, rows[1]);
        })?;
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Full-screen terminal session for the board
pub struct BoardApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    board: Board,
}

impl BoardApp {
    /// Enter the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            board: Board::new(),
        })
    }

    /// Run until the user quits, then restore the terminal
    pub fn run(mut self, ledger: &Ledger) -> Result<()> {
        self.board.reload(ledger)?;

        loop {
            self.board.draw(&mut self.terminal)?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            if let CrosstermEvent::Key(KeyEvent { code, kind, .. }) = event::read()? {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(action) = Action::from_key(code) {
                    if !self.board.apply(action, ledger)? {
                        break;
                    }
                }
            }
        }

        self.restore()
    }

    /// Restore terminal
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for BoardApp {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}
