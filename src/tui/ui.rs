//! Stateless terminal rendering.
//!
//! Everything here reads [`App`] and draws; no state lives in this
//! module. The board is drawn from the player's point of view, two rows
//! per rank so the squares read roughly square in a terminal cell grid.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::app::App;
use crate::board::{Color as Side, Square};

const BOARD_WIDTH: u16 = 3 + 8 * 4;
const BOARD_HEIGHT: u16 = 8 * 2 + 1;

/// Renders the whole client: title, board, advantage bar, status, help.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                // Title
            Constraint::Min(BOARD_HEIGHT),        // Board
            Constraint::Length(3),                // Advantage bar
            Constraint::Length(4),                // Status
            Constraint::Length(1),                // Help
        ])
        .split(area);

    let title = Paragraph::new(title_text(app))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_board(frame, chunks[1], app);
    draw_advantage(frame, chunks[2], app);
    draw_status(frame, chunks[3], app);

    let help = Paragraph::new("arrows/hjkl move | enter pick/drop | esc cancel | n new game | q quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

fn title_text(app: &App) -> String {
    match app.state() {
        Some(state) => format!("kingside - playing {}", state.player_color),
        None => "kingside".to_string(),
    }
}

fn draw_board(frame: &mut Frame, area: Rect, app: &App) {
    let board_area = center_rect(area, BOARD_WIDTH, BOARD_HEIGHT);
    let paragraph = Paragraph::new(board_lines(app));
    frame.render_widget(paragraph, board_area);
}

/// Builds the board grid: two rows per rank, glyphs on the upper row,
/// rank labels down the left and file labels along the bottom.
fn board_lines(app: &App) -> Vec<Line<'static>> {
    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::with_capacity(BOARD_HEIGHT as usize);

    for row in 0..8u8 {
        let rank = match app.orientation() {
            Side::White => 7 - row,
            Side::Black => row,
        };
        let mut glyph_row: Vec<Span> =
            vec![Span::styled(format!(" {} ", rank + 1), label_style)];
        let mut pad_row: Vec<Span> = vec![Span::raw("   ")];

        for col in 0..8u8 {
            let file = match app.orientation() {
                Side::White => col,
                Side::Black => 7 - col,
            };
            let Some(square) = Square::new(file, rank) else {
                continue;
            };
            let style = square_style(app, square);
            let cell = match app.board().piece_at(square) {
                Some(piece) => {
                    let fg = match piece.color {
                        Side::White => Color::White,
                        Side::Black => Color::Black,
                    };
                    Span::styled(format!(" {}  ", piece.kind.glyph()), style.fg(fg))
                }
                None if app.hints().contains(&square) => {
                    Span::styled(" .  ".to_string(), style.fg(Color::Blue))
                }
                None => Span::styled("    ".to_string(), style),
            };
            glyph_row.push(cell);
            pad_row.push(Span::styled("    ".to_string(), style));
        }

        lines.push(Line::from(glyph_row));
        lines.push(Line::from(pad_row));
    }

    let mut labels: Vec<Span> = vec![Span::raw("   ")];
    for col in 0..8u8 {
        let file = match app.orientation() {
            Side::White => col,
            Side::Black => 7 - col,
        };
        labels.push(Span::styled(
            format!(" {}  ", (b'a' + file) as char),
            label_style,
        ));
    }
    lines.push(Line::from(labels));

    lines
}

/// Background for one square: checker pattern under highlight layers,
/// strongest layer last.
fn square_style(app: &App, square: Square) -> Style {
    let dark = (square.file() + square.rank()) % 2 == 0;
    let mut style = Style::default().bg(if dark {
        Color::DarkGray
    } else {
        Color::Gray
    });

    if app.hints().contains(&square) {
        style = style.bg(Color::LightBlue);
    }
    if let Some((from, to)) = app.last_move() {
        if square == from || square == to {
            style = style.bg(Color::Yellow);
        }
    }
    if app.check() == Some(square) {
        style = style.bg(Color::LightRed);
    }
    if app.picked() == Some(square) {
        style = style.bg(Color::LightGreen);
    }
    if square == app.cursor() {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

/// The advantage bar: how well the user stands, 0 lost to 100 won, with
/// the raw-derived label in the middle and the fill tinted toward
/// whichever side the engine currently favors.
fn draw_advantage(frame: &mut Frame, area: Rect, app: &App) {
    let eval = app.eval();
    let player = app
        .state()
        .map(|s| s.player_color)
        .unwrap_or(Side::White);
    let fill = match eval.favored_color(player) {
        Side::White => Color::White,
        Side::Black => Color::Indexed(239),
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("advantage"))
        .gauge_style(Style::default().fg(fill))
        .percent(u16::from(eval.user_percent()))
        .label(format!("{} ({}%)", eval.label(), eval.user_percent()));
    frame.render_widget(gauge, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::from(Span::styled(
        app.status().to_string(),
        Style::default().fg(Color::Yellow),
    ))];
    if let Some(alert) = app.alert() {
        lines.push(Line::from(Span::styled(
            alert.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    }

    let status = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Length(area.height.saturating_sub(height) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Length(area.width.saturating_sub(width) / 2),
        ])
        .split(vert[1])[1]
}
