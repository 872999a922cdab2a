use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::game::board::{PulsePhase, TileColor, TILES, TILE_COUNT};
use crate::game::session::Stage;
use crate::game::Phase;
use crate::synth::{note_name, TILE_NOTES};

const KEY_LABELS: [&str; TILE_COUNT] = ["1 / J", "2 / K", "3 / L"];

// ── Top-level routing ─────────────────────────────────────────────────────────

fn panels(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // title bar      chunks[0]
            Constraint::Length(3),  // score line     chunks[1]
            Constraint::Min(9),     // game area      chunks[2]
            Constraint::Length(4),  // status         chunks[3]
            Constraint::Length(4),  // help           chunks[4]
        ])
        .split(area)
}

/// Screen rectangles of the three tiles, in board order.
fn tile_rects(board: Rect) -> [Rect; TILE_COUNT] {
    let inner = Block::default().borders(Borders::ALL).inner(board);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(inner);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(2), Constraint::Fill(1),
            Constraint::Length(2), Constraint::Fill(1),
            Constraint::Length(2), Constraint::Fill(1),
            Constraint::Length(2),
        ])
        .split(rows[1]);
    [cols[1], cols[3], cols[5]]
}

/// Hit-tests a terminal cell against the tiles.  `area` is the whole frame,
/// the same one handed to `draw`.
pub fn tile_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    let board = panels(area)[2];
    tile_rects(board).iter().position(|r| r.contains(Position::new(column, row)))
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = panels(f.area());
    let now = Instant::now();

    draw_title(f, chunks[0], app);
    draw_scores(f, chunks[1], app);
    draw_board(f, chunks[2], app, now);
    draw_status(f, chunks[3], app);
    draw_help(f, chunks[4], app);
}

// ── Title bar ─────────────────────────────────────────────────────────────────

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let phase = match app.session.phase() {
        Phase::Idle     => "Idle",
        Phase::Playing  => "Playing",
        Phase::GameOver => "Game Over",
    };
    let audio = if app.player.is_audible() { "audio" } else { "muted" };
    let text = format!(
        "  ToneTrace  ─  {}  ─  Level {}  ─  [{}]  ─  Enter: begin  E: end  Esc: quit",
        phase, app.session.level(), audio
    );
    let color = if app.player.is_audible() { Color::Cyan } else { Color::Yellow };
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Score line ────────────────────────────────────────────────────────────────

fn draw_scores(f: &mut Frame, area: Rect, app: &App) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    f.render_widget(
        Paragraph::new(format!("Score: {}", app.display.score))
            .style(bold)
            .block(Block::default().borders(Borders::LEFT | Borders::TOP | Borders::BOTTOM)),
        halves[0],
    );
    f.render_widget(
        Paragraph::new(format!("High: {:02}", app.display.high_score))
            .style(bold)
            .alignment(Alignment::Right)
            .block(Block::default().borders(Borders::RIGHT | Borders::TOP | Borders::BOTTOM)),
        halves[1],
    );
}

// ── Board ─────────────────────────────────────────────────────────────────────

fn tile_style(color: TileColor, pulse: Option<PulsePhase>) -> Style {
    let (r, g, b) = color.rgb();
    match pulse {
        None => Style::default().bg(Color::Rgb(r / 2, g / 2, b / 2)).fg(Color::Black),
        Some(PulsePhase::Rising) | Some(PulsePhase::Falling) => {
            Style::default().bg(Color::Rgb(r, g, b)).fg(Color::Black)
        }
        Some(PulsePhase::Holding) => Style::default()
            .bg(Color::White)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    }
}

fn draw_board(f: &mut Frame, area: Rect, app: &App, now: Instant) {
    let accepting = app.session.accepting_input();
    let title = if accepting { " ► Your turn " } else { " Board " };
    let border = if accepting { Color::Cyan } else { Color::White };
    f.render_widget(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border)),
        area,
    );

    let sounding = app.sounding_tiles();
    for (tile, rect) in TILES.iter().zip(tile_rects(area)) {
        let pulse = app.display.tile_pulse(tile.index, now);
        // the held phase pads the tile out by a cell, like a scale-up
        let rect = if pulse == Some(PulsePhase::Holding) { grow(rect, area) } else { rect };
        let note = if sounding.contains(&tile.index) { "♪ " } else { "" };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(tile.color.name(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(format!("{}{}", note, note_name(TILE_NOTES[tile.index]))),
            Line::from(Span::styled(KEY_LABELS[tile.index], Style::default().fg(Color::DarkGray))),
        ];
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(tile_style(tile.color, pulse))
                .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)),
            rect,
        );
    }
}

/// `rect` enlarged by one cell each way, kept inside `bounds`.
fn grow(rect: Rect, bounds: Rect) -> Rect {
    let x = rect.x.saturating_sub(1).max(bounds.x);
    let y = rect.y.saturating_sub(1).max(bounds.y);
    let right  = (rect.x + rect.width + 1).min(bounds.x + bounds.width);
    let bottom = (rect.y + rect.height + 1).min(bounds.y + bounds.height);
    Rect::new(x, y, right - x, bottom - y)
}

// ── Status ────────────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let extra = if app.status_msg.is_empty() { String::new() } else { format!("  │  {}", app.status_msg) };
    let entered = app.session.player().len();
    let total = app.session.target().len();
    let stage = stage_label(app);

    let text = vec![
        Line::from(vec![
            Span::styled(&app.display.status, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled(extra, Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled("Entered: ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{}/{}", entered, total), Style::default().fg(Color::Green)),
            Span::raw("  │  "),
            Span::styled(stage, Style::default().fg(Color::Magenta)),
            Span::raw("  │  "),
            Span::styled("Wave: ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.wave_name(), Style::default().fg(Color::Cyan)),
        ]),
    ];

    f.render_widget(
        Paragraph::new(text)
            .block(Block::default().title(" Status ").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        area,
    );
}

/// What the round is doing, with a countdown while it waits between rounds.
fn stage_label(app: &App) -> String {
    match app.session.stage() {
        None => "Idle".to_string(),
        Some(Stage::Presenting) => "Watching".to_string(),
        Some(Stage::AwaitingInput) => "Repeating".to_string(),
        Some(Stage::Preparing) | Some(Stage::Pausing) => match app.session.next_deadline() {
            Some(at) => format!("Next round in {:.1}s", at.saturating_sub(app.now()).as_secs_f32()),
            None => "Waiting".to_string(),
        },
    }
}

// ── Help ──────────────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let w = Style::default().fg(Color::White);
    let d = Style::default().fg(Color::DarkGray);

    let global = Line::from(vec![
        Span::styled("[Enter/B] ", w), Span::raw("Begin  │  "),
        Span::styled("[E] ",       w), Span::raw("End  │  "),
        Span::styled("[W] ",       w), Span::raw("Waveform  │  "),
        Span::styled("[Esc] ",     w), Span::raw("Quit"),
    ]);
    let tiles = match app.session.phase() {
        Phase::Playing => Line::from(vec![
            Span::styled("Tiles: ", d),
            Span::raw("1 2 3  or  J K L  or click  │  repeat the sequence once it has played"),
        ]),
        Phase::Idle | Phase::GameOver => Line::from(vec![
            Span::styled("Watch the tiles light up, then repeat them in order.", d),
        ]),
    };

    f.render_widget(
        Paragraph::new(vec![global, tiles])
            .block(Block::default().title(" Help ").borders(Borders::ALL))
            .style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicks_hit_the_tile_under_them() {
        let area = Rect::new(0, 0, 80, 30);
        let board = panels(area)[2];
        for (i, r) in tile_rects(board).iter().enumerate() {
            assert!(r.width > 0 && r.height > 0);
            assert_eq!(tile_at(area, r.x + r.width / 2, r.y + r.height / 2), Some(i));
        }
        assert_eq!(tile_at(area, 0, 0), None);
        assert_eq!(tile_at(area, board.x, board.y), None);
    }

    #[test]
    fn stage_label_counts_down_to_the_first_round() {
        use std::sync::{Arc, Mutex};
        use std::time::Duration;

        use crate::audio::TonePlayer;
        use crate::app::Display;
        use crate::game::{SequenceGenerator, SessionConfig, SessionController};
        use crate::save::JsonStore;
        use crate::synth::{ToneSynth, WaveType};

        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(Mutex::new(
            ToneSynth::new(1000.0, WaveType::Sine, 0.5, Duration::from_millis(10))));
        let config = SessionConfig { pre_round_delay: Duration::from_secs(60), ..SessionConfig::default() };
        let mut app = App::new(
            SessionController::new(config, SequenceGenerator::seeded(1)),
            Display::new(Duration::from_millis(100)),
            TonePlayer::open(synth, true),
            JsonStore::open(dir.path()),
        );
        assert_eq!(stage_label(&app), "Idle");

        app.begin();
        let label = stage_label(&app);
        let secs: f32 = label.trim_start_matches("Next round in ").trim_end_matches('s').parse().unwrap();
        assert!((59.0..=60.0).contains(&secs), "{label}");
    }

    #[test]
    fn grow_stays_in_bounds() {
        let bounds = Rect::new(0, 0, 10, 10);
        assert_eq!(grow(Rect::new(0, 0, 4, 4), bounds), Rect::new(0, 0, 5, 5));
        assert_eq!(grow(Rect::new(3, 3, 2, 2), bounds), Rect::new(2, 2, 4, 4));
    }
}
