use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use aimdrill::session::{Lives, Phase};
use aimdrill::target::{Target, TargetState, HEADER_PX};

use crate::App;

/// Terminal cells are not square; map engine pixel space to cells at a
/// fixed scale so circle geometry stays round-ish on screen.
pub const CELL_W_PX: u32 = 8;
pub const CELL_H_PX: u32 = 16;

/// Rows of the stats band inside the arena, the cell image of `HEADER_PX`.
const HEADER_ROWS: u16 = (HEADER_PX / CELL_H_PX) as u16;

/// The playable arena in cell coordinates: everything below the one-line
/// help bar, inside the arena border. Pure function of the frame area so
/// the click mapping in main.rs and the renderer always agree.
pub fn arena_rect(area: Rect) -> Rect {
    let block_area = Rect {
        x: area.x,
        y: area.y.saturating_add(1),
        width: area.width,
        height: area.height.saturating_sub(1),
    };
    Block::default().borders(Borders::ALL).inner(block_area)
}

fn target_style(state: TargetState, accent: Color) -> Style {
    match state {
        TargetState::Appearing => Style::default().bg(accent).add_modifier(Modifier::DIM),
        TargetState::Active => Style::default().bg(accent),
        TargetState::Disappearing => Style::default().bg(Color::DarkGray),
    }
}

/// Paints one target as row-wise chords of its circle, clipped to the arena.
fn render_target(target: &Target, arena: Rect, buf: &mut Buffer, accent: Color) {
    let style = target_style(target.state, accent);
    let r = target.size as f64 / 2.0;
    let cx = target.x as f64 + r;
    let cy = target.y as f64 + r;

    let row_from = target.y / CELL_H_PX;
    let row_to = (target.y + target.size.max(1) - 1) / CELL_H_PX;

    for row in row_from..=row_to {
        let py = (row * CELL_H_PX + CELL_H_PX / 2) as f64;
        let dy = py - cy;
        if dy.abs() > r {
            continue;
        }
        let half = (r * r - dy * dy).sqrt();
        let col_from = (((cx - half) / CELL_W_PX as f64).floor() as u32).min(u32::from(u16::MAX));
        let col_to = (((cx + half) / CELL_W_PX as f64).ceil() as u32).min(u32::from(u16::MAX));

        let y = arena.y + row as u16;
        if y >= arena.y + arena.height {
            continue;
        }
        for col in col_from..col_to.max(col_from + 1) {
            let x = arena.x + col as u16;
            if x < arena.x + arena.width {
                buf.set_string(x, y, " ", style);
            }
        }
    }
}

fn centered(area: Rect, height: u16) -> Rect {
    let top = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x: area.x,
        y: top,
        width: area.width,
        height: height.min(area.height),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let accent = Color::Red;
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        // Help bar
        let help = Paragraph::new(Span::styled(
            "space start/pause · r reset · 1/2/3 mode · d difficulty · l lives · q quit",
            dim,
        ))
        .alignment(Alignment::Center);
        help.render(
            Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: 1,
            },
            buf,
        );

        // Arena border
        let block_area = Rect {
            x: area.x,
            y: area.y.saturating_add(1),
            width: area.width,
            height: area.height.saturating_sub(1),
        };
        let title = format!(
            " {} · {} ",
            session.config.mode, session.config.difficulty
        );
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .render(block_area, buf);

        let arena = arena_rect(area);
        if arena.width == 0 || arena.height == 0 {
            return;
        }

        for target in session.targets() {
            render_target(target, arena, buf, accent);
        }

        // Stats band over the reserved header region
        let lives = match session.lives {
            Lives::Infinite => "∞".to_string(),
            Lives::Finite(_) => session
                .lives
                .remaining()
                .map(|l| l.to_string())
                .unwrap_or_default(),
        };
        let stats = vec![
            Line::from(vec![
                Span::styled(format!("Score {}", session.score), bold.fg(accent)),
                Span::raw(format!("   High {}", session.high_score)),
                Span::raw(format!("   Time {}s", session.time_left)),
            ]),
            Line::from(vec![
                Span::raw(format!("Accuracy {}%", session.accuracy)),
                Span::raw(format!("   Lives {lives}")),
            ]),
            Line::from(vec![
                Span::raw(format!("Streak {}", session.streak)),
                Span::raw(format!("   Best {}", session.best_streak)),
            ]),
        ];
        let stats_area = Rect {
            x: arena.x + 1,
            y: arena.y,
            width: arena.width.saturating_sub(2),
            height: HEADER_ROWS.min(arena.height),
        };
        Paragraph::new(stats).render(stats_area, buf);

        // Overlays
        match session.phase {
            Phase::Idle => {
                let welcome = Paragraph::new(vec![
                    Line::from(Span::styled("AIMDRILL", bold.fg(accent))),
                    Line::from(""),
                    Line::from(format!(
                        "{} targets · {}s · {} mode",
                        session.config.target_count, session.config.game_time_secs, session.config.mode
                    )),
                    Line::from(Span::styled("press space to start", dim)),
                ])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
                welcome.render(centered(arena, 4), buf);
            }
            Phase::Paused => {
                let paused = Paragraph::new(vec![
                    Line::from(Span::styled("Game Paused", bold)),
                    Line::from(Span::styled("press space to resume", dim)),
                ])
                .alignment(Alignment::Center);
                paused.render(centered(arena, 2), buf);
            }
            Phase::GameOver => {
                let over = Paragraph::new(vec![
                    Line::from(Span::styled("Game Over", bold.fg(accent))),
                    Line::from(""),
                    Line::from(format!(
                        "score {} · accuracy {}% · best streak {}",
                        session.score, session.accuracy, session.best_streak
                    )),
                    Line::from(Span::styled("space to play again · q to quit", dim)),
                ])
                .alignment(Alignment::Center);
                over.render(centered(arena, 4), buf);
            }
            Phase::Running => {}
        }
    }
}
