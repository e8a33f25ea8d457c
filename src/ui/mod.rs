// UI module for rendering the TUI.
// Header with the star badge, tab bars, the sliding section viewport, and the status bar.

mod cards;
mod tabs;

use std::time::Duration;

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, ENTER_DURATION};
use crate::feed::StarBadge;
use crate::nav::{EnterAnimation, ExitAnimation, HOME_SECTION, Viewport};

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let secondary_height = if app.nav.tabs().secondary_visible() {
        1
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                // Tab bar
            Constraint::Length(secondary_height), // Secondary tabs
            Constraint::Min(1),                   // Section content
            Constraint::Length(1),                // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    tabs::draw_secondary_tabs(frame, app, chunks[1]);
    draw_content(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);
}

/// Tab bar with the star badge pinned to the right.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let badge = app.feed.data().map(|f| f.badge).unwrap_or(StarBadge::Loading);
    let badge = cards::badge_span(badge);
    let badge_width = (badge.width() as u16).min(area.width);

    let [tabs_area, badge_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(badge_width),
    ])
    .areas(area);

    tabs::draw_primary_tabs(frame, app, tabs_area);
    frame.render_widget(
        Paragraph::new(Line::from(badge)).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        ),
        badge_area,
    );
}

/// Lines making up a section's content.
pub fn section_lines(app: &App, id: &str) -> Vec<Line<'static>> {
    if id == HOME_SECTION {
        return cards::feed_lines(app);
    }

    let meta = app.nav.config().meta(id);
    let mut lines = vec![
        Line::from(Span::styled(
            meta.title.clone(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    lines.extend(meta.body.iter().map(|text| Line::from(text.clone())));
    lines
}

/// Natural height of a section as rendered right now.
pub fn section_height(app: &App, id: &str) -> u16 {
    u16::try_from(section_lines(app, id).len()).unwrap_or(u16::MAX)
}

/// Draw the active section, or both sections while a transition slides.
fn draw_content(frame: &mut Frame, app: &App, area: Rect) {
    let area = match app.nav.viewport() {
        Viewport::Locked(height) => Rect {
            height: height.min(area.height),
            ..area
        },
        Viewport::Natural => area,
    };

    let Some(transition) = app.nav.transition() else {
        let paragraph = Paragraph::new(section_lines(app, app.nav.current()))
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0));
        frame.render_widget(paragraph, area);
        return;
    };

    let shift = slide_offset(transition.started_at.elapsed(), area.width);
    let rest = area.width - shift;

    let outgoing = Paragraph::new(section_lines(app, &transition.from));
    let incoming = Paragraph::new(section_lines(app, &transition.to));

    match transition.exit {
        ExitAnimation::SlideOutToLeft => frame.render_widget(
            outgoing.scroll((app.scroll, shift)),
            Rect { width: rest, ..area },
        ),
        ExitAnimation::SlideOutToRight => frame.render_widget(
            outgoing.scroll((app.scroll, 0)),
            Rect {
                x: area.x + shift,
                width: rest,
                ..area
            },
        ),
    }

    match transition.enter {
        EnterAnimation::SlideInFromRight => frame.render_widget(
            incoming,
            Rect {
                x: area.x + rest,
                width: shift,
                ..area
            },
        ),
        EnterAnimation::SlideInFromLeft => frame.render_widget(
            incoming.scroll((0, rest)),
            Rect {
                width: shift,
                ..area
            },
        ),
    }
}

/// Columns the incoming section has moved into view after `elapsed`.
fn slide_offset(elapsed: Duration, width: u16) -> u16 {
    let progress = (elapsed.as_secs_f64() / ENTER_DURATION.as_secs_f64()).clamp(0.0, 1.0);
    (progress * f64::from(width)).round() as u16
}

/// Draw the status bar with keybinding hints.
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec![
        Span::raw(" Tab "),
        Span::styled("Section", Style::default().fg(Color::DarkGray)),
        Span::raw("  ←→ "),
        Span::styled("Subsection", Style::default().fg(Color::DarkGray)),
        Span::styled("  b ", history_style(app.nav.history().can_go_back())),
        Span::styled("Back", Style::default().fg(Color::DarkGray)),
        Span::styled("  f ", history_style(app.nav.history().can_go_forward())),
        Span::styled("Forward", Style::default().fg(Color::DarkGray)),
        Span::raw("  ↑↓ "),
        Span::styled("Scroll", Style::default().fg(Color::DarkGray)),
        Span::raw("  r "),
        Span::styled("Refresh", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ];

    let route = app.nav.config().route_for(app.nav.current());
    hints.push(Span::styled(
        format!("  {}", route),
        Style::default().fg(Color::Cyan),
    ));

    if app.is_refreshing() {
        hints.push(Span::styled("  ⏳ loading", Style::default().fg(Color::Yellow)));
    }

    // Add rate limit info on the right if available
    if let Some(rate) = app.rate_limit().filter(|r| r.limit > 0) {
        let rate_color = if rate.remaining < 10 {
            Color::Red
        } else if rate.remaining < 30 {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        hints.push(Span::styled(
            format!("  API: {}/{}", rate.remaining, rate.limit),
            Style::default().fg(rate_color),
        ));
    }

    let status = Paragraph::new(Line::from(hints));
    frame.render_widget(status, area);
}

fn history_style(available: bool) -> Style {
    if available {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    }
}
