// Repository card rendering.
// Produces the lines of the projects view: cards, fork comparisons, and degraded-state notices.

use std::time::Duration;

use ratatui::prelude::*;

use crate::app::{App, LoadingState};
use crate::feed::{ForkCard, RenderableFeed, RepoCard, StarBadge, UpstreamState};

const ACCENT: Color = Color::Rgb(0xE0, 0x7B, 0x53);
const LINK: Color = Color::Rgb(0x04, 0xa5, 0xe5);

/// Parse `#rrggbb` into a colour.
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::Gray;
    }
    let channel = |i: usize| {
        digits
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

/// Badge text and style for the header.
pub fn badge_span(badge: StarBadge) -> Span<'static> {
    match badge {
        StarBadge::Loading => Span::styled(" ⭐ … ", Style::default().fg(Color::DarkGray)),
        StarBadge::Count(n) => Span::styled(
            format!(" ⭐ {} on github ", n),
            Style::default().fg(Color::Yellow),
        ),
        StarBadge::Failed => Span::styled(
            " ⭐ failed to fetch ",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        ),
    }
}

/// Lines for the projects view.
pub fn feed_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "projects",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];

    match &app.feed {
        LoadingState::Idle | LoadingState::Loading => {
            lines.push(Line::from(Span::styled(
                "⏳ loading repos...",
                Style::default().fg(Color::Yellow),
            )));
        }
        LoadingState::Loaded(feed) => {
            let elapsed = app
                .feed_shown_at
                .map(|t| t.elapsed())
                .unwrap_or(Duration::MAX);
            push_feed(&mut lines, feed, elapsed);
        }
    }

    lines
}

fn push_feed(lines: &mut Vec<Line<'static>>, feed: &RenderableFeed, elapsed: Duration) {
    if feed.badge == StarBadge::Failed {
        lines.push(Line::from(Span::styled(
            "failed to load repos (github api is being mean)",
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(vec![
            Span::styled("just visit ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                feed.profile_url.clone(),
                Style::default().fg(LINK).add_modifier(Modifier::UNDERLINED),
            ),
        ]));
        push_error(lines, feed);
        return;
    }

    if feed.is_stale() {
        lines.push(Line::from(Span::styled(
            "// showing cached data (github api is being mean)",
            Style::default().fg(Color::Yellow),
        )));
        push_error(lines, feed);
        lines.push(Line::default());
    }

    if feed.own.is_empty() {
        lines.push(Line::from(Span::styled(
            "no repos to show",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for card in feed.own.iter().filter(|c| c.is_visible(elapsed)) {
        push_card(lines, card, None);
    }

    let visible_forks: Vec<&ForkCard> = feed
        .forks
        .iter()
        .filter(|f| f.card.is_visible(elapsed))
        .collect();
    if !visible_forks.is_empty() {
        lines.push(Line::from(Span::styled(
            "forks",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());
        for fork in visible_forks {
            push_card(lines, &fork.card, Some(fork));
        }
    }
}

fn push_error(lines: &mut Vec<Line<'static>>, feed: &RenderableFeed) {
    if let Some(error) = &feed.error {
        lines.push(Line::from(Span::styled(
            format!("({})", error),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        )));
    }
}

fn push_card(lines: &mut Vec<Line<'static>>, card: &RepoCard, fork: Option<&ForkCard>) {
    let title_color = if card.vibecoded { ACCENT } else { LINK };

    let mut header = vec![
        Span::styled(
            card.name.clone(),
            Style::default().fg(title_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ⭐ {}", card.stars), Style::default().fg(Color::Yellow)),
    ];
    if let Some(fork) = fork {
        if let UpstreamState::Known(stars) = fork.upstream {
            let upstream = fork.upstream_name.as_deref().unwrap_or("upstream");
            header.push(Span::styled(
                format!("  ({} ⭐ {})", upstream, stars),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }
    lines.push(Line::from(header));

    lines.push(Line::from(Span::styled(
        card.description.clone(),
        Style::default().fg(Color::Gray),
    )));

    let mut footer = Vec::new();
    if let Some((language, color)) = &card.language {
        footer.push(Span::styled("● ", Style::default().fg(hex_color(color))));
        footer.push(Span::raw(language.clone()));
        footer.push(Span::raw("  "));
    }
    for topic in &card.topics {
        footer.push(Span::styled(
            format!("#{} ", topic),
            Style::default().fg(title_color),
        ));
    }
    if !footer.is_empty() {
        lines.push(Line::from(footer));
    }

    lines.push(Line::from(Span::styled(
        card.url.clone(),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::default());
}
