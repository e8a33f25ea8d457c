// Tab bars for section navigation.
// Primary tabs are always shown; secondary tabs only for groups that have children.

use ratatui::{prelude::*, widgets::*};

use crate::app::App;

/// Draw the primary tab bar at the top of the screen.
pub fn draw_primary_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let primaries = app.nav.config().primaries();
    let active = &app.nav.tabs().active_primary;

    let tab_titles: Vec<Line> = primaries
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let style = if group.key == *active {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(group.title.clone(), style),
            ])
        })
        .collect();

    let selected_index = primaries
        .iter()
        .position(|p| p.key == *active)
        .unwrap_or(0);

    let tabs_widget = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" {} ", app.account()))
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(selected_index)
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw(" │ "));

    frame.render_widget(tabs_widget, area);
}

/// Draw the secondary tab bar for the active group. Nothing is drawn when the group has no children.
pub fn draw_secondary_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = app.nav.tabs();
    if !tabs.secondary_visible() {
        return;
    }

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.secondary.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(Color::DarkGray)));
        }
        let style = if tabs.is_secondary_active(tab) {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(tab.title.clone(), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
