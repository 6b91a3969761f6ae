use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use statuslite_core::model::{ServiceRecord, ServiceStatus};
use statuslite_core::summary::Summary;

use super::state::{AddForm, Field, GRID_COLUMNS, Modal, UiState, ViewMode};
use crate::ui::{format_timestamp, metrics_line, styles, target_label};

const CARD_HEIGHT: u16 = 7;

pub fn draw(f: &mut Frame, ui: &UiState, title: &str, records: &[ServiceRecord]) {
    let area = f.area();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    draw_banner(f, outer[0], ui, title, records);
    draw_section_header(f, outer[1], ui);

    if records.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No monitors yet", styles::text_dim())),
            Line::from(Span::styled("Press a, then n to add one", styles::text_muted())),
        ])
        .alignment(Alignment::Center);
        f.render_widget(empty, outer[2]);
    } else {
        match ui.view {
            ViewMode::List => draw_list(f, outer[2], ui, records),
            ViewMode::Grid => draw_grid(f, outer[2], ui, records),
        }
    }

    draw_footer(f, outer[3], ui);

    match &ui.modal {
        Some(Modal::Add(form)) => draw_add_form(f, area, form),
        Some(Modal::ConfirmDelete { name, .. }) => draw_confirm(f, area, name),
        Some(Modal::Help) => draw_help(f, area),
        None => {}
    }
}

fn draw_banner(f: &mut Frame, area: Rect, ui: &UiState, title: &str, records: &[ServiceRecord]) {
    let summary = Summary::from_records(records);
    let overall = summary.overall;
    // nothing to report on an empty page
    let tone = styles::tone((!records.is_empty()).then_some(overall));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(tone.border))
        .title(Span::styled(format!(" {} ", title), styles::title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(30)])
        .split(inner);

    let left = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ● ", Style::default().fg(tone.accent)),
            Span::styled(
                "SYSTEM STATUS",
                Style::default().fg(tone.text).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", summary.headline()), styles::title())),
    ]);
    f.render_widget(left, cols[0]);

    let updated = if ui.checking {
        "checking...".to_string()
    } else {
        ui.last_checked
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string())
    };

    let right = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Active Monitors: ", styles::text_dim()),
            Span::styled(summary.monitors.to_string(), styles::text()),
            Span::raw(" "),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Last updated: ", styles::text_muted()),
            Span::styled(updated, styles::text_dim()),
            Span::raw(" "),
        ]),
    ])
    .alignment(Alignment::Right);
    f.render_widget(right, cols[1]);
}

fn draw_section_header(f: &mut Frame, area: Rect, ui: &UiState) {
    let mut spans = vec![Span::styled(" Services Dashboard", styles::title())];
    spans.push(Span::styled(
        match ui.view {
            ViewMode::List => "  (list)",
            ViewMode::Grid => "  (grid)",
        },
        styles::text_muted(),
    ));
    if ui.admin {
        spans.push(Span::styled("  ADMIN", styles::key_hint()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn badge(status: ServiceStatus) -> Span<'static> {
    Span::styled(
        format!("{} {}", styles::status_icon(status), status.label().to_uppercase()),
        styles::badge(status),
    )
}

fn draw_list(f: &mut Frame, area: Rect, ui: &UiState, records: &[ServiceRecord]) {
    let items: Vec<ListItem> = records
        .iter()
        .map(|record| {
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(record.name.clone(), styles::title()),
                    Span::raw("  "),
                    badge(record.status),
                ]),
                Line::from(vec![
                    Span::styled(format!("  {}", record.description), styles::text_dim()),
                    Span::styled(format!(" · {}", target_label(record)), styles::text_muted()),
                ]),
            ];
            if let Some(metrics) = metrics_line(record) {
                lines.push(Line::from(Span::styled(
                    format!("  {}", metrics),
                    styles::text_muted(),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_subtle()),
        )
        .highlight_style(styles::selection())
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    list_state.select(Some(ui.selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_grid(f: &mut Frame, area: Rect, ui: &UiState, records: &[ServiceRecord]) {
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = ui.selected / GRID_COLUMNS;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let rows: Vec<&[ServiceRecord]> = records.chunks(GRID_COLUMNS).collect();

    for (offset, row) in rows.iter().skip(first_row).take(visible_rows).enumerate() {
        let row_area = Rect {
            x: area.x,
            y: area.y + offset as u16 * CARD_HEIGHT,
            width: area.width,
            height: CARD_HEIGHT.min(area.height),
        };
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(row_area);

        for (col, record) in row.iter().enumerate() {
            let index = (first_row + offset) * GRID_COLUMNS + col;
            draw_card(f, cells[col], record, index == ui.selected);
        }
    }
}

fn draw_card(f: &mut Frame, area: Rect, record: &ServiceRecord, selected: bool) {
    let border = if selected {
        styles::border_focused()
    } else {
        styles::status_border(record.status)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", record.name), styles::title()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(badge(record.status)),
        Line::from(Span::styled(record.description.clone(), styles::text_dim())),
        Line::from(Span::styled(target_label(record), styles::text_muted())),
    ];
    if let Some(metrics) = metrics_line(record) {
        lines.push(Line::from(Span::styled(metrics, styles::text())));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn draw_footer(f: &mut Frame, area: Rect, ui: &UiState) {
    let mut hints: Vec<(&str, &str)> = vec![
        ("q", "quit"),
        ("?", "help"),
        ("c", "check all"),
        ("v", "view"),
        ("a", "admin"),
    ];
    if ui.admin {
        hints.extend([("n", "add"), ("d", "delete"), ("space", "cycle")]);
    }

    let mut spans = vec![Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(key, styles::key_hint()));
        spans.push(Span::styled(format!(" {}  ", label), styles::text_muted()));
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(40)])
        .split(area);
    f.render_widget(Paragraph::new(Line::from(spans)), cols[0]);

    if let Some(flash) = &ui.flash {
        let style = if flash.error {
            styles::error()
        } else {
            styles::text_dim()
        };
        let msg = Paragraph::new(Span::styled(format!("{} ", flash.text), style))
            .alignment(Alignment::Right);
        f.render_widget(msg, cols[1]);
    }
}

/// Centered rect of at most `width` x `height`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

fn draw_add_form(f: &mut Frame, area: Rect, form: &AddForm) {
    let rect = centered(area, 60, 12);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .title(" Add Monitor ");
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let mut lines = Vec::new();
    for field in Field::ALL {
        let label_style = if field == form.focus {
            styles::key_hint()
        } else {
            styles::text_dim()
        };
        lines.push(Line::from(Span::styled(field.label(), label_style)));
        lines.push(Line::from(Span::styled(
            format!("  {}", form.value(field)),
            styles::text(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(match &form.error {
        Some(err) => Line::from(Span::styled(err.clone(), styles::error())),
        None => Line::from(""),
    });
    lines.push(Line::from(vec![
        Span::styled("Enter", styles::key_hint()),
        Span::styled(" save  ", styles::text_muted()),
        Span::styled("Tab", styles::key_hint()),
        Span::styled(" next field  ", styles::text_muted()),
        Span::styled("Esc", styles::key_hint()),
        Span::styled(" cancel", styles::text_muted()),
    ]));
    f.render_widget(Paragraph::new(lines), inner);

    let row = Field::ALL
        .iter()
        .position(|fld| *fld == form.focus)
        .unwrap_or(0) as u16;
    let value_len = form.value(form.focus).chars().count() as u16;
    let cursor_x = (inner.x + 2 + value_len).min(inner.right().saturating_sub(1));
    let cursor_y = inner.y + row * 2 + 1;
    if cursor_y < inner.bottom() {
        f.set_cursor_position((cursor_x, cursor_y));
    }
}

fn draw_confirm(f: &mut Frame, area: Rect, name: &str) {
    let rect = centered(area, 50, 5);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::status_border(ServiceStatus::Outage))
        .title(" Delete ");
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let lines = vec![
        Line::from(Span::styled(
            format!("Delete monitor \"{}\"?", name),
            styles::text(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", styles::key_hint()),
            Span::styled(" delete  ", styles::text_muted()),
            Span::styled("n", styles::key_hint()),
            Span::styled(" keep", styles::text_muted()),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let rect = centered(area, 50, 18);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_focused())
        .title(" Help - Press ? or Esc to close ");
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let entry = |key: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<8}", key), styles::key_hint()),
            Span::styled(text, styles::text()),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("VIEW", styles::title())),
        entry("↑/↓ j/k", "Move selection"),
        entry("←/→ h/l", "Move within a grid row"),
        entry("v", "Toggle list / grid"),
        entry("c", "Check all services"),
        Line::from(""),
        Line::from(Span::styled("ADMIN", styles::title())),
        entry("a", "Toggle admin mode"),
        entry("n", "Add monitor"),
        entry("d", "Delete selected"),
        entry("space", "Cycle status"),
        Line::from(""),
        entry("?", "Help"),
        entry("q", "Quit"),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(ui: &UiState, records: &[ServiceRecord]) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal.draw(|f| draw(f, ui, "Acme Status", records)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn records() -> Vec<ServiceRecord> {
        vec![
            ServiceRecord::new("1", "GitHub").with_url("https://api.github.com"),
            ServiceRecord::new("2", "Billing").with_status(ServiceStatus::Outage),
        ]
    }

    #[test]
    fn test_banner_shows_overall_status() {
        let screen = render(&UiState::default(), &records());
        assert!(screen.contains("System Outage"));
        assert!(screen.contains("Acme Status"));
        assert!(screen.contains("Active Monitors: 2"));
        assert!(screen.contains("never"));
    }

    #[test]
    fn test_grid_and_modals_render() {
        let mut ui = UiState {
            view: ViewMode::Grid,
            admin: true,
            ..UiState::default()
        };
        let screen = render(&ui, &records());
        assert!(screen.contains("OUTAGE"));
        assert!(screen.contains("internal"));

        ui.modal = Some(Modal::ConfirmDelete {
            id: "2".into(),
            name: "Billing".into(),
        });
        assert!(render(&ui, &records()).contains("Delete monitor \"Billing\"?"));

        ui.modal = Some(Modal::Add(AddForm::default()));
        assert!(render(&ui, &records()).contains("Add Monitor"));
    }

    fn banner_border(records: &[ServiceRecord]) -> ratatui::style::Color {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        terminal
            .draw(|f| draw(f, &UiState::default(), "Acme Status", records))
            .unwrap();
        terminal.backend().buffer()[(0, 0)].fg
    }

    #[test]
    fn test_empty_store() {
        let screen = render(&UiState::default(), &[]);
        assert!(screen.contains("All Systems Operational"));
        assert!(screen.contains("No monitors yet"));
    }

    #[test]
    fn test_banner_border_follows_overall_status() {
        assert_eq!(banner_border(&[]), styles::tone(None).border);
        assert_eq!(
            banner_border(&records()),
            styles::tone(Some(ServiceStatus::Outage)).border
        );
        let healthy = [ServiceRecord::new("1", "GitHub")];
        assert_eq!(
            banner_border(&healthy),
            styles::tone(Some(ServiceStatus::Operational)).border
        );
    }
}
