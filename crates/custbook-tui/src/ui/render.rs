use custbook_core::cache::CacheSnapshot;
use custbook_core::models::Customers;
use custbook_core::submission::Field;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{header_title, App, AppState, DialogFocus};
use crate::utils::{tail, truncate};

use super::styles;

/// Width of the add-customer dialog
const DIALOG_WIDTH: u16 = 60;

/// Visible characters inside a dialog text input
const INPUT_WIDTH: usize = 44;

pub fn render(frame: &mut Frame, app: &App) {
    // Clone so the cache is never blocked on a draw
    let snapshot = app.customers().clone();

    let banner_height = if snapshot.error.is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Title bar
            Constraint::Length(banner_height), // Error banner
            Constraint::Min(5),                // Customer table
            Constraint::Length(2),             // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_error_banner(frame, &snapshot, chunks[1]);
    render_customer_table(frame, app, &snapshot, chunks[2]);
    render_status_bar(frame, app, &snapshot, chunks[3]);

    // Render overlays
    match app.state {
        AppState::AddingCustomer => render_dialog(frame, app),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Dwolla | Customers";
    let help_hint = "[a] Add Customer  [?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_error_banner(frame: &mut Frame, snapshot: &CacheSnapshot<Customers>, area: Rect) {
    if let Some(ref error) = snapshot.error {
        let line = Line::from(format!(" Error: {}", error.message));
        frame.render_widget(Paragraph::new(line).style(styles::banner_style()), area);
    }
}

fn render_customer_table(
    frame: &mut Frame,
    app: &App,
    snapshot: &CacheSnapshot<Customers>,
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" {} ", header_title(snapshot)))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.state == AppState::Normal));

    let customers = snapshot.data.as_deref().unwrap_or_default();

    // Placeholder rows
    let placeholder = if snapshot.is_loading() {
        Some("Loading customers...")
    } else if customers.is_empty() {
        Some("No customers found")
    } else {
        None
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(text, styles::muted_style())).centered(),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([Cell::from("Name"), Cell::from("Email")])
        .style(styles::title_style())
        .height(1);

    let name_width = (area.width as usize * 45 / 100).saturating_sub(2);
    let rows: Vec<Row> = customers
        .iter()
        .enumerate()
        .map(|(i, customer)| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(truncate(&customer.display_name(), name_width)),
                Cell::from(customer.email.clone()),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Percentage(45), Constraint::Fill(1)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_status_bar(
    frame: &mut Frame,
    app: &App,
    snapshot: &CacheSnapshot<Customers>,
    area: Rect,
) {
    let shortcuts = "[a]dd | [u]pdate | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if snapshot.is_validating() && !snapshot.is_loading() {
        " Refreshing... ".to_string()
    } else {
        format!(" Updated {} ", snapshot.age_display())
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_dialog(frame: &mut Frame, app: &App) {
    let form = app.form.form();
    let errors = app.form.field_errors();
    let submitting = app.form.is_submitting();

    let mut lines = vec![Line::from("")];

    for field in Field::ALL {
        let focused = app.dialog_focus == DialogFocus::Field(field);
        let invalid = errors.has_error(field);

        let mut label = vec![Span::styled(
            format!("  {}", field.label()),
            styles::muted_style(),
        )];
        if field.is_required() {
            label.push(Span::styled(" *", styles::required_marker_style()));
        }
        lines.push(Line::from(label));

        let text = input_text(form.value(field), focused && !submitting);
        lines.push(Line::from(vec![
            Span::styled("  [", styles::field_border_style(focused, invalid)),
            Span::styled(text, styles::input_style(focused)),
            Span::styled("]", styles::field_border_style(focused, invalid)),
        ]));

        let helper = if invalid { field.error_message() } else { "" };
        lines.push(Line::from(Span::styled(
            format!("  {}", helper),
            styles::error_style(),
        )));
    }

    if let Some(error) = app.form.submit_error() {
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate(error, DIALOG_WIDTH as usize - 6)),
            styles::error_style(),
        )));
        lines.push(Line::from(""));
    }

    lines.push(button_line(app.dialog_focus, submitting));

    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(DIALOG_WIDTH, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Add New Customer ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Visible part of a text input: the end of the value, the cursor right after
/// it when focused, padded to a fixed width.
fn input_text(value: &str, show_cursor: bool) -> String {
    let cursor = if show_cursor { "▌" } else { "" };
    format!(
        "{:<width$}",
        format!("{}{}", tail(value, INPUT_WIDTH), cursor),
        width = INPUT_WIDTH + 1
    )
}

fn button_line(focus: DialogFocus, submitting: bool) -> Line<'static> {
    let button = |label: &'static str, focused: bool| {
        if focused {
            Span::styled(format!(" ▶ {} ◀ ", label), styles::button_style(true))
        } else {
            Span::styled(format!("   {}   ", label), styles::button_style(false))
        }
    };

    if submitting {
        return Line::from(Span::styled(
            "                  Adding customer...",
            styles::highlight_style(),
        ));
    }

    Line::from(vec![
        Span::raw("            ["),
        button("Cancel", focus == DialogFocus::Cancel),
        Span::raw("]    ["),
        button("Create", focus == DialogFocus::Create),
        Span::raw("]"),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 20, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_line = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  Dwolla | Customers", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Customers", styles::highlight_style())),
        help_line("↑/↓", "Select customer"),
        help_line("PgUp/PgDn", "Scroll a page"),
        help_line("a", "Add customer"),
        help_line("u", "Update list"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Add Customer", styles::highlight_style())),
        help_line("Tab/↑/↓", "Move between fields"),
        help_line("Enter", "Next field / press button"),
        help_line("Esc", "Cancel"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use custbook_core::api::{ApiClient, Response};
    use custbook_core::models::Customer;
    use custbook_core::testing::InMemoryServer;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    async fn loaded_app(server: Arc<InMemoryServer>) -> App {
        let mut app = App::new(ApiClient::new(server));
        for _ in 0..200 {
            app.check_background_tasks();
            if app.customers().is_settled() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        app
    }

    #[test]
    fn test_centered_rect_fixed() {
        let rect = centered_rect_fixed(20, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(rect, Rect::new(40, 20, 20, 10));

        // Clamped to the available area
        let rect = centered_rect_fixed(200, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(rect.width, 100);
    }

    #[test]
    fn test_input_text_cursor_follows_value() {
        let text = input_text("Jane", true);
        assert!(text.starts_with("Jane▌ "));
        assert_eq!(text.chars().count(), INPUT_WIDTH + 1);

        let unfocused = input_text("Jane", false);
        assert!(!unfocused.contains('▌'));
        assert_eq!(unfocused.chars().count(), INPUT_WIDTH + 1);

        // Long values scroll so the cursor stays inside the box
        let long = "x".repeat(INPUT_WIDTH + 10);
        let text = input_text(&long, true);
        assert!(text.ends_with('▌'));
        assert_eq!(text.chars().count(), INPUT_WIDTH + 1);
    }

    #[tokio::test]
    async fn test_render_empty_list() {
        let app = loaded_app(Arc::new(InMemoryServer::new())).await;
        let screen = draw(&app);
        assert!(screen.contains("0 Customers"));
        assert!(screen.contains("No customers found"));
    }

    #[tokio::test]
    async fn test_render_customers_and_error_banner() {
        let server = Arc::new(InMemoryServer::with_customers(vec![Customer {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "j@d.com".to_string(),
            business_name: Some("Acme".to_string()),
        }]));
        let app = loaded_app(server.clone()).await;
        let screen = draw(&app);
        assert!(screen.contains("1 Customers"));
        assert!(screen.contains("Acme"));
        assert!(screen.contains("j@d.com"));

        server.fail_reads(Response::new(500, r#"{"code": "Internal", "message": "db down"}"#));
        app.cache.revalidate(custbook_core::api::CUSTOMERS_KEY).await;
        let screen = draw(&app);
        assert!(screen.contains("Error: db down"));
        // Stale rows stay visible
        assert!(screen.contains("Acme"));
    }

    #[tokio::test]
    async fn test_render_dialog_with_field_errors() {
        let mut app = loaded_app(Arc::new(InMemoryServer::new())).await;
        app.open_dialog();
        app.dialog_focus = DialogFocus::Create;
        app.submit_dialog();

        let screen = draw(&app);
        assert!(screen.contains("Add New Customer"));
        assert!(screen.contains("First name is required"));
        assert!(screen.contains("Last name is required"));
        assert!(screen.contains("Valid email is required"));
    }
}
