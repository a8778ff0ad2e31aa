use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::cli::state::{self, App, DebtForm, FormField, Prompt};
use crate::cli::util::{fmt_date, fmt_integer, fmt_money, short_id};
use crate::debts::strategy::Decision;
use crate::debts::view::{Highlight, SortColumn, SortDirection};

const COLUMNS: [SortColumn; 6] = [
    SortColumn::Description,
    SortColumn::Amount,
    SortColumn::Status,
    SortColumn::InstallmentAmount,
    SortColumn::Installments,
    SortColumn::CreatedAt,
];

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // top tabs | main content | bottom status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)])
        .split(size);

    let titles = ["Debts", "Strategy", "Help"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(match app.tab { state::Tab::Debts => 0, state::Tab::Strategy => 1, state::Tab::Help => 2 })
        .block(Block::default().borders(Borders::ALL).title("Debt Tracker"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, root[0]);

    match app.tab {
        state::Tab::Debts => draw_debts(f, root[1], app),
        state::Tab::Strategy => draw_strategy(f, root[1], app),
        state::Tab::Help => draw_help(f, root[1]),
    }

    f.render_widget(Paragraph::new(app.status.as_str()), root[2]);

    if let Some(form) = &app.form {
        let area = center_rect(root[1], 64, 14);
        f.render_widget(Clear, area);
        draw_form(f, area, form);
    }
    if let Some(prompt) = &app.prompt {
        let area = center_rect(root[1], 50, 6);
        f.render_widget(Clear, area);
        draw_prompt(f, area, prompt);
    }
}

fn row_style(highlight: Highlight) -> Style {
    match highlight {
        Highlight::Strategy => Style::default().bg(Color::Yellow).fg(Color::Black),
        Highlight::Paid => Style::default().fg(Color::Green),
        Highlight::Overdue => Style::default().fg(Color::Red),
        Highlight::Normal => Style::default(),
    }
}

// Debts Page

fn draw_debts(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    // search + filter bar
    let filter = app
        .debts
        .table
        .status_filter()
        .map(|s| s.as_str())
        .unwrap_or("All");
    let bar = Paragraph::new(format!(
        "Search: {}    Status: {}",
        app.debts.search.rendered(app.debts.searching),
        filter
    ))
    .block(Block::default().borders(Borders::ALL).title("/ search, f filter"));
    f.render_widget(bar, chunks[0]);

    let table = &app.debts.table;
    let sorted = table.sorted_by();
    let header = Row::new(COLUMNS.iter().map(|c| {
        let arrow = match sorted {
            Some((col, SortDirection::Asc)) if col == *c => " ▲",
            Some((col, SortDirection::Desc)) if col == *c => " ▼",
            _ => "",
        };
        Cell::from(format!("{}{}", c.label(), arrow))
    }))
    .style(Style::default().add_modifier(Modifier::BOLD))
    .height(1);

    let body: Vec<Row> = table.rows().iter().map(|d| {
        Row::new(vec![
            Cell::from(d.description.clone()),
            Cell::from(fmt_money(&d.amount)),
            Cell::from(d.status.as_str()),
            Cell::from(fmt_money(&d.installment_amount)),
            Cell::from(fmt_integer(d.installments)),
            Cell::from(fmt_date(&d.created_at)),
        ])
        .style(row_style(table.highlight(d)))
    }).collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Length(14),
        Constraint::Length(9),
        Constraint::Length(14),
        Constraint::Length(13),
        Constraint::Length(11),
    ];

    let (showing, total) = table.showing();
    let t = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Debts  (Showing {showing} of {total})")),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let totals = table.totals();
    let footer = Paragraph::new(format!(
        "Total: {}    Monthly (multi-installment): {}",
        fmt_money(&totals.amount),
        fmt_money(&totals.installment_amount)
    ))
    .block(Block::default().borders(Borders::ALL));

    f.render_stateful_widget(t, chunks[1], &mut app.debts.sel);
    f.render_widget(footer, chunks[2]);
}

fn draw_form(f: &mut Frame, area: Rect, form: &DebtForm) {
    let focused = form.focused();
    let mut lines: Vec<Line> = form
        .fields()
        .iter()
        .map(|&field| {
            let is_focused = field == focused;
            let value = match field {
                FormField::Status => format!("< {} >", form.status),
                FormField::Description => form.description.rendered(is_focused),
                FormField::Amount => form.amount.rendered(is_focused),
                FormField::Installments => form.installments.rendered(is_focused),
                FormField::Quota => form.quota.rendered(is_focused),
            };
            let mut spans = vec![
                Span::styled(
                    format!("{:<13}: ", field.label()),
                    if is_focused {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    },
                ),
                Span::raw(value),
            ];
            if let Some(message) = form.errors.for_field(field.key()) {
                spans.push(Span::styled(format!("  * ({message})"), Style::default().fg(Color::Red)));
            }
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    if form.editing.is_none() {
        lines.push(Line::from("Give Installments, or a Quota to derive them."));
    }
    lines.push(Line::from("TAB: switch field | ←/→: Status | Enter: save | Esc: cancel"));

    let title = if form.editing.is_some() { "Edit Debt" } else { "New Debt" };
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn draw_prompt(f: &mut Frame, area: Rect, prompt: &Prompt) {
    let mut lines = vec![Line::from(prompt.input.rendered(true))];
    if let state::PromptKind::PartialPay { outstanding, .. } = &prompt.kind {
        lines.push(Line::from(format!("Outstanding: {}", fmt_money(outstanding))));
    }
    if let Some(err) = &prompt.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(prompt.title()));
    f.render_widget(p, area);
}

// Strategy Page

fn draw_strategy(f: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.strategy.budget {
        Some(budget) => format!("Best strategy for {}  (preview only)", fmt_money(&budget)),
        None => "Best strategy  (press b on the Debts tab)".to_string(),
    };

    let items: Vec<ListItem> = app
        .strategy
        .allocations
        .iter()
        .map(|a| {
            let name = app
                .debts
                .table
                .data()
                .iter()
                .find(|d| d.id == a.debt_id)
                .map(|d| d.description.clone())
                .unwrap_or_else(|| short_id(&a.debt_id).to_string());
            let action = match &a.decision {
                Decision::PayInFull => "pay in full".to_string(),
                Decision::PayPartial(amount) => format!("pay {}", fmt_money(amount)),
            };
            ListItem::new(vec![
                Line::from(format!("{name}: {action}  (score {:.4})", a.monthly_reduction)),
                Line::from(Span::styled(
                    format!("    {}", a.rationale),
                    Style::default().add_modifier(Modifier::DIM),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(list, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        "Global Keys:",
        "  q        : Quit App",
        "  ?        : Help tab",
        "  Tab      : Switch tabs (Debts -> Strategy -> Help)",
        "",
        "Debts Tab:",
        "  Up/Down  : Navigate list",
        "  1-5      : Sort by Desc/Amount/Status/Quota/Installments (again to reverse)",
        "  /        : Search descriptions (Enter/Esc to stop typing)",
        "  f        : Cycle status filter (All, Pending, Paid, Overdue)",
        "  n        : New debt",
        "  e        : Edit selected debt",
        "  p        : Pay selected debt in full",
        "  o        : Partial payment on selected debt",
        "  x/Del    : Delete selected debt",
        "  b        : Calculate best strategy for a budget (preview)",
        "  c        : Clear strategy preview",
        "  r        : Refresh from database",
        "",
        "Forms:",
        "  Tab      : Next field",
        "  Left/Right on Status : Change status",
        "  Enter    : Save",
        "  Esc      : Cancel",
    ].join("\n");

    let p = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help & Keybindings"));

    f.render_widget(p, area);
}

fn center_rect(rect: Rect, w: u16, h: u16) -> Rect {
    let x = rect.x + rect.width.saturating_sub(w) / 2;
    let y = rect.y + rect.height.saturating_sub(h) / 2;
    Rect { x, y, width: w.min(rect.width), height: h.min(rect.height) }
}
