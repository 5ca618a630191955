//! `hela dashboard`: a text summary, or a ratatui screen with a monthly
//! income/expense bar chart, category breakdown and budget gauges.

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hela_core::{
    Budget, BudgetStatus, IncomeStream, SavingsGoal, Summary, TransactionRecord, projected_monthly_income,
};
use hela_finance::RecordStore;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::io::{self, Stdout};
use tracing::debug;

use crate::app::App;
use crate::fmt::{money, percent};

/// Months shown in the bar chart
const CHART_MONTHS: usize = 6;

/// Everything the dashboard shows, computed once up front
pub struct DashboardView {
    pub title: String,
    pub summary: Summary,
    /// Monthly series over all records, last `CHART_MONTHS` months
    pub chart: Vec<hela_core::MonthlyTotals>,
    pub budgets: Vec<(Budget, BudgetStatus)>,
    pub goals: Vec<SavingsGoal>,
    pub projected_income: Decimal,
}

impl DashboardView {
    pub fn build(
        records: &[TransactionRecord],
        budgets: Vec<Budget>,
        goals: Vec<SavingsGoal>,
        streams: &[IncomeStream],
        range: Option<(NaiveDate, NaiveDate)>,
        today: NaiveDate,
    ) -> Self {
        let title = match range {
            Some((start, _)) => start.format("%B %Y").to_string(),
            None => "All time".to_string(),
        };

        // Budgets are judged at today, or at the end of a past month being viewed
        let as_of = match range {
            Some((start, end)) if today < start || today > end => end,
            _ => today,
        };
        let mut budgets: Vec<(Budget, BudgetStatus)> = budgets
            .into_iter()
            .map(|b| {
                let status = b.status(records, as_of);
                (b, status)
            })
            .collect();
        budgets.sort_by(|a, b| b.1.percent_used.cmp(&a.1.percent_used));

        let all = Summary::build(records, None);
        let skip = all.monthly.len().saturating_sub(CHART_MONTHS);
        let chart = all.monthly[skip..].to_vec();

        Self {
            title,
            summary: Summary::build(records, range),
            chart,
            budgets,
            goals,
            projected_income: projected_monthly_income(streams),
        }
    }
}

pub fn run(app: &App, month: Option<String>, tui: bool) -> Result<()> {
    let range = month.as_deref().map(hela_core::time::parse_month).transpose()?;
    let records = app.session().transactions()?;
    let budgets = app.store::<Budget>().list(app.user())?;
    let goals = app.store::<SavingsGoal>().list(app.user())?;
    let streams = app.store::<IncomeStream>().list(app.user())?;
    debug!(
        transactions = records.len(),
        budgets = budgets.len(),
        goals = goals.len(),
        "building dashboard"
    );

    let view = DashboardView::build(&records, budgets, goals, &streams, range, app.today()?);
    let currency = app.cfg.display.currency.clone();

    if tui {
        run_tui(&view, &currency)
    } else {
        print!("{}", render_text(&view, &currency));
        Ok(())
    }
}

pub fn render_text(view: &DashboardView, currency: &str) -> String {
    let s = &view.summary;
    let mut out = String::new();
    out.push_str(&format!("{}\n", view.title));
    out.push_str(&format!("  Income:   {}\n", money(s.total_income, currency)));
    out.push_str(&format!("  Expenses: {}\n", money(s.total_expense, currency)));
    out.push_str(&format!("  Net:      {}\n", money(s.net, currency)));
    if let Some(rate) = s.savings_rate() {
        out.push_str(&format!("  Saved:    {}\n", percent(rate)));
    }
    if view.projected_income > Decimal::ZERO {
        out.push_str(&format!(
            "  Projected monthly income: {}\n",
            money(view.projected_income, currency)
        ));
    }

    if s.transaction_count == 0 {
        out.push_str("\nNo transactions in this period.\n");
    }

    if !s.by_category.is_empty() {
        out.push_str("\nSpending by category\n");
        for c in &s.by_category {
            let share = if s.total_expense > Decimal::ZERO {
                percent(c.total / s.total_expense)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {:<14} {:>16} {:>5}  ({} tx)\n",
                c.category.label(),
                money(c.total, currency),
                share,
                c.transaction_count
            ));
        }
    }

    if !view.budgets.is_empty() {
        out.push_str("\nBudgets\n");
        for (b, st) in &view.budgets {
            out.push_str(&format!(
                "  {:<14} {:>16} of {:>16}  {}%{}\n",
                b.category.label(),
                money(st.spent, currency),
                money(b.limit, currency),
                st.percent_used,
                if st.over_budget { "  OVER" } else { "" }
            ));
        }
    }

    if !view.goals.is_empty() {
        out.push_str("\nSavings goals\n");
        for g in &view.goals {
            out.push_str(&format!(
                "  {:<24} {:>16} of {:>16}  {}\n",
                g.name,
                money(g.saved, currency),
                money(g.target, currency),
                percent(g.progress())
            ));
        }
    }

    out
}

fn run_tui(view: &DashboardView, currency: &str) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, view, currency);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    view: &DashboardView,
    currency: &str,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, view, currency))?;

        if event::poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, view: &DashboardView, currency: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, rows[0], view, currency);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    draw_chart(f, cols[0], view);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(cols[1]);
    draw_categories(f, right[0], view, currency);
    draw_budgets(f, right[1], view);

    let footer = Paragraph::new(Span::styled("q: quit", Style::default().fg(Color::Gray)))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, rows[2]);
}

fn draw_header(f: &mut Frame, area: Rect, view: &DashboardView, currency: &str) {
    let s = &view.summary;
    let net_color = if s.net < Decimal::ZERO { Color::Red } else { Color::Green };
    let text = Text::from(vec![
        Line::from(vec![
            Span::styled("Income ", Style::default().fg(Color::Gray)),
            Span::styled(money(s.total_income, currency), Style::default().fg(Color::Green)),
            Span::raw("   "),
            Span::styled("Expenses ", Style::default().fg(Color::Gray)),
            Span::styled(money(s.total_expense, currency), Style::default().fg(Color::Red)),
        ]),
        Line::from(vec![
            Span::styled("Net ", Style::default().fg(Color::Gray)),
            Span::styled(
                money(s.net, currency),
                Style::default().fg(net_color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                format!("{} transactions", s.transaction_count),
                Style::default().fg(Color::Gray),
            ),
        ]),
    ]);
    let header = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!("hela: {}", view.title),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(header, area);
}

fn whole(value: Decimal) -> u64 {
    value.round().to_u64().unwrap_or(0)
}

fn draw_chart(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default().borders(Borders::ALL).title("income / expenses by month");
    if view.chart.is_empty() {
        f.render_widget(Paragraph::new("No transactions yet.").block(block), area);
        return;
    }

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(5)
        .bar_gap(1)
        .group_gap(2);
    for m in &view.chart {
        let bars = [
            Bar::default()
                .value(whole(m.income))
                .text_value(String::new())
                .style(Style::default().fg(Color::Green)),
            Bar::default()
                .value(whole(m.expense))
                .text_value(String::new())
                .style(Style::default().fg(Color::Red)),
        ];
        chart = chart.data(BarGroup::default().label(Line::from(m.label())).bars(&bars));
    }
    f.render_widget(chart, area);
}

fn draw_categories(f: &mut Frame, area: Rect, view: &DashboardView, currency: &str) {
    let s = &view.summary;
    let lines: Vec<Line> = if s.by_category.is_empty() {
        vec![Line::raw("No spending in this period.")]
    } else {
        s.top_categories(area.height.saturating_sub(2) as usize)
            .iter()
            .map(|c| {
                Line::from(vec![
                    Span::styled(format!("{:<14}", c.category.label()), Style::default().fg(Color::Cyan)),
                    Span::raw(format!("{:>16}", money(c.total, currency))),
                ])
            })
            .collect()
    };
    let widget = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("spending by category"));
    f.render_widget(widget, area);
}

fn draw_budgets(f: &mut Frame, area: Rect, view: &DashboardView) {
    let block = Block::default().borders(Borders::ALL).title("budgets");
    if view.budgets.is_empty() {
        f.render_widget(Paragraph::new("No budgets set.").block(block), area);
        return;
    }
    let inner = block.inner(area);
    f.render_widget(block, area);

    let shown = view.budgets.iter().take(inner.height as usize);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); shown.len()])
        .split(inner);

    for ((b, st), row) in shown.zip(rows.iter()) {
        let ratio = (st.percent_used / Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let color = if st.over_budget {
            Color::Red
        } else if ratio >= 0.8 {
            Color::Yellow
        } else {
            Color::Green
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(format!("{} {}%", b.category.label(), st.percent_used));
        f.render_widget(gauge, *row);
    }
}
