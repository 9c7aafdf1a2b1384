//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph};

use super::runtime::App;
use super::style;
use crate::panel::status::classify_power;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(8),    // chart
            Constraint::Length(3), // load gauge
            Constraint::Length(7), // loads + alerts
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_load_gauge(frame, app, chunks[2]);
    render_panels(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

/// Header bar: preset name, tick count, speed, run state, auto mode.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state_label = if app.paused { "PAUSED" } else { "RUNNING" };
    let state_icon = if app.paused { "‖" } else { "▶" };
    let auto_label = if app.engine.auto_mode() {
        "auto"
    } else {
        "manual"
    };

    let header = Line::from(vec![
        Span::styled(
            " LOADSHED-SIM ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            &app.preset_name,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ tick={} │ {}ms │ {} │ {} {} ",
            app.tick_count,
            app.tick_interval_ms(),
            auto_label,
            state_icon,
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Power reading chart with the threshold line.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let power_data: Vec<(f64, f64)> = app
        .engine
        .history()
        .iter()
        .map(|p| (p.seq as f64, p.power_w))
        .collect();

    let threshold_w = app.engine.threshold_w();
    let x_lo = power_data.first().map_or(0.0, |p| p.0);
    let x_hi = power_data.last().map_or(1.0, |p| p.0).max(x_lo + 1.0);
    let threshold_data = [
        (x_lo, f64::from(threshold_w)),
        (x_hi, f64::from(threshold_w)),
    ];

    let y_bounds = style::auto_bounds_y(&power_data, threshold_w);

    let datasets = vec![
        Dataset::default()
            .name("Power")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::POWER_COLOR))
            .data(&power_data),
        Dataset::default()
            .name("Threshold")
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(style::THRESHOLD_COLOR))
            .data(&threshold_data),
    ];

    let x_label_lo = format!("{}", x_lo as u64);
    let x_label_hi = format!("{}", x_hi as u64);
    let y_label_lo = format!("{:.0}", y_bounds[0]);
    let y_label_hi = format!("{:.0}", y_bounds[1]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Power Consumption vs Threshold ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("reading")
                .bounds([x_lo, x_hi])
                .labels(vec![x_label_lo, x_label_hi]),
        )
        .y_axis(
            Axis::default()
                .title("W")
                .bounds(y_bounds)
                .labels(vec![y_label_lo, y_label_hi]),
        );

    frame.render_widget(chart, area);
}

/// Commanded-load gauge colored by threshold status.
fn render_load_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.engine.total_power_w();
    let capacity = app.engine.registry().capacity_w().max(1);
    let status = classify_power(f64::from(total), app.engine.threshold_w());
    let color = style::status_color(status);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Commanded Load ")
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(f64::from(total) / f64::from(capacity))
        .label(format!(
            "{total} W / {capacity} W (threshold {} W, {status})",
            app.engine.threshold_w()
        ));
    frame.render_widget(gauge, area);
}

/// Side-by-side loads table and recent alerts.
fn render_panels(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_loads(frame, app, chunks[0]);
    render_alerts(frame, app, chunks[1]);
}

/// Per-load rows with on/off marks and feeder grouping.
fn render_loads(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.engine.snapshot();
    let lines: Vec<Line> = snapshot
        .loads
        .iter()
        .enumerate()
        .map(|(i, load)| {
            let (mark, color) = if load.on {
                ("●", style::LOAD_ON)
            } else {
                ("○", style::LOAD_OFF)
            };
            Line::from(vec![
                Span::styled(format!(" {mark} "), Style::default().fg(color)),
                Span::raw(format!(
                    "{} {:<18} {:>4} W  f{}",
                    i + 1,
                    load.name,
                    load.power_draw_w,
                    load.feeder,
                )),
            ])
        })
        .collect();

    let block = Block::default().title(" Loads ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Most recent alerts, newest first, colored by severity.
fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .engine
        .alerts()
        .recent()
        .take(usize::from(area.height.saturating_sub(2)))
        .map(|alert| {
            Line::from(vec![
                Span::styled(
                    format!(" [{:>9}] ", alert.severity),
                    Style::default().fg(style::severity_color(alert.severity)),
                ),
                Span::raw(alert.message.clone()),
            ])
        })
        .collect();

    let lines = if lines.is_empty() {
        vec![Line::from("  No alerts yet")]
    } else {
        lines
    };

    let block = Block::default().title(" Alerts ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  Space:Pause  ↑/↓:Threshold  a:Auto  1-9:Load  f/g:Feeder  o:AllOn  x:AllOff  r:Restart",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
