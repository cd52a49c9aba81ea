use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Popup};
use crate::theme::Theme;
use crate::timer::Scheduler;

/// Hint shown until a duration is committed
pub const PROMPT_TEXT: &str = "Please set a duration to start the countdown.";
const PLACEHOLDER: &str = "Enter duration in seconds";

/// Seconds left at which the display turns to the danger color
const DANGER_SECS: u64 = 10;

// Theme is fixed for the lifetime of the process
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme; only the first call has any effect
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw<S: Scheduler>(f: &mut Frame, app: &App<S>) {
    let area = f.area();

    // Keep the widget a fixed, readable width on wide terminals
    let width = area.width.min(60);
    let panel = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Title
            Constraint::Length(1),  // Status line
            Constraint::Length(1),  // Prompt hint
            Constraint::Length(3),  // Input + Set
            Constraint::Min(3),     // Time display
            Constraint::Length(3),  // Start / Pause / Reset
            Constraint::Length(1),  // Footer
        ])
        .split(panel);

    draw_title(f, chunks[0]);
    draw_status_line(f, app, chunks[1]);
    draw_prompt(f, app, chunks[2]);
    draw_input_row(f, app, chunks[3]);
    draw_time(f, app, chunks[4]);
    draw_controls(f, app, chunks[5]);
    draw_footer(f, app, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Countdown Timer",
        Style::default().fg(header()).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn draw_status_line(f: &mut Frame, app: &App<impl Scheduler>, area: Rect) {
    let line = match app.status_message {
        Some(ref status) => Line::from(Span::styled(status.as_str(), Style::default().fg(warning()))),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_prompt(f: &mut Frame, app: &App<impl Scheduler>, area: Rect) {
    if !app.countdown.prompt_visible() {
        return;
    }
    let hint = Paragraph::new(Line::from(Span::styled(PROMPT_TEXT, Style::default().fg(text()))))
        .alignment(Alignment::Center);
    f.render_widget(hint, area);
}

fn draw_input_row(f: &mut Frame, app: &App<impl Scheduler>, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(9)])
        .split(area);

    let editing = app.focus == Focus::Input;
    let border_color = if editing { accent() } else { inactive() };

    let content = if app.input_buffer.is_empty() {
        Span::styled(PLACEHOLDER, Style::default().fg(text_dim()))
    } else {
        Span::styled(app.input_buffer.as_str(), Style::default().fg(text()))
    };
    let mut spans = vec![content];
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(accent())));
    }

    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled(" Duration (s) ", Style::default().fg(border_color)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(input, cols[0]);

    draw_button(f, "Set", app.focus == Focus::Set, cols[1]);
}

fn draw_time(f: &mut Frame, app: &App<impl Scheduler>, area: Rect) {
    let countdown = &app.countdown;
    let color = if countdown.is_running() && countdown.time_left() <= DANGER_SECS {
        danger()
    } else if countdown.is_running() {
        accent()
    } else {
        text()
    };

    // Vertically center the single display line
    let pad = area.height.saturating_sub(1) / 2;
    let mut lines = vec![Line::from(""); pad as usize];
    lines.push(Line::from(Span::styled(
        countdown.display(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_controls(f: &mut Frame, app: &App<impl Scheduler>, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    draw_button(f, app.countdown.start_label(), app.focus == Focus::Start, cols[0]);
    draw_button(f, "Pause", app.focus == Focus::Pause, cols[1]);
    draw_button(f, "Reset", app.focus == Focus::Reset, cols[2]);
}

fn draw_button(f: &mut Frame, label: &str, focused: bool, area: Rect) {
    let (border, style) = if focused {
        (
            accent(),
            Style::default().fg(accent()).bg(bg_selected()).add_modifier(Modifier::BOLD),
        )
    } else {
        (inactive(), Style::default().fg(text()))
    };

    let button = Paragraph::new(Line::from(Span::styled(label.to_string(), style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        );
    f.render_widget(button, area);
}

fn draw_footer(f: &mut Frame, app: &App<impl Scheduler>, area: Rect) {
    let hints: Vec<(&str, &str)> = if app.focus == Focus::Input {
        vec![("Enter", "Set"), ("Esc", "Buttons"), ("Tab", "Next"), ("^C", "Quit")]
    } else {
        vec![
            ("s", "Start"),
            ("p", "Pause"),
            ("r", "Reset"),
            ("i", "Input"),
            ("h", "Help"),
            ("q", "Quit"),
        ]
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(accent())),
            Span::raw(desc),
        ])
    };
    let heading = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(header()).add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        key("  Tab/S-Tab ", "Cycle input → Set → Start → Pause → Reset"),
        key("  ←/→       ", "Move between buttons"),
        key("  i/e       ", "Edit the duration"),
        Line::from(""),
        heading("═══ Duration ═══"),
        key("  0-9       ", "Type whole seconds"),
        key("  Enter     ", "Set the countdown to that duration"),
        key("  Esc       ", "Leave the input"),
        Line::from(""),
        heading("═══ Countdown ═══"),
        key("  s         ", "Start or resume"),
        key("  p         ", "Pause"),
        key("  r         ", "Reset to the duration"),
        key("  Space     ", "Press the focused button"),
        Line::from(""),
        heading("═══ Quick Start ═══"),
        key("  kaunto -d 300 --start ", "Five minutes, already running"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(text_dim())),
            Span::styled("h", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("?", Style::default().fg(accent())),
            Span::styled("/", Style::default().fg(text_dim())),
            Span::styled("Esc", Style::default().fg(accent())),
            Span::styled(" to close", Style::default().fg(text_dim())),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" kaunto Help ", Style::default().fg(accent())))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::timer::scheduler::testing::ManualScheduler;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App<ManualScheduler>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App<ManualScheduler> {
        App::new(&AppConfig::default(), ManualScheduler::default())
    }

    #[test]
    fn test_initial_screen() {
        let screen = render(&app());
        assert!(screen.contains("Countdown Timer"));
        assert!(screen.contains(PROMPT_TEXT));
        assert!(screen.contains(PLACEHOLDER));
        assert!(screen.contains("00:00"));
        assert!(screen.contains("Start"));
        assert!(screen.contains("Pause"));
        assert!(screen.contains("Reset"));
        assert!(screen.contains("Set"));
    }

    #[test]
    fn test_committed_duration_hides_prompt() {
        let mut app = app();
        app.commit_initial_duration(65);
        let screen = render(&app);
        assert!(screen.contains("01:05"));
        assert!(!screen.contains(PROMPT_TEXT));
    }

    #[test]
    fn test_running_label() {
        let mut app = app();
        app.commit_initial_duration(10);
        app.activate(Focus::Start);
        let screen = render(&app);
        assert!(screen.contains("Running"));

        app.activate(Focus::Pause);
        let screen = render(&app);
        assert!(!screen.contains("Running"));
        assert!(screen.contains("Start"));
    }

    #[test]
    fn test_help_popup_renders() {
        let mut app = app();
        app.popup = Popup::Help;
        let screen = render(&app);
        assert!(screen.contains("kaunto Help"));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert_eq!(inner.height, 20);
        assert_eq!(inner.x, 20);
        assert_eq!(inner.y, 10);
    }
}
