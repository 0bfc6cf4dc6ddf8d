use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        Wrap,
    },
};

use crate::coordinator::NOTIFICATION_TITLE;
use crate::rename_engine::{episode_filename, season_directory};
use crate::transfer::TransferMode;

use super::app::App;
use super::models::{ConfigInputMode, ProcessingStatus};

const TITLE: &str = "Force Transfer";

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    if app.show_config {
        render_config_screen(f, size, app);
    } else {
        render_main_screen(f, size, app);
    }

    if app.show_help {
        render_help_popup(f);
    }
}

fn field_style(active: bool) -> (Style, Style) {
    if active {
        (
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (
            Style::default().fg(Color::White),
            Style::default().fg(Color::Gray),
        )
    }
}

fn render_text_field(f: &mut Frame, area: Rect, title: &str, value: &str, active: bool) {
    let (text_style, border_style) = field_style(active);
    let shown = if active {
        format!("{value}_")
    } else {
        value.to_string()
    };
    let field = Paragraph::new(shown).style(text_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(border_style),
    );
    f.render_widget(field, area);
}

pub fn render_config_screen(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(4),
        ])
        .split(area);

    let header = Paragraph::new(format!("{TITLE} - Configuration"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, chunks[0]);

    let form = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(chunks[1]);

    let mode = app.config_input_mode;
    render_text_field(
        f,
        form[0],
        "Source directory",
        &app.source_input,
        mode == ConfigInputMode::Source,
    );
    render_text_field(
        f,
        form[1],
        "Target library",
        &app.target_input,
        mode == ConfigInputMode::Target,
    );
    render_text_field(
        f,
        form[2],
        "Media name",
        &app.name_input,
        mode == ConfigInputMode::MediaName,
    );
    render_text_field(
        f,
        form[3],
        "Season",
        &app.season_input,
        mode == ConfigInputMode::Season,
    );

    let active = mode == ConfigInputMode::TransferType;
    let (_, border_style) = field_style(active);
    let spans: Vec<Span> = TransferMode::ALL
        .iter()
        .flat_map(|candidate| {
            let style = if *candidate == app.mode {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            [
                Span::styled(format!(" {} ", mode_label(*candidate)), style),
                Span::raw(" "),
            ]
        })
        .collect();
    let transfer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Transfer type (Left/Right)")
            .border_style(border_style),
    );
    f.render_widget(transfer, form[4]);

    let confirm_active = mode == ConfigInputMode::Confirm;
    let (confirm_style, confirm_border) = field_style(confirm_active);
    let config = app.run_config();
    let example = season_directory(&config.target_path, &config.media_name, config.season)
        .join(episode_filename(&config.media_name, config.season, 1, ".mkv"));
    let confirm = Paragraph::new(format!("Press ENTER to scan -> {}", example.display()))
        .style(confirm_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm")
                .border_style(confirm_border),
        );
    f.render_widget(confirm, form[5]);

    let hint = app.status_message.clone().unwrap_or_else(|| {
        "Type to edit, ENTER/Tab next field, Up/Backspace previous, h help, Esc quit".to_string()
    });
    let instructions = Paragraph::new(hint)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Instructions"));
    f.render_widget(instructions, chunks[2]);
}

fn mode_label(mode: TransferMode) -> &'static str {
    match mode {
        TransferMode::Symlink => "Softlink",
        TransferMode::HardLink => "Link",
        TransferMode::Copy => "Copy",
        TransferMode::Move => "Move",
    }
}

pub fn render_main_screen(f: &mut Frame, area: Rect, app: &App) {
    let constraints = if app.show_preview {
        vec![Constraint::Percentage(60), Constraint::Percentage(40)]
    } else {
        vec![Constraint::Percentage(100)]
    };
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    render_header(f, left_chunks[0], app);
    render_file_list(f, left_chunks[1], app);
    render_status_bar(f, left_chunks[2], app);

    if app.show_preview && chunks.len() > 1 {
        render_preview_panel(f, chunks[1], app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.finished {
        format!("{TITLE} - {NOTIFICATION_TITLE}")
    } else {
        format!("{TITLE} - {} ({})", app.name_input, app.mode)
    };

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

fn render_file_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .files
        .iter()
        .map(|file| {
            let (icon, color) = match file.status {
                ProcessingStatus::Pending => ("[PENDING]", Color::Yellow),
                ProcessingStatus::Success => ("[SUCCESS]", Color::Green),
                ProcessingStatus::Error => ("[ERROR]", Color::Red),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{icon} "), Style::default().fg(color)),
                Span::styled(
                    format!("E{:02} ", file.episode_number),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(file.original_name.clone(), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let files_list = List::new(items)
        .block(
            Block::default()
                .title(format!("Files ({})", app.files.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(files_list, area, &mut app.list_state.clone());

    if app.files.len() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let label = if let Some(message) = &app.status_message {
        message.clone()
    } else if let Some(summary) = &app.summary {
        format!(
            "{} of {} files via {}",
            summary.total_succeeded, summary.total_attempted, summary.mode
        )
    } else {
        format!("Ready to {} {} files", app.mode, app.stats.total)
    };
    let style = if app.stats.failed > 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Succeeded"))
        .gauge_style(style)
        .ratio(app.success_ratio())
        .label(label);
    f.render_widget(progress, chunks[0]);

    let controls_text = if app.finished {
        "c to reconfigure, h help, q quit"
    } else {
        "ENTER to run, c to reconfigure, q quit"
    };
    let controls = Paragraph::new(controls_text)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

fn render_preview_panel(f: &mut Frame, area: Rect, app: &App) {
    let Some(file) = app.list_state.selected().and_then(|i| app.files.get(i)) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let numbering = if file.inferred {
        "fallback counter"
    } else {
        "from filename"
    };
    let before = Paragraph::new(Text::from(vec![
        Line::from("Original:"),
        Line::from(Span::styled(
            file.original_name.clone(),
            Style::default().fg(Color::Red),
        )),
        Line::from(""),
        Line::from(format!("Episode: {} ({numbering})", file.episode_number)),
    ]))
    .block(
        Block::default()
            .title("Before")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(before, chunks[0]);

    let new_style = match file.status {
        ProcessingStatus::Success => Style::default().fg(Color::Green),
        ProcessingStatus::Error => Style::default().fg(Color::Red),
        ProcessingStatus::Pending => Style::default().fg(Color::Yellow),
    };
    let mut lines = vec![
        Line::from("New:"),
        Line::from(Span::styled(file.new_name.clone(), new_style)),
    ];
    if let Some(error) = &file.error_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(summary) = &app.summary {
        lines.push(Line::from(""));
        for line in summary.notification_text().lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    let after = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("After")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(after, chunks[1]);
}

fn render_help_popup(f: &mut Frame) {
    let popup_area = centered_rect(60, 50, f.area());

    let help_text = vec![
        Line::from(Span::styled(
            format!("{TITLE} - Help"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  ENTER/Tab  - Next field, scan on Confirm"),
        Line::from("  Up         - Previous field"),
        Line::from("  Left/Right - Change transfer type"),
        Line::from(""),
        Line::from("File list:"),
        Line::from("  Up/k, Down/j - Move selection"),
        Line::from("  ENTER        - Run the transfer"),
        Line::from("  p            - Toggle preview panel"),
        Line::from("  c            - Back to the form"),
        Line::from(""),
        Line::from("Existing files with the same target name are replaced."),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or h to close",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
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
