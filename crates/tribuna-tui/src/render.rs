//! Pure rendering: state to frame, no mutation.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tribuna_core::conversation::{Message, Sender};
use unicode_width::UnicodeWidthStr;

use crate::markdown::render_markdown;
use crate::notice::{NOTICE_ACCEPT, NOTICE_BODY, NOTICE_TITLE};
use crate::state::{AppState, Overlay};
use crate::suggestions;

const TITLE: &str = "Comprende a tus Representantes";

const PROGRAMS_NOTICE: &str = "El asistente puede responder preguntas basadas en los \
    programas electorales de PSOE, PP, VOX, Sumar, ERC, Junts y Bildu. Las respuestas \
    se generan a partir de estos documentos.";

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn render(state: &AppState, frame: &mut Frame) {
    let [header, banner, transcript, input, status] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Min(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(state, frame, header);
    render_banner(frame, banner);
    render_transcript(state, frame, transcript);
    render_input(state, frame, input);
    render_status(state, frame, status);

    if state.overlay == Some(Overlay::LegalNotice) {
        render_notice(frame);
    }
}

fn render_header(state: &AppState, frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            TITLE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            state.tui.conversation.mode().subtitle(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_banner(frame: &mut Frame, area: Rect) {
    let banner = Paragraph::new(PROGRAMS_NOTICE)
        .style(Style::default().fg(Color::Yellow))
        .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}

fn render_transcript(state: &AppState, frame: &mut Frame, area: Rect) {
    let messages = state.tui.conversation.messages();
    if messages.is_empty() {
        render_suggestions(state, frame, area);
        return;
    }

    let mut lines: Vec<Line<'static>> = Vec::new();
    for message in messages {
        lines.extend(message_lines(message));
    }
    if state.tui.conversation.is_pending() {
        let frame_index = state.tui.spinner_frame % SPINNER_FRAMES.len();
        lines.push(Line::from(Span::styled(
            format!("{} Analizando tu consulta...", SPINNER_FRAMES[frame_index]),
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Keep the tail visible; transcript follows the stream.
    let height = area.height as usize;
    let scroll = lines.len().saturating_sub(height) as u16;
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, color) = match message.sender {
        Sender::User => ("Tú", Color::Cyan),
        Sender::Assistant => ("Asistente", Color::Green),
    };
    let mut lines = vec![Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    match message.sender {
        // User text is shown as typed.
        Sender::User => {
            lines.extend(message.text.lines().map(|l| Line::from(l.to_string())));
        }
        Sender::Assistant => lines.extend(render_markdown(&message.text)),
    }
    lines.push(Line::default());
    lines
}

fn render_suggestions(state: &AppState, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "¿Sobre qué te gustaría preguntar?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Selecciona una pregunta (↑/↓, Enter) o escribe la tuya propia",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];

    let selected = state.tui.suggestions.selected();
    for (topic_index, topic) in suggestions::TOPICS.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            topic.title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (question_index, question) in topic.questions.iter().enumerate() {
            let flat = topic_index * 2 + question_index;
            let style = if selected == Some(flat) {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(format!("  {question}"), style)));
        }
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

fn render_input(state: &AppState, frame: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Pregunta");
    let inner = block.inner(area);
    frame.render_widget(
        Paragraph::new(state.tui.input.text().to_string()).block(block),
        area,
    );

    // Cursor at the edit position, measured in display columns.
    let before_cursor: String = state
        .tui
        .input
        .text()
        .chars()
        .take(state.tui.input.cursor())
        .collect();
    let x = inner.x + before_cursor.width() as u16;
    frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
}

fn render_status(state: &AppState, frame: &mut Frame, area: Rect) {
    let status = format!(
        "Enter enviar · Tab modo ({}) · Ctrl+N nueva conversación · Esc salir · envío: {}",
        state.tui.conversation.mode().subtitle(),
        state.tui.delivery.display_name(),
    );
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn render_notice(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 70, 80);
    frame.render_widget(Clear, area);

    let mut lines = Vec::new();
    for paragraph in NOTICE_BODY {
        lines.push(Line::from(paragraph.to_string()));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        NOTICE_ACCEPT,
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(NOTICE_TITLE)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
