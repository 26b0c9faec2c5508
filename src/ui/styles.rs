use crate::domain::{DeadlineStatus, ToastKind};
use ratatui::style::{Color, Modifier, Style};

/// Default text style
pub fn default_style() -> Style {
    Style::default().fg(Color::White)
}

/// Selected row highlight style
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightCyan)
        .add_modifier(Modifier::BOLD)
}

/// Title style for panes
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Modal background style
pub fn modal_bg_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Modal title style
pub fn modal_title_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Error message style
pub fn error_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Done/completed task style
pub fn done_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Preview (generated, not yet added) row style
pub fn preview_style() -> Style {
    Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::ITALIC)
}

/// Deadline label style by status
pub fn deadline_style(status: DeadlineStatus) -> Style {
    match status {
        DeadlineStatus::Completed => Style::default().fg(Color::Gray),
        DeadlineStatus::NoDeadline => hint_style(),
        DeadlineStatus::Overdue => error_style(),
        DeadlineStatus::DueSoon => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        DeadlineStatus::Normal => default_style(),
    }
}

pub fn toast_style(kind: ToastKind) -> Style {
    match kind {
        ToastKind::Info => Style::default().fg(Color::Black).bg(Color::Cyan),
        ToastKind::Success => Style::default().fg(Color::Black).bg(Color::Green),
        ToastKind::Error => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
    }
}
