// TUI widget modules for each panel.

pub mod command_line;
pub mod draft_log;
pub mod help;
pub mod pack;
pub mod packs;
pub mod status_bar;
pub mod tally;

use ratatui::style::Color;

use crate::draft::card::Color as Ink;

/// Terminal color used for cards of the given ink.
pub fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::Amber => Color::Yellow,
        Ink::Amethyst => Color::Magenta,
        Ink::Emerald => Color::Green,
        Ink::Ruby => Color::Red,
        Ink::Sapphire => Color::Blue,
        Ink::Steel => Color::Gray,
    }
}

#[cfg(test)]
pub(crate) fn buffer_text(terminal: &ratatui::Terminal<ratatui::backend::TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    let symbols: Vec<&str> = buffer.content().iter().map(|cell| cell.symbol()).collect();
    symbols
        .chunks(width.max(1))
        .map(|row| row.concat())
        .collect::<Vec<_>>()
        .join("\n")
}
