//! Transient notice banner in the top-right corner.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use runtime::Notice;

use crate::presentation::theme::RatatuiTheme;

const WIDTH: u16 = 44;
const HEIGHT: u16 = 4;

pub fn render(frame: &mut Frame, area: Rect, notice: &Notice, theme: &RatatuiTheme) {
    let width = WIDTH.min(area.width);
    let height = HEIGHT.min(area.height);
    let rect = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    };

    let style = theme.style_notice(notice.level);
    let paragraph = Paragraph::new(Line::from(Span::raw(notice.message.clone())))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(Span::styled(format!(" {} ", notice.title), style)),
        );

    frame.render_widget(Clear, rect);
    frame.render_widget(paragraph, rect);
}
