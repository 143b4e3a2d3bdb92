use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::Widget,
};

use super::{units_to_columns, Animator, SwipeRow};

/// Draws one swipe row: the content shifted left by `offset` columns and the
/// action area filling the uncovered columns on the right.
pub struct SwipeRowView<'a, F>
where
    F: FnOnce() -> Line<'a>,
{
    content: Line<'a>,
    render_actions: F,
    offset: u16,
    style: Style,
    actions_style: Style,
}

impl<'a, F> SwipeRowView<'a, F>
where
    F: FnOnce() -> Line<'a>,
{
    pub fn new(content: Line<'a>, render_actions: F) -> SwipeRowView<'a, F> {
        SwipeRowView {
            content,
            render_actions,
            offset: 0,
            style: Style::default(),
            actions_style: Style::default(),
        }
    }

    /// Columns the content is pushed left by.
    pub fn offset(mut self, columns: u16) -> SwipeRowView<'a, F> {
        self.offset = columns;
        self
    }

    pub fn style(mut self, style: Style) -> SwipeRowView<'a, F> {
        self.style = style;
        self
    }

    pub fn actions_style(mut self, style: Style) -> SwipeRowView<'a, F> {
        self.actions_style = style;
        self
    }
}

impl<'a, F> Widget for SwipeRowView<'a, F>
where
    F: FnOnce() -> Line<'a>,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let shift = self.offset.min(area.width);

        // Lay the content out unshifted, then copy the part that is still
        // visible.
        let mut scratch = Buffer::empty(Rect::new(0, 0, area.width, area.height));
        scratch.set_style(scratch.area, self.style);
        self.content.render(scratch.area, &mut scratch);
        for y in 0..area.height {
            for x in 0..area.width - shift {
                if let (Some(src), Some(dst)) = (
                    scratch.cell((x + shift, y)),
                    buf.cell_mut((area.x + x, area.y + y)),
                ) {
                    *dst = src.clone();
                }
            }
        }

        if shift > 0 {
            let actions = Rect::new(area.right() - shift, area.y, shift, area.height);
            buf.set_style(actions, self.actions_style);
            (self.render_actions)().render(actions, buf);
        }
    }
}

impl<A: Animator> SwipeRow<A> {
    /// Builds the view of this row at its current offset.
    pub fn view<'a, F>(&self, content: Line<'a>, render_actions: F) -> SwipeRowView<'a, F>
    where
        F: FnOnce() -> Line<'a>,
    {
        SwipeRowView::new(content, render_actions).offset(units_to_columns(self.state().offset()))
    }
}
