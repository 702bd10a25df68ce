//! Page number row under the table
//!
//! Shows the first and last page, the current page with one neighbour on each
//! side, and ellipses for the gaps. Every clickable label records its screen
//! rectangle so mouse clicks can be mapped back to a page.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

const BOUNDARY_COUNT: i64 = 1;
const SIBLING_COUNT: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Inclusive range, empty when `end < start`
fn range(start: i64, end: i64) -> impl Iterator<Item = i64> {
    start..=end
}

/// Items to show for `count` pages with `current` selected
///
/// A capped count can trail the current page; the current page then becomes
/// the last one shown.
pub fn page_items(current: u32, count: u32) -> Vec<PageItem> {
    let page = i64::from(current);
    let count = if count == 0 { 0 } else { i64::from(count.max(current)) };

    let start_pages: Vec<i64> = range(1, BOUNDARY_COUNT.min(count)).collect();
    let end_pages: Vec<i64> =
        range((count - BOUNDARY_COUNT + 1).max(BOUNDARY_COUNT + 1), count).collect();

    let siblings_start = (page - SIBLING_COUNT)
        .min(count - BOUNDARY_COUNT - SIBLING_COUNT * 2 - 1)
        .max(BOUNDARY_COUNT + 2);
    let siblings_end = (page + SIBLING_COUNT)
        .max(BOUNDARY_COUNT + SIBLING_COUNT * 2 + 2)
        .min(end_pages.first().map_or(count - 1, |first| first - 2));

    let mut items: Vec<PageItem> = start_pages.iter().map(|&p| PageItem::Page(p as u32)).collect();

    if siblings_start > BOUNDARY_COUNT + 2 {
        items.push(PageItem::Ellipsis);
    } else if BOUNDARY_COUNT + 1 < count - BOUNDARY_COUNT {
        items.push(PageItem::Page((BOUNDARY_COUNT + 1) as u32));
    }

    items.extend(range(siblings_start, siblings_end).map(|p| PageItem::Page(p as u32)));

    if siblings_end < count - BOUNDARY_COUNT - 1 {
        items.push(PageItem::Ellipsis);
    } else if count - BOUNDARY_COUNT > BOUNDARY_COUNT {
        items.push(PageItem::Page((count - BOUNDARY_COUNT) as u32));
    }

    items.extend(end_pages.iter().map(|&p| PageItem::Page(p as u32)));
    items
}

/// Draw the pagination row right-aligned in `area`
///
/// Returns click targets as `(area, page)`. With `capped` the page count is a
/// lower bound, so "next" stays enabled on the last known page.
pub fn draw_pagination(
    frame: &mut Frame,
    area: Rect,
    current: u32,
    count: u32,
    capped: bool,
) -> Vec<(Rect, u32)> {
    if count == 0 {
        return Vec::new();
    }

    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);
    let selected = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    // (label, click target, style)
    let mut labels: Vec<(String, Option<u32>, Style)> = Vec::new();

    let has_prev = current > 1;
    labels.push((
        " ‹ ".to_string(),
        has_prev.then(|| current - 1),
        if has_prev { enabled } else { disabled },
    ));

    for item in page_items(current, count) {
        match item {
            PageItem::Page(page) => {
                let style = if page == current { selected } else { enabled };
                labels.push((format!(" {} ", page), Some(page), style));
            }
            PageItem::Ellipsis => labels.push((" … ".to_string(), None, disabled)),
        }
    }
    if capped {
        labels.push(("+ ".to_string(), None, disabled));
    }

    let has_next = current < count || capped;
    labels.push((
        " › ".to_string(),
        has_next.then(|| current + 1),
        if has_next { enabled } else { disabled },
    ));

    let total_width: u16 = labels
        .iter()
        .map(|(label, _, _)| label.width() as u16)
        .sum();
    let start_x = area.x + area.width.saturating_sub(total_width);

    let mut hits = Vec::new();
    let mut spans = Vec::new();
    let mut x = start_x;
    for (label, target, style) in labels {
        let width = label.width() as u16;
        if let Some(page) = target {
            let hit = Rect::new(x, area.y, width, 1).intersection(area);
            if !hit.is_empty() {
                hits.push((hit, page));
            }
        }
        x = x.saturating_add(width);
        spans.push(Span::styled(label, style));
    }

    let line_area = Rect::new(
        start_x,
        area.y,
        area.width.min(total_width),
        area.height.min(1),
    );
    frame.render_widget(Paragraph::new(Line::from(spans)), line_area);

    hits
}
