//! Gallery rendering.
//!
//! [`render`] projects the stored stories into a [`GalleryView`], a display
//! list that front ends draw however they like. [`GalleryView::to_html`]
//! serializes it to markup with all user text escaped.

use crate::clock::ClockReading;
use crate::story::Story;

/// Message shown when there are no stories.
pub const EMPTY_MESSAGE: &str =
    "No stories yet. Add your first story using the content management form below.";

/// One card in the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryCard {
    /// Position in this render pass; the delete action targets it.
    pub index: usize,
    pub image_src: String,
    pub caption: String,
    pub alt: String,
    pub timestamp: i64,
}

/// Everything the gallery area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryView {
    Empty { message: String },
    Cards(Vec<StoryCard>),
}

impl GalleryView {
    pub fn is_empty(&self) -> bool {
        matches!(self, GalleryView::Empty { .. })
    }

    pub fn cards(&self) -> &[StoryCard] {
        match self {
            GalleryView::Empty { .. } => &[],
            GalleryView::Cards(cards) => cards,
        }
    }

    /// Serialize the gallery grid contents to HTML.
    pub fn to_html(&self) -> String {
        match self {
            GalleryView::Empty { message } => format!(
                "<div class=\"col-span-full text-center py-12 text-gray-500\">\
                 <p class=\"text-lg\">{}</p></div>",
                escape_html(message)
            ),
            GalleryView::Cards(cards) => cards.iter().map(StoryCard::to_html).collect(),
        }
    }
}

impl StoryCard {
    /// Markup for a single card.
    pub fn to_html(&self) -> String {
        format!(
            "<article class=\"story-card\">\
             <img src=\"{src}\" alt=\"{alt}\" class=\"story-image\" loading=\"lazy\">\
             <div class=\"p-4\">\
             <p class=\"story-caption\">{caption}</p>\
             <button type=\"button\" data-action=\"delete\" data-index=\"{index}\">Delete Story</button>\
             </div></article>",
            src = escape_attr(&self.image_src),
            alt = escape_attr(&self.alt),
            caption = escape_html(&self.caption),
            index = self.index,
        )
    }
}

/// Project stories into a display list. Total and idempotent.
pub fn render(stories: &[Story]) -> GalleryView {
    if stories.is_empty() {
        return GalleryView::Empty {
            message: EMPTY_MESSAGE.to_string(),
        };
    }

    GalleryView::Cards(
        stories
            .iter()
            .enumerate()
            .map(|(index, story)| StoryCard {
                index,
                image_src: story.image.clone(),
                caption: story.content.clone(),
                alt: format!("Story {}", index + 1),
                timestamp: story.timestamp,
            })
            .collect(),
    )
}

/// Render a standalone page: clocks, date, and the gallery.
pub fn render_page(view: &GalleryView, clocks: &ClockReading, date: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Stories</title>\n</head>\n<body>\n");
    html.push_str("<header>\n");
    html.push_str(&format!(
        "<p id=\"ist-clock\">{}</p>\n",
        escape_html(&clocks.ist_label())
    ));
    html.push_str(&format!(
        "<p id=\"est-clock\">{}</p>\n",
        escape_html(&clocks.est_label())
    ));
    html.push_str(&format!("<p id=\"current-date\">{}</p>\n", escape_html(date)));
    html.push_str("</header>\n");
    html.push_str(&format!("<main id=\"stories-grid\">{}</main>\n", view.to_html()));
    html.push_str("</body>\n</html>\n");
    html
}

/// Escape text for an HTML text node.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for a double- or single-quoted HTML attribute.
pub fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
