use super::SummaryDocument;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_X_MM: f32 = 20.0;
pub const TOP_MM: f32 = PAGE_HEIGHT_MM - 20.0;
pub const BOTTOM_MM: f32 = 30.0;
pub const LINE_STEP_MM: f32 = 5.0;

const TITLE_STEP_MM: f32 = 8.0;
const SERVICE_STEP_MM: f32 = 6.0;
const HEADER_GAP_MM: f32 = 10.0;
const HEADING_STEP_MM: f32 = 7.0;
const SECTION_GAP_MM: f32 = 4.0;

pub const ITEM_CHAR_LIMIT: usize = 120;
pub const WRAP_WIDTH: usize = 110;

pub const TITLE: &str = "Citizen Service Navigator - Application Summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Header,
    Heading,
    Body,
}

impl TextStyle {
    pub fn font_size(self) -> f32 {
        match self {
            Self::Title => 14.0,
            Self::Header => 11.0,
            Self::Heading => 12.0,
            Self::Body => 10.0,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, Self::Title | Self::Heading)
    }
}

/// One line of text pinned to a page at a vertical offset from the bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub page: usize,
    pub y_mm: f32,
    pub style: TextStyle,
    pub text: String,
}

/// Page-independent placement of a summary, rendered later by the PDF writer.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLayout {
    pub pages: usize,
    pub lines: Vec<PlacedLine>,
}

struct Cursor {
    page: usize,
    y: f32,
    lines: Vec<PlacedLine>,
}

impl Cursor {
    fn new() -> Self {
        Self {
            page: 0,
            y: TOP_MM,
            lines: Vec::new(),
        }
    }

    fn place(&mut self, style: TextStyle, text: impl Into<String>) {
        self.lines.push(PlacedLine {
            page: self.page,
            y_mm: self.y,
            style,
            text: text.into(),
        });
    }

    fn advance(&mut self, step: f32) {
        self.y -= step;
    }

    fn body_line(&mut self, text: impl Into<String>) {
        self.place(TextStyle::Body, text);
        self.advance(LINE_STEP_MM);
        if self.y < BOTTOM_MM {
            self.page += 1;
            self.y = TOP_MM;
        }
    }

    fn heading(&mut self, text: &str) {
        self.place(TextStyle::Heading, text);
        self.advance(HEADING_STEP_MM);
    }

    fn items<I: IntoIterator<Item = String>>(&mut self, items: I, empty: &str) {
        let mut placed = false;
        for item in items {
            self.body_line(truncate(&format!("- {item}"), ITEM_CHAR_LIMIT));
            placed = true;
        }
        if !placed {
            self.body_line(empty);
        }
    }
}

impl SummaryLayout {
    pub fn build(document: &SummaryDocument) -> Self {
        let mut cursor = Cursor::new();

        cursor.place(TextStyle::Title, TITLE);
        cursor.advance(TITLE_STEP_MM);
        cursor.place(TextStyle::Header, format!("Service: {}", document.service));
        cursor.advance(SERVICE_STEP_MM);
        cursor.place(
            TextStyle::Header,
            format!("Decision: {}", document.result.status_label()),
        );
        cursor.advance(HEADER_GAP_MM);

        cursor.heading("Applicant Information");
        for (key, value) in document.answers.iter() {
            cursor.body_line(truncate(&format!("- {key}: {value}"), ITEM_CHAR_LIMIT));
        }

        cursor.advance(SECTION_GAP_MM);
        cursor.heading("Reasons");
        cursor.items(document.result.reasons.iter().cloned(), "- N/A");

        cursor.advance(SECTION_GAP_MM);
        cursor.heading("Plain-language Explanation (English)");
        for line in wrap_text(&document.explanation, WRAP_WIDTH) {
            cursor.body_line(line);
        }

        cursor.advance(SECTION_GAP_MM);
        cursor.heading("Required Documents");
        cursor.items(document.result.required_documents.iter().cloned(), "- None");

        let pages = cursor
            .lines
            .last()
            .map(|line| line.page + 1)
            .unwrap_or(1);

        Self {
            pages,
            lines: cursor.lines,
        }
    }

    pub fn lines_on(&self, page: usize) -> impl Iterator<Item = &PlacedLine> {
        self.lines.iter().filter(move |line| line.page == page)
    }
}

pub fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Greedy word wrap. A single word longer than `width` keeps its own line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed <= width || current.is_empty() {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
