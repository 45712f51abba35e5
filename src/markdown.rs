// Markdown parsing and rendering for the TUI host
//
// Text components accept markdown; this module turns it into styled ratatui
// lines. Uses pulldown-cmark for parsing and unicode-width for wrapping.
// Supports headings, inline code, fenced code blocks (with JSON
// highlighting), bold, italic, lists, and horizontal rules.

use crate::theme::Theme;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// A parsed markdown fragment with semantic meaning.
#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Bold(String),
    Italic(String),
    InlineCode(String),
    CodeBlock { lang: Option<String>, code: String },
    Heading { level: u8, text: String },
    ListItemStart { ordered: bool, number: u64, depth: usize },
    ListItemEnd,
    SoftBreak,
    HardBreak,
    ParagraphEnd,
    Rule,
}

/// Accumulates inline text into the innermost active container.
#[derive(Default)]
struct ParseState {
    heading: Option<(u8, String)>,
    code_block: Option<(Option<String>, String)>,
    bold: Option<String>,
    italic: Option<String>,
    /// Stack of (ordered, next item number) for nested lists.
    lists: Vec<(bool, u64)>,
}

fn parse(markdown: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut state = ParseState::default();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    HeadingLevel::H4 => 4,
                    HeadingLevel::H5 => 5,
                    HeadingLevel::H6 => 6,
                };
                state.heading = Some((level, String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = state.heading.take() {
                    segments.push(Segment::Heading { level, text });
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                state.code_block = Some((lang, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, code)) = state.code_block.take() {
                    segments.push(Segment::CodeBlock { lang, code });
                }
            }
            Event::Start(Tag::Strong) => state.bold = Some(String::new()),
            Event::End(TagEnd::Strong) => {
                if let Some(text) = state.bold.take() {
                    segments.push(Segment::Bold(text));
                }
            }
            Event::Start(Tag::Emphasis) => state.italic = Some(String::new()),
            Event::End(TagEnd::Emphasis) => {
                if let Some(text) = state.italic.take() {
                    segments.push(Segment::Italic(text));
                }
            }
            Event::Start(Tag::List(first)) => {
                state.lists.push((first.is_some(), first.unwrap_or(1)));
            }
            Event::End(TagEnd::List(_)) => {
                state.lists.pop();
                if state.lists.is_empty() {
                    segments.push(Segment::ParagraphEnd);
                }
            }
            Event::Start(Tag::Item) => {
                let depth = state.lists.len();
                if let Some((ordered, number)) = state.lists.last_mut() {
                    segments.push(Segment::ListItemStart {
                        ordered: *ordered,
                        number: *number,
                        depth,
                    });
                    *number += 1;
                }
            }
            Event::End(TagEnd::Item) => segments.push(Segment::ListItemEnd),
            Event::Text(text) => {
                if let Some((_, buf)) = state.code_block.as_mut() {
                    buf.push_str(&text);
                } else if let Some((_, buf)) = state.heading.as_mut() {
                    buf.push_str(&text);
                } else if let Some(buf) = state.bold.as_mut() {
                    buf.push_str(&text);
                } else if let Some(buf) = state.italic.as_mut() {
                    buf.push_str(&text);
                } else {
                    segments.push(Segment::Text(text.to_string()));
                }
            }
            Event::Code(code) => {
                if let Some((_, buf)) = state.heading.as_mut() {
                    buf.push_str(&code);
                } else {
                    segments.push(Segment::InlineCode(code.to_string()));
                }
            }
            Event::SoftBreak => {
                if let Some((_, buf)) = state.heading.as_mut() {
                    buf.push(' ');
                } else {
                    segments.push(Segment::SoftBreak);
                }
            }
            Event::HardBreak => segments.push(Segment::HardBreak),
            Event::End(TagEnd::Paragraph) => segments.push(Segment::ParagraphEnd),
            Event::Rule => segments.push(Segment::Rule),
            _ => {}
        }
    }

    segments
}

/// Word-wrap to a display width, using unicode widths so emojis and CJK
/// count correctly.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }
    let mut out: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;
    for word in text.split_whitespace() {
        let word_width = word.width();
        if line.is_empty() {
            line.push_str(word);
            line_width = word_width;
        } else if line_width + 1 + word_width <= width {
            line.push(' ');
            line.push_str(word);
            line_width += 1 + word_width;
        } else {
            out.push(std::mem::take(&mut line));
            line.push_str(word);
            line_width = word_width;
        }
    }
    if !line.is_empty() {
        out.push(line);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

struct LineBuilder {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    width_used: usize,
}

impl LineBuilder {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            spans: Vec::new(),
            width_used: 0,
        }
    }

    fn flush(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.width_used = 0;
    }

    fn push_span(&mut self, span: Span<'static>) {
        self.width_used += span.content.width();
        self.spans.push(span);
    }

    /// Push styled inline text, wrapping at the display width. Leading and
    /// trailing whitespace collapse to single separators so inline spans
    /// (code, bold) keep their spacing.
    fn push_wrapped(&mut self, text: &str, style: Style, width: usize) {
        let leading = text.starts_with(char::is_whitespace);
        let trailing = text.ends_with(char::is_whitespace);
        let mut first = true;
        for part in text.split('\n') {
            for chunk in wrap(part, width) {
                let chunk_width = chunk.width();
                if self.width_used > 0 && self.width_used + 1 + chunk_width > width {
                    self.flush();
                }
                if first && leading && self.width_used > 0 {
                    self.push_span(Span::raw(" "));
                }
                first = false;
                self.push_span(Span::styled(chunk, style));
            }
        }
        if trailing && self.width_used > 0 && self.width_used < width {
            self.push_span(Span::raw(" "));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        self.lines
    }
}

fn to_lines(segments: &[Segment], width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new();

    for segment in segments {
        match segment {
            Segment::Text(text) => {
                builder.push_wrapped(text, Style::default().fg(theme.foreground), width);
            }
            Segment::Bold(text) => {
                builder.push_wrapped(
                    text,
                    Style::default().add_modifier(Modifier::BOLD),
                    width,
                );
            }
            Segment::Italic(text) => {
                builder.push_wrapped(
                    text,
                    Style::default().add_modifier(Modifier::ITALIC),
                    width,
                );
            }
            Segment::InlineCode(code) => {
                builder.push_span(Span::styled(
                    code.clone(),
                    Style::default().fg(theme.code_inline),
                ));
            }
            Segment::CodeBlock { lang, code } => {
                builder.flush();
                let json = lang.as_deref() == Some("json");
                for line in code.lines() {
                    if json {
                        let mut spans = vec![Span::raw("  ")];
                        spans.extend(highlight_json_line(line, theme));
                        builder.lines.push(Line::from(spans));
                    } else {
                        builder.lines.push(Line::from(Span::styled(
                            format!("  {}", line),
                            Style::default().fg(theme.code_block),
                        )));
                    }
                }
            }
            Segment::Heading { level, text } => {
                builder.flush();
                let style = Style::default()
                    .fg(theme.heading)
                    .add_modifier(Modifier::BOLD);
                let prefix = "#".repeat(*level as usize);
                builder
                    .lines
                    .push(Line::from(Span::styled(format!("{} {}", prefix, text), style)));
            }
            Segment::ListItemStart {
                ordered,
                number,
                depth,
            } => {
                builder.flush();
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = if *ordered {
                    format!("{}{}. ", indent, number)
                } else {
                    format!("{}• ", indent)
                };
                builder.push_span(Span::styled(marker, Style::default().fg(theme.border)));
            }
            Segment::ListItemEnd => builder.flush(),
            Segment::SoftBreak => {
                if builder.width_used > 0 {
                    builder.push_span(Span::raw(" "));
                }
            }
            Segment::HardBreak => builder.flush(),
            Segment::ParagraphEnd => {
                builder.flush();
                builder.lines.push(Line::from(""));
            }
            Segment::Rule => {
                builder.flush();
                builder.lines.push(Line::from(Span::styled(
                    "─".repeat(width.max(10)),
                    Style::default().fg(theme.border),
                )));
            }
        }
    }

    let mut lines = builder.finish();
    // Trim the trailing paragraph spacer so components pack cleanly.
    while matches!(lines.last(), Some(line) if line.spans.iter().all(|s| s.content.is_empty())) {
        lines.pop();
    }
    lines
}

/// Parse markdown and convert to themed, wrapped lines.
pub fn render_markdown(markdown: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    to_lines(&parse(markdown), width, theme)
}

/// Highlight one line of pretty-printed JSON.
///
/// Keys take the heading color, numbers the highlight color, keywords the
/// metric color; punctuation stays on the border color.
pub(crate) fn highlight_json_line(line: &str, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let ch = rest.chars().next().expect("non-empty");
        if ch == '"' {
            // Scan the quoted string, honoring escapes.
            let mut end = 1;
            let bytes = rest.as_bytes();
            while end < bytes.len() {
                match bytes[end] {
                    b'\\' => end += 2,
                    b'"' => {
                        end += 1;
                        break;
                    }
                    _ => end += 1,
                }
            }
            let end = end.min(rest.len());
            let (string, tail) = rest.split_at(end);
            let is_key = tail.trim_start().starts_with(':');
            let style = if is_key {
                Style::default().fg(theme.heading)
            } else {
                Style::default().fg(theme.foreground)
            };
            spans.push(Span::styled(string.to_string(), style));
            rest = tail;
        } else if "{}[]:,".contains(ch) {
            spans.push(Span::styled(
                ch.to_string(),
                Style::default().fg(theme.border),
            ));
            rest = &rest[ch.len_utf8()..];
        } else if ch.is_whitespace() {
            let end = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            let (ws, tail) = rest.split_at(end);
            spans.push(Span::raw(ws.to_string()));
            rest = tail;
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || "{}[]:,\"".contains(c))
                .unwrap_or(rest.len());
            let (token, tail) = rest.split_at(end);
            let style = match token {
                "true" | "false" | "null" => Style::default().fg(theme.metric_value),
                _ => Style::default().fg(theme.highlight),
            };
            spans.push(Span::styled(token.to_string(), style));
            rest = tail;
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_inline_code_is_a_separate_span() {
        let lines = render_markdown("see `main.rs` here", 80, &Theme::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans.len() >= 3);
        assert!(line_text(&lines[0]).contains("main.rs"));
    }

    #[test]
    fn test_code_block_preserves_lines() {
        let lines = render_markdown("```rust\nfn main() {}\nlet x = 1;\n```", 80, &Theme::default());
        assert_eq!(lines.len(), 2);
        assert!(line_text(&lines[0]).contains("fn main"));
    }

    #[test]
    fn test_wrapping_respects_width() {
        let lines = render_markdown("one two three four five six seven", 10, &Theme::default());
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line_text(line).len() <= 10);
        }
    }

    #[test]
    fn test_heading_rendered_bold_with_marker() {
        let lines = render_markdown("## Section", 80, &Theme::default());
        assert_eq!(line_text(&lines[0]), "## Section");
    }

    #[test]
    fn test_list_markers() {
        let lines = render_markdown("- a\n- b\n1. c", 80, &Theme::default());
        let text: Vec<String> = lines.iter().map(line_text).collect();
        assert!(text.iter().any(|l| l.starts_with("• a")));
        assert!(text.iter().any(|l| l.starts_with("1. c")));
    }

    #[test]
    fn test_json_highlighting_splits_tokens() {
        let spans = highlight_json_line("  \"key\": 42,", &Theme::default());
        let joined: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(joined, "  \"key\": 42,");
        assert!(spans.len() >= 4);
    }
}
