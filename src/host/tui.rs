//! Ratatui implementation of the host rendering capability.
//!
//! Line-oriented: each capability call appends themed `Line`s, and the
//! finished transcript is handed to a `Paragraph` (or any widget taking
//! `Text`). Scoped regions render into a nested host and come back indented
//! behind a border glyph, which is how "collapsible" and "grouped" translate
//! to a scrollback-style terminal transcript.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use unicode_width::UnicodeWidthStr;

use super::RenderHost;
use crate::markdown;
use crate::theme::Theme;
use crate::value::{Figure, TableData};

/// Vertical resolution of the sparkline glyph set.
const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Collects a rendered transcript as styled lines.
pub struct TuiHost {
    theme: Theme,
    width: usize,
    lines: Vec<Line<'static>>,
}

impl TuiHost {
    pub fn new(width: usize, theme: Theme) -> Self {
        Self {
            theme,
            width: width.max(20),
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Finish and hand the transcript to a ratatui widget.
    pub fn into_text(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn push(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn blank(&mut self) {
        self.push(Line::from(""));
    }

    /// Render a nested region and splice it back behind a prefix span.
    fn nested(&mut self, prefix: Span<'static>, body: &mut dyn FnMut(&mut dyn RenderHost)) {
        let inner_width = self.width.saturating_sub(prefix.content.width());
        let mut inner = TuiHost::new(inner_width, self.theme.clone());
        body(&mut inner);
        for line in inner.lines {
            let mut spans = vec![prefix.clone()];
            spans.extend(line.spans);
            self.push(Line::from(spans));
        }
    }

    fn border_style(&self) -> Style {
        Style::default().fg(self.theme.border)
    }
}

impl RenderHost for TuiHost {
    fn text(&mut self, text: &str) {
        let rendered = markdown::render_markdown(text, self.width, &self.theme);
        self.lines.extend(rendered);
    }

    fn table(&mut self, table: &TableData) {
        // Column widths from the widest cell, floor 3 for readability.
        let mut widths: Vec<usize> = table.columns.iter().map(|c| c.width().max(3)).collect();
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.width());
                }
            }
        }

        let border = self.border_style();
        let header_style = Style::default()
            .fg(self.theme.heading)
            .add_modifier(Modifier::BOLD);
        let cell_style = Style::default().fg(self.theme.foreground);

        let rule = |left: &str, mid: &str, right: &str| -> Line<'static> {
            let mut s = String::from(left);
            for (i, w) in widths.iter().enumerate() {
                s.push_str(&"─".repeat(w + 2));
                s.push_str(if i + 1 < widths.len() { mid } else { right });
            }
            Line::from(Span::styled(s, border))
        };
        let data_row = |cells: &[String], style: Style| -> Line<'static> {
            let mut spans = vec![Span::styled("│", border)];
            for (i, w) in widths.iter().enumerate() {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = w.saturating_sub(cell.width());
                spans.push(Span::styled(format!(" {}{} ", cell, " ".repeat(pad)), style));
                spans.push(Span::styled("│", border));
            }
            Line::from(spans)
        };

        self.push(rule("┌", "┬", "┐"));
        self.push(data_row(&table.columns, header_style));
        self.push(rule("├", "┼", "┤"));
        for row in &table.rows {
            self.push(data_row(row, cell_style));
        }
        self.push(rule("└", "┴", "┘"));
    }

    fn figure(&mut self, figure: &Figure) {
        if let Some(title) = &figure.title {
            self.push(Line::from(Span::styled(
                title.clone(),
                Style::default()
                    .fg(self.theme.heading)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        for series in &figure.series {
            let values: Vec<f64> = series.points.iter().map(|(_, y)| *y).collect();
            let spark = sparkline(&values, self.width.saturating_sub(series.name.width() + 2));
            self.push(Line::from(vec![
                Span::styled(format!("{}: ", series.name), self.border_style()),
                Span::styled(spark, Style::default().fg(self.theme.metric_value)),
            ]));
        }
        if figure.series.is_empty() {
            self.push(Line::from(Span::styled(
                "(empty figure)".to_string(),
                self.border_style().add_modifier(Modifier::DIM),
            )));
        }
    }

    fn metric(&mut self, value: &str, label: Option<&str>, delta: Option<&str>) {
        let value_style = Style::default()
            .fg(self.theme.metric_value)
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![Span::styled(value.to_string(), value_style)];
        if let Some(delta) = delta {
            let down = delta.starts_with('-') || delta.starts_with('▼');
            let (arrow, color) = if down {
                ("▼", self.theme.delta_down)
            } else {
                ("▲", self.theme.delta_up)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("{} {}", arrow, delta.trim_start_matches(['-', '+', '▲', '▼'])),
                Style::default().fg(color),
            ));
        }
        if let Some(label) = label {
            self.push(Line::from(Span::styled(
                label.to_string(),
                self.border_style(),
            )));
        }
        self.push(Line::from(spans));
    }

    fn code(&mut self, source: &str, language: Option<&str>) {
        let header = match language {
            Some(lang) => format!("┌─ {} ", lang),
            None => "┌─ ".to_string(),
        };
        let pad = "─".repeat(self.width.saturating_sub(header.width()));
        self.push(Line::from(Span::styled(
            format!("{}{}", header, pad),
            self.border_style(),
        )));
        let json = language == Some("json");
        for line in source.lines() {
            let mut spans = vec![Span::styled("│ ".to_string(), self.border_style())];
            if json {
                spans.extend(markdown::highlight_json_line(line, &self.theme));
            } else {
                spans.push(Span::styled(
                    line.to_string(),
                    Style::default().fg(self.theme.code_block),
                ));
            }
            self.push(Line::from(spans));
        }
        self.push(Line::from(Span::styled(
            format!("└{}", "─".repeat(self.width.saturating_sub(1))),
            self.border_style(),
        )));
    }

    fn structured(&mut self, value: &serde_json::Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        for line in pretty.lines() {
            let spans = markdown::highlight_json_line(line, &self.theme);
            self.push(Line::from(spans));
        }
    }

    fn markup(&mut self, markup: &str) {
        // No markup engine in a terminal transcript: show the raw source,
        // dimmed so it reads as literal.
        for line in markup.lines() {
            self.push(Line::from(Span::styled(
                line.to_string(),
                Style::default()
                    .fg(self.theme.foreground)
                    .add_modifier(Modifier::DIM),
            )));
        }
    }

    fn error(&mut self, message: &str) {
        self.push(Line::from(Span::styled(
            format!("✖ {}", message),
            Style::default()
                .fg(self.theme.error)
                .add_modifier(Modifier::BOLD),
        )));
    }

    fn debug_panel(&mut self, title: &str, body: &mut dyn FnMut(&mut dyn RenderHost)) {
        self.push(Line::from(Span::styled(
            format!("▸ {}", title),
            self.border_style().add_modifier(Modifier::DIM),
        )));
        let prefix = Span::styled("│ ".to_string(), self.border_style().add_modifier(Modifier::DIM));
        self.nested(prefix, body);
    }

    fn message_group(&mut self, role: &str, avatar: &str, body: &mut dyn FnMut(&mut dyn RenderHost)) {
        let role_color = match role {
            "user" => self.theme.role_user,
            _ => self.theme.role_assistant,
        };
        let header = format!("{} {} ", avatar, role);
        let pad = "─".repeat(self.width.saturating_sub(header.width() + 3));
        self.push(Line::from(vec![
            Span::styled(
                header,
                Style::default().fg(role_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("── {}", pad), self.border_style()),
        ]));
        self.nested(Span::raw("  "), body);
        self.blank();
    }
}

/// Min-max normalize values into block glyphs, resampling to fit the width.
fn sparkline(values: &[f64], max_width: usize) -> String {
    if values.is_empty() || max_width == 0 {
        return String::new();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        max - min
    };

    let count = values.len().min(max_width);
    (0..count)
        .map(|i| {
            // Nearest-sample resampling when there are more points than cells.
            let idx = i * values.len() / count;
            let norm = (values[idx] - min) / range;
            let bucket = ((norm * (SPARK_CHARS.len() - 1) as f64).round() as usize)
                .min(SPARK_CHARS.len() - 1);
            SPARK_CHARS[bucket]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FigureEcosystem, Series};

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_table_draws_box_with_all_rows() {
        let mut host = TuiHost::new(80, Theme::default());
        host.table(&TableData::new(
            ["name", "value"],
            vec![
                vec!["a".to_string(), "1".to_string()],
                vec!["b".to_string(), "2".to_string()],
            ],
        ));
        let lines = plain(host.lines());
        // top rule, header, separator, 2 rows, bottom rule
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("name"));
        assert!(lines[3].contains('a'));
        assert!(lines[0].starts_with('┌'));
        assert!(lines[5].starts_with('└'));
    }

    #[test]
    fn test_figure_renders_sparkline_per_series() {
        let figure = Figure::new(FigureEcosystem::Plotly)
            .with_title("Growth")
            .with_series("s1", vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
        let mut host = TuiHost::new(80, Theme::default());
        host.figure(&figure);
        let lines = plain(host.lines());
        assert_eq!(lines[0], "Growth");
        assert!(lines[1].starts_with("s1: "));
        assert!(lines[1].contains('█'));
    }

    #[test]
    fn test_metric_shows_delta_direction() {
        let mut host = TuiHost::new(80, Theme::default());
        host.metric("42", Some("Answer"), Some("-3"));
        let lines = plain(host.lines());
        assert_eq!(lines[0], "Answer");
        assert!(lines[1].contains("42"));
        assert!(lines[1].contains('▼'));
    }

    #[test]
    fn test_debug_panel_indents_body() {
        let mut host = TuiHost::new(80, Theme::default());
        host.debug_panel("Debug details", &mut |h| h.text("inner"));
        let lines = plain(host.lines());
        assert!(lines[0].starts_with("▸ Debug details"));
        assert!(lines[1].starts_with("│ "));
        assert!(lines[1].contains("inner"));
    }

    #[test]
    fn test_message_group_header_and_indent() {
        let mut host = TuiHost::new(80, Theme::default());
        host.message_group("assistant", "🤖", &mut |h| h.text("hi"));
        let lines = plain(host.lines());
        assert!(lines[0].contains("assistant"));
        assert!(lines[1].starts_with("  hi"));
    }

    #[test]
    fn test_structured_pretty_prints() {
        let mut host = TuiHost::new(80, Theme::default());
        host.structured(&serde_json::json!({"a": 1}));
        let lines = plain(host.lines());
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("\"a\""));
    }

    #[test]
    fn test_sparkline_resamples_to_width() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let spark = sparkline(&values, 10);
        assert_eq!(spark.chars().count(), 10);
        assert!(spark.starts_with('▁'));
        assert!(spark.ends_with('█'));
    }

    #[test]
    fn test_series_table_via_coercion() {
        let series = Series::new("s", vec![("x".into(), 1.0)]);
        let mut host = TuiHost::new(80, Theme::default());
        host.table(&series.to_table());
        assert!(plain(host.lines()).iter().any(|l| l.contains('x')));
    }
}
