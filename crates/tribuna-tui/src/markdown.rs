//! Markdown rendering to ratatui lines.
//!
//! Backend answers are mostly prose with headings, emphasis and lists.
//! Raw HTML is skipped so backend output can never inject terminal
//! escapes through the renderer.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

/// Renders markdown source into styled lines.
pub fn render_markdown(source: &str) -> Vec<Line<'static>> {
    let mut renderer = Renderer::default();
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    for event in parser {
        renderer.handle(event);
    }
    renderer.finish()
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Nesting depth of list containers; items indent per level.
    list_depth: usize,
    in_code_block: bool,
}

impl Renderer {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(&tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    for line in text.lines() {
                        self.push_span(format!("  {line}"));
                        self.flush_line();
                    }
                } else {
                    self.push_span(text.to_string());
                }
            }
            Event::Code(code) => {
                let style = self.current_style().add_modifier(Modifier::DIM);
                self.current.push(Span::styled(format!("`{code}`"), style));
            }
            Event::SoftBreak => self.push_span(" ".to_string()),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::from("───"));
            }
            // Raw HTML is not rendered.
            Event::Html(_) | Event::InlineHtml(_) => {}
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let style = Style::default().add_modifier(Modifier::BOLD);
                self.styles.push(style);
                let marker = "#".repeat(heading_depth(*level));
                self.current.push(Span::styled(format!("{marker} "), style));
            }
            Tag::Paragraph => {
                if !self.current.is_empty() {
                    self.flush_line();
                }
            }
            Tag::Emphasis => self.styles.push(
                self.current_style().add_modifier(Modifier::ITALIC),
            ),
            Tag::Strong => self.styles.push(
                self.current_style().add_modifier(Modifier::BOLD),
            ),
            Tag::Strikethrough => self.styles.push(
                self.current_style().add_modifier(Modifier::CROSSED_OUT),
            ),
            Tag::List(_) => {
                self.flush_line();
                self.list_depth += 1;
            }
            Tag::Item => {
                self.flush_line();
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                self.push_span(format!("{indent}- "));
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.push_span("> ".to_string());
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                if let CodeBlockKind::Fenced(language) = kind
                    && !language.is_empty()
                {
                    self.push_span(format!("  [{language}]"));
                    self.flush_line();
                }
                self.in_code_block = true;
                self.styles.push(Style::default().add_modifier(Modifier::DIM));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.flush_line();
                self.lines.push(Line::default());
            }
            TagEnd::Paragraph => {
                self.flush_line();
                self.lines.push(Line::default());
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.lines.push(Line::default());
                }
            }
            TagEnd::Item | TagEnd::BlockQuote(_) => self.flush_line(),
            TagEnd::CodeBlock => {
                self.flush_line();
                self.styles.pop();
                self.in_code_block = false;
                self.lines.push(Line::default());
            }
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_span(&mut self, text: String) {
        self.current.push(Span::styled(text, self.current_style()));
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            let spans = std::mem::take(&mut self.current);
            self.lines.push(Line::from(spans));
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn test_plain_paragraph() {
        let lines = render_markdown("El PSOE propone ampliar el parque público.");
        assert_eq!(plain(&lines), vec!["El PSOE propone ampliar el parque público."]);
    }

    #[test]
    fn test_heading_and_list() {
        let lines = render_markdown("## Vivienda\n\n- construir más\n- regular alquileres\n");
        let text = plain(&lines);
        assert_eq!(text[0], "## Vivienda");
        assert!(text.contains(&"- construir más".to_string()));
        assert!(text.contains(&"- regular alquileres".to_string()));
    }

    #[test]
    fn test_bold_sets_modifier() {
        let lines = render_markdown("los programas de **PSOE, PP y VOX**");
        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content.as_ref() == "PSOE, PP y VOX")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_soft_break_joins_with_space() {
        let lines = render_markdown("una línea\notra línea");
        assert_eq!(plain(&lines), vec!["una línea otra línea"]);
    }

    #[test]
    fn test_html_is_dropped() {
        let lines = render_markdown("antes <script>alert(1)</script> después");
        let joined = plain(&lines).join("");
        assert!(!joined.contains("script"));
        assert!(joined.contains("antes"));
        assert!(joined.contains("después"));
    }

    #[test]
    fn test_nested_list_indents() {
        let lines = render_markdown("- padre\n  - hijo\n");
        let text = plain(&lines);
        assert!(text.contains(&"- padre".to_string()));
        assert!(text.contains(&"  - hijo".to_string()));
    }
}
