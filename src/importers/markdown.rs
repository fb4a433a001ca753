//! Lightweight HTML to markdown conversion for archived pages.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("valid space regex"));

/// Converts an element subtree to markdown, passing image sources through `image_src`
pub struct MarkdownConverter<'a> {
    image_src: &'a dyn Fn(&str) -> String,
}

impl<'a> MarkdownConverter<'a> {
    pub fn new(image_src: &'a dyn Fn(&str) -> String) -> Self {
        Self { image_src }
    }

    pub fn convert(&self, root: ElementRef<'_>) -> String {
        collapse_blank_lines(&self.children(root))
    }

    fn children(&self, el: ElementRef<'_>) -> String {
        let mut out = String::new();
        for child in el.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&collapse_whitespace(text)),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        out.push_str(&self.element(child));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn inline(&self, el: ElementRef<'_>) -> String {
        SPACE_RUNS.replace_all(self.children(el).trim(), " ").into_owned()
    }

    fn element(&self, el: ElementRef<'_>) -> String {
        let name = el.value().name();
        match name {
            "script" | "style" | "noscript" | "template" | "head" | "iframe" => String::new(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse::<usize>().unwrap_or(1);
                block(&format!("{} {}", "#".repeat(level), self.inline(el)))
            }
            "p" => block(&self.inline(el)),
            "br" => "\n".to_string(),
            "hr" => block("---"),
            "strong" | "b" => wrap_inline(&self.inline(el), "**"),
            "em" | "i" => wrap_inline(&self.inline(el), "_"),
            "code" => wrap_inline(&self.inline(el), "`"),
            "pre" => {
                let code: String = el.text().collect();
                block(&format!("```\n{}\n```", code.trim_matches('\n')))
            }
            "a" => {
                let text = self.inline(el);
                match el.value().attr("href").map(str::trim) {
                    Some(href) if !href.is_empty() && !text.is_empty() => format!("[{}]({})", text, href),
                    _ => text,
                }
            }
            "img" => match el.value().attr("src").map(str::trim) {
                Some(src) if !src.is_empty() => {
                    let alt = el.value().attr("alt").unwrap_or("").trim();
                    format!("![{}]({})", alt, (self.image_src)(src))
                }
                _ => String::new(),
            },
            "ul" => self.list(el, false),
            "ol" => self.list(el, true),
            "li" => block(&format!("- {}", self.inline(el))),
            "blockquote" => {
                let inner = collapse_blank_lines(&self.children(el));
                let quoted: Vec<String> = inner
                    .lines()
                    .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
                    .collect();
                block(&quoted.join("\n"))
            }
            "table" => self.table(el),
            "div" | "section" | "article" | "header" | "footer" | "main" | "aside" | "nav" | "figure"
            | "form" | "body" | "dl" => block(&self.children(el)),
            "dt" | "dd" | "figcaption" | "caption" => block(&self.inline(el)),
            _ => self.children(el),
        }
    }

    fn list(&self, el: ElementRef<'_>, ordered: bool) -> String {
        let items: Vec<String> = el
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .enumerate()
            .map(|(n, li)| {
                let marker = if ordered { format!("{}. ", n + 1) } else { "- ".to_string() };
                let indent = format!("\n{}", " ".repeat(marker.len()));
                let content = self.children(li);
                let lines: Vec<&str> = content
                    .trim()
                    .lines()
                    .map(str::trim_end)
                    .filter(|line| !line.trim().is_empty())
                    .collect();
                format!("{}{}", marker, lines.join(&indent))
            })
            .collect();
        block(&items.join("\n"))
    }

    fn table(&self, el: ElementRef<'_>) -> String {
        let rows: Vec<String> = el
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|node| node.value().name() == "tr")
            .map(|tr| {
                let cells: Vec<String> = tr
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(|cell| self.inline(cell).replace('\n', " "))
                    .collect();
                format!("| {} |", cells.join(" | "))
            })
            .collect();
        block(&rows.join("\n"))
    }
}

fn block(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", content)
    }
}

fn wrap_inline(content: &str, marker: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("{}{}{}", marker, content, marker)
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Strip trailing spaces and squeeze runs of blank lines to a single blank line
pub fn collapse_blank_lines(markdown: &str) -> String {
    let trimmed: Vec<&str> = markdown.lines().map(str::trim_end).collect();
    BLANK_RUNS.replace_all(&trimmed.join("\n"), "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn convert(html: &str) -> String {
        let doc = Html::parse_document(html);
        let main = Selector::parse("main").unwrap();
        let root = doc.select(&main).next().unwrap();
        let rewrite = |src: &str| format!("/x/{}", src);
        MarkdownConverter::new(&rewrite).convert(root)
    }

    #[test]
    fn converts_common_markup() {
        let md = convert(
            "<main><h1>Title</h1>\n<p>Hello   <b>world</b>, see <a href=\"/c\">contact</a></p>\
             <ul><li>One</li><li>Two</li></ul><img src=\"a.jpg\" alt=\"A\"><script>x()</script></main>",
        );
        assert_eq!(
            md,
            "# Title\n\nHello **world**, see [contact](/c)\n\n- One\n- Two\n\n![A](/x/a.jpg)"
        );
    }

    #[test]
    fn numbers_ordered_lists_and_fences_code() {
        let md = convert("<main><ol><li>a</li><li>b</li></ol><pre>let x = 1;\n  y</pre></main>");
        assert_eq!(md, "1. a\n2. b\n\n```\nlet x = 1;\n  y\n```");
    }

    #[test]
    fn renders_tables_and_quotes() {
        let md = convert(
            "<main><table><tr><th>Beds</th><th>Baths</th></tr><tr><td>3</td><td>2</td></tr></table>\
             <blockquote><p>Great view</p></blockquote></main>",
        );
        assert_eq!(md, "| Beds | Baths |\n| 3 | 2 |\n\n> Great view");
    }

    #[test]
    fn squeezes_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\nb  \n \n\n\nc"), "a\n\nb\n\nc");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
    }
}
