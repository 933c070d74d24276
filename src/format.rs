use once_cell::sync::Lazy;
use regex::Regex;

// A heading is **bold text** on its own line: double-asterisk pair followed by
// a newline. Headings never span lines.
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*\s*\n").expect("heading pattern is valid"));

/// Turns the raw feedback blob returned by the backend into display markup:
/// `<h2>` for each heading span, `<p>` for the body text around it.
///
/// Body text gets every newline replaced with `<br>`, then every ". "
/// replaced with ".<br>" so feedback written as one long line still wraps per
/// sentence. The period rule is a heuristic and also splits abbreviations
/// like "Mr. Smith"; known limitation, kept deliberately.
///
/// Content is trusted markup and passed through without escaping.
pub fn format_feedback(raw: &str) -> String {
    let mut out = String::new();
    let mut cursor = 0;
    for caps in HEADING.captures_iter(raw) {
        let (Some(whole), Some(title)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_body(&mut out, &raw[cursor..whole.start()]);
        out.push_str("<h2>");
        out.push_str(title.as_str());
        out.push_str("</h2>");
        cursor = whole.end();
    }
    push_body(&mut out, &raw[cursor..]);
    out
}

fn push_body(out: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    let body = segment.replace('\n', "<br>").replace(". ", ".<br>");
    out.push_str("<p>");
    out.push_str(&body);
    out.push_str("</p>");
}

/// One renderable block of formatted feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupBlock {
    Heading(String),
    Paragraph(Vec<String>),
}

/// Re-parses markup produced by [`format_feedback`] into blocks the feedback
/// panel can lay out. Only the formatter's own vocabulary (`<h2>`, `<p>`,
/// `<br>`) is understood; parsing stops at anything else.
pub fn markup_blocks(markup: &str) -> Vec<MarkupBlock> {
    let mut blocks = Vec::new();
    let mut rest = markup;
    loop {
        if let Some(inner) = rest.strip_prefix("<h2>") {
            if let Some(end) = inner.find("</h2>") {
                blocks.push(MarkupBlock::Heading(inner[..end].to_string()));
                rest = &inner[end + "</h2>".len()..];
                continue;
            }
        }
        if let Some(inner) = rest.strip_prefix("<p>") {
            if let Some(end) = inner.find("</p>") {
                let lines = inner[..end].split("<br>").map(str::to_string).collect();
                blocks.push(MarkupBlock::Paragraph(lines));
                rest = &inner[end + "</p>".len()..];
                continue;
            }
        }
        break;
    }
    blocks
}
