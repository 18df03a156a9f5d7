//! Plain-text promotion

use splice_markup::escape::escape_text;
use tracing::debug;

const TAB_WIDTH: usize = 4;

/// Promote plain text to paragraph markup
///
/// Blank lines separate paragraphs, remaining line breaks become `<br>`,
/// and runs of spaces survive as `&nbsp;`.
///
/// ```text
/// "Hello\nWorld\n\nNext"  →  "<p>Hello<br>World</p><p>Next</p>"
/// ```
pub fn promote_plain_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut output = String::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut paragraphs = 0;

    for line in normalized.split('\n') {
        if line.trim().is_empty() && !line.contains('\u{a0}') {
            if !paragraph.is_empty() {
                write_paragraph(&mut output, &paragraph);
                paragraph.clear();
                paragraphs += 1;
            }
            continue;
        }
        paragraph.push(line);
    }
    if !paragraph.is_empty() {
        write_paragraph(&mut output, &paragraph);
        paragraphs += 1;
    }

    debug!(input = text.len(), paragraphs, "promoted plain text");
    output
}

fn write_paragraph(output: &mut String, lines: &[&str]) {
    output.push_str("<p>");
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            output.push_str("<br>");
        }
        output.push_str(&preserve_spaces(line));
    }
    output.push_str("</p>");
}

/// Escape a line, keeping leading, trailing and repeated spaces visible
fn preserve_spaces(line: &str) -> String {
    let expanded = line.replace('\t', &" ".repeat(TAB_WIDTH));
    let escaped = escape_text(&expanded);
    let chars: Vec<char> = escaped.chars().collect();

    let mut out = String::with_capacity(escaped.len());
    let mut previous_space = false;
    for (index, &c) in chars.iter().enumerate() {
        if c != ' ' {
            out.push(c);
            previous_space = false;
            continue;
        }
        let at_edge = index == 0 || index + 1 == chars.len();
        if at_edge || previous_space {
            out.push_str("&nbsp;");
            previous_space = false;
        } else {
            out.push(' ');
            previous_space = true;
        }
    }
    out
}
