//! HTML rendering of a sectioned index.
//!
//! The markup is a flat run of styled spans meant to be pasted into a word
//! processor and printed, not a standalone web page.

use std::io::Write;

use crate::models::Entry;
use crate::sections::{IndexDocument, Section};

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Print titles upper-cased, the way they are sorted.
    pub uppercase_titles: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            uppercase_titles: true,
        }
    }
}

pub fn render_index<W: Write>(
    doc: &IndexDocument,
    options: &RenderOptions,
    out: &mut W,
) -> std::io::Result<()> {
    for section in &doc.sections {
        writeln!(out, "{}", section_header(section.section))?;
        for entry in &section.entries {
            write_entry(out, entry, doc.has_course, options)?;
        }
    }
    out.flush()
}

/// Render into a string, mostly for callers that post-process the markup.
pub fn render_to_string(doc: &IndexDocument, options: &RenderOptions) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = render_index(doc, options, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn section_header(section: Section) -> String {
    format!(
        "<span class=Title1><b><span style='font-size:45.0pt;line-height:107%;\
         color:black'>{}</span></b></span>\
         <span style='font-size:13.5pt;line-height:107%;color:black'><br><br></span>",
        escape_html(&section.label())
    )
}

fn write_entry<W: Write>(
    out: &mut W,
    entry: &Entry,
    has_course: bool,
    options: &RenderOptions,
) -> std::io::Result<()> {
    let title = if options.uppercase_titles {
        &entry.sort_key
    } else {
        &entry.title
    };
    let book = escape_html(&entry.book);
    let page = escape_html(&entry.page);
    let reference = if has_course && !entry.course.is_empty() {
        format!("{{c-{} / b-{} / p-{}}}", escape_html(&entry.course), book, page)
    } else {
        format!("{{b-{} / p-{}}}", book, page)
    };

    writeln!(out, "<span class=topic><b><span style='color:blue'>")?;
    writeln!(out, " {} ", escape_html(title))?;
    writeln!(out, "</span></b></span><span style='color:black'>&nbsp;")?;
    writeln!(
        out,
        "<br><i>{}</i><br>{}<br></span>",
        reference,
        escape_html(&entry.description)
    )
}

/// Escape text for HTML content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
