//! Source-preserving edits to an SVG document.
//!
//! `roxmltree` documents are read-only, so changes are recorded against byte
//! ranges of the parsed source and spliced in a single pass. Markup that is
//! not edited is kept verbatim.

use std::ops::Range;

use roxmltree::Node as XmlNode;

/// Pending replacements against one source string.
#[derive(Debug, Default)]
pub(crate) struct SvgEdits {
    edits: Vec<(Range<usize>, String)>,
}

impl SvgEdits {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push((range, text.into()));
    }

    pub(crate) fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    /// Set `name` on `node`, overwriting the value in place when present.
    pub(crate) fn set_attribute(&mut self, svg: &str, node: XmlNode<'_, '_>, name: &str, value: &str) {
        let escaped = escape_attribute(value);
        match node.attributes().find(|attribute| attribute.name() == name) {
            Some(attribute) => self.replace(attribute.range_value(), escaped),
            None => self.insert(tag_name_end(svg, node), format!(" {name}=\"{escaped}\"")),
        }
    }

    /// Drop `name` from `node` together with its leading whitespace.
    pub(crate) fn remove_attribute(&mut self, svg: &str, node: XmlNode<'_, '_>, name: &str) -> bool {
        let Some(attribute) = node.attributes().find(|attribute| attribute.name() == name) else {
            return false;
        };
        let range = attribute.range();
        let start = svg[..range.start].trim_end().len();
        self.replace(start..range.end, "");
        true
    }

    /// Append `content` after the last child of `node`. A self-closing
    /// element is opened up first.
    pub(crate) fn append_child(&mut self, svg: &str, node: XmlNode<'_, '_>, content: &str) {
        let range = node.range();
        let source = &svg[range.clone()];
        if source.ends_with("/>") {
            let name = &svg[range.start + 1..tag_name_end(svg, node)];
            self.replace(range.end - 2..range.end, format!(">{content}</{name}>"));
        } else {
            let close = source
                .rfind("</")
                .map_or(range.end, |offset| range.start + offset);
            self.insert(close, content);
        }
    }

    /// Splice every edit into `svg`. Edits must not overlap; insertions at
    /// the same offset keep the order they were recorded in.
    pub(crate) fn apply(self, svg: &str) -> String {
        let mut ordered: Vec<(usize, Range<usize>, String)> = self
            .edits
            .into_iter()
            .enumerate()
            .map(|(seq, (range, text))| (seq, range, text))
            .collect();
        ordered.sort_by_key(|(seq, range, _)| (range.start, range.end, *seq));

        let mut output = svg.to_string();
        for (_, range, text) in ordered.into_iter().rev() {
            output.replace_range(range, &text);
        }
        output
    }
}

/// Byte offset just past the element's qualified name in its start tag.
fn tag_name_end(svg: &str, node: XmlNode<'_, '_>) -> usize {
    let start = node.range().start + 1;
    let length = svg[start..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(0);
    start + length
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
