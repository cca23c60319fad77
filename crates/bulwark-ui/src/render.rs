use bulwark_core::{View, ViewKind};

/// Renders a view tree as an indented outline, one node per line.
///
/// ```text
/// Column
///   Text "Something went wrong"
///   Button [Try Again]
/// ```
pub fn render_text(view: &View) -> String {
    let mut lines = Vec::new();
    write_node(view, 0, &mut lines);
    lines.join("\n")
}

fn write_node(view: &View, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let label = match &view.kind {
        ViewKind::Box => "Box".to_string(),
        ViewKind::Row => "Row".to_string(),
        ViewKind::Column => "Column".to_string(),
        ViewKind::Suspended => "Suspended".to_string(),
        ViewKind::Text { text } => format!("Text {text:?}"),
        ViewKind::Button { text, .. } => format!("Button [{text}]"),
    };
    lines.push(format!("{indent}{label}"));
    for child in &view.children {
        write_node(child, depth + 1, lines);
    }
}
