//! Conflict-marker rendering: Git-style (`<<<<<<< / ======= / >>>>>>>`) or
//! Diff3-style (adds a `||||||| base` section), grounded on
//! `other_examples`' `MergeResult::to_string_with_markers` shape.

use crate::merge::MarkerStyle;

pub fn render_conflict(style: MarkerStyle, base: Option<&str>, ours: &str, theirs: &str) -> String {
    let mut out = String::new();
    out.push_str("<<<<<<< ours\n");
    push_block(&mut out, ours);
    if style == MarkerStyle::Diff3 {
        out.push_str("||||||| base\n");
        push_block(&mut out, base.unwrap_or(""));
    }
    out.push_str("=======\n");
    push_block(&mut out, theirs);
    out.push_str(">>>>>>> theirs\n");
    out
}

fn push_block(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_style_omits_base_section() {
        let rendered = render_conflict(MarkerStyle::Git, Some("base text"), "ours text", "theirs text");
        assert!(rendered.starts_with("<<<<<<< ours\n"));
        assert!(!rendered.contains("||||||| base"));
        assert!(rendered.contains("=======\n"));
        assert!(rendered.contains(">>>>>>> theirs\n"));
    }

    #[test]
    fn diff3_style_includes_base_section() {
        let rendered = render_conflict(MarkerStyle::Diff3, Some("base text"), "ours text", "theirs text");
        assert!(rendered.contains("||||||| base\nbase text\n"));
    }
}
