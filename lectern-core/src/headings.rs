use std::collections::HashMap;

use crate::config::TocConfig;
use crate::sidebar::NavItem;
use crate::transform::Transform;
use crate::tree::{AttrValue, Node, text_content, walk, walk_mut};

/// GitHub-style heading slug: lowercase, alphanumerics and underscores
/// kept, whitespace and dashes become a single dash, the rest dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else if (c.is_whitespace() || c == '-') && !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn heading_level(tag: &str) -> Option<u32> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Assigns an `id` to every heading that lacks one, slugified from its
/// text content. Duplicate slugs within one tree get `-1`, `-2`, …
/// suffixes in document order. Authored ids are kept, but still reserve
/// their slug.
#[derive(Default)]
pub struct HeadingIds;

impl HeadingIds {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for HeadingIds {
    fn name(&self) -> &str {
        "heading-ids"
    }

    fn apply(&self, tree: &mut Node) {
        let mut seen: HashMap<String, usize> = HashMap::new();
        walk_mut(tree, &mut |node| {
            match node.as_element() {
                Some(el) if heading_level(&el.tag).is_some() => {
                    if let Some(existing) = el.text_attr("id") {
                        seen.entry(existing.to_string()).or_insert(1);
                        return;
                    }
                }
                _ => return,
            }
            let mut base = slugify(&text_content(node));
            if base.is_empty() {
                base = "section".to_string();
            }
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let slug = if *count == 1 {
                base
            } else {
                format!("{}-{}", base, *count - 1)
            };
            if let Some(el) = node.as_element_mut() {
                el.set_attr("id", AttrValue::Text(slug));
            }
        });
    }
}

/// The "on this page" listing: headings within the configured level
/// range, linked by their slug.
pub fn outline(tree: &Node, toc: TocConfig) -> Vec<NavItem> {
    let mut items = Vec::new();
    walk(tree, &mut |node| {
        let Some(el) = node.as_element() else {
            return;
        };
        let Some(level) = heading_level(&el.tag) else {
            return;
        };
        if level < toc.min_level || level > toc.max_level {
            return;
        }
        let text = text_content(node).trim().to_string();
        let slug = match el.text_attr("id") {
            Some(id) => id.to_string(),
            None => slugify(&text),
        };
        items.push(NavItem {
            text,
            link: format!("#{}", slug),
        });
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;

    fn heading(tag: &str, text: &str) -> Node {
        let mut el = Element::new(tag);
        el.push_child(Node::text(text));
        Node::Element(el)
    }

    fn tree_of(children: Vec<Node>) -> Node {
        let mut root = Element::new("root");
        root.children = children;
        Node::Element(root)
    }

    fn ids(tree: &Node) -> Vec<String> {
        let mut out = Vec::new();
        walk(tree, &mut |node| {
            if let Some(el) = node.as_element() {
                if let Some(id) = el.text_attr("id") {
                    out.push(id.to_string());
                }
            }
        });
        out
    }

    #[test]
    fn slugify_folds_case_and_separators() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  What's  new?  "), "whats-new");
        assert_eq!(slugify("GPIO - Pins & Wiring"), "gpio-pins-wiring");
        assert_eq!(slugify("420-302-VA_A25"), "420-302-va_a25");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn headings_get_slug_ids() {
        let mut tree = tree_of(vec![
            heading("h1", "Week 1"),
            heading("h2", "Setup"),
            heading("h3", "Wiring the Board"),
        ]);
        HeadingIds::new().apply(&mut tree);
        assert_eq!(ids(&tree), vec!["week-1", "setup", "wiring-the-board"]);
    }

    #[test]
    fn duplicate_slugs_are_numbered_in_document_order() {
        let mut tree = tree_of(vec![
            heading("h2", "Exercise"),
            heading("h2", "Exercise"),
            heading("h2", "Exercise"),
        ]);
        HeadingIds::new().apply(&mut tree);
        assert_eq!(ids(&tree), vec!["exercise", "exercise-1", "exercise-2"]);
    }

    #[test]
    fn authored_ids_are_kept_and_reserve_their_slug() {
        let mut custom = Element::new("h2");
        custom.set_attr("id", AttrValue::Text("setup".into()));
        custom.push_child(Node::text("Setup"));
        let mut tree = tree_of(vec![Node::Element(custom), heading("h2", "Setup")]);
        HeadingIds::new().apply(&mut tree);
        assert_eq!(ids(&tree), vec!["setup", "setup-1"]);
    }

    #[test]
    fn empty_heading_text_falls_back_to_a_generic_slug() {
        let mut tree = tree_of(vec![heading("h2", "???")]);
        HeadingIds::new().apply(&mut tree);
        assert_eq!(ids(&tree), vec!["section"]);
    }

    #[test]
    fn outline_respects_the_configured_level_range() {
        let mut tree = tree_of(vec![
            heading("h1", "Week 1"),
            heading("h2", "Setup"),
            heading("h4", "Checklist"),
            heading("h5", "Too Deep"),
        ]);
        HeadingIds::new().apply(&mut tree);
        let items = outline(&tree, TocConfig::default());
        let links: Vec<&str> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(links, vec!["#setup", "#checklist"]);
        assert_eq!(items[0].text, "Setup");
    }
}
