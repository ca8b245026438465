use crate::transform::Transform;
use crate::tree::{AttrValue, Node, walk_mut};

/// Marker text appended to links that leave the site.
pub const EXTERNAL_MARKER: &str = " ↗";

/// Decorates links that point off-site: `target="_blank"`,
/// `rel="noopener"`, and a trailing marker glyph.
///
/// Runs after link rewriting, so repository links that became local
/// paths are not decorated.
#[derive(Default)]
pub struct ExternalLinks;

impl ExternalLinks {
    pub fn new() -> Self {
        Self
    }
}

fn is_external(dest: &str) -> bool {
    dest.starts_with("http://") || dest.starts_with("https://")
}

impl Transform for ExternalLinks {
    fn name(&self) -> &str {
        "external-links"
    }

    fn apply(&self, tree: &mut Node) {
        walk_mut(tree, &mut |node| {
            let Some(el) = node.as_element_mut() else {
                return;
            };
            if el.tag != "a" {
                return;
            }
            let Some(dest) = el.text_attr("href") else {
                return;
            };
            if !is_external(dest) {
                return;
            }
            el.set_attr("target", AttrValue::Text("_blank".into()));
            el.set_attr("rel", AttrValue::List(vec!["noopener".into()]));
            let already_marked = matches!(
                el.children.last(),
                Some(Node::Text(text)) if text == EXTERNAL_MARKER
            );
            if !already_marked {
                el.push_child(Node::text(EXTERNAL_MARKER));
            }
        });
    }
}
