use std::fmt;

use crate::config::SiteConfig;
use crate::transform::Transform;
use crate::tree::{AttrValue, Node, walk_mut};

/// The one recognized content-file extension. A file reference becomes a
/// directory-style canonical link when it is stripped.
pub const CONTENT_EXTENSION: &str = ".md";

/// The four content categories whose repository browsing URLs are
/// rewritten to local paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Assignments,
    Labs,
    Guides,
    Theory,
}

impl Category {
    /// Declared rewrite order. First structural match wins; the derived
    /// prefixes are mutually exclusive by construction.
    pub const ALL: [Category; 4] = [
        Category::Assignments,
        Category::Labs,
        Category::Guides,
        Category::Theory,
    ];

    /// Directory name under the source repository.
    fn remote_dir(self) -> &'static str {
        match self {
            Category::Assignments => "ASSIGNMENTS",
            Category::Labs => "LABS",
            Category::Guides => "GUIDES",
            Category::Theory => "THEORY",
        }
    }

    /// Path segment under the site's base path.
    fn local_segment(self) -> &'static str {
        match self {
            Category::Assignments => "assignments",
            Category::Labs => "labs",
            Category::Guides => "guides",
            Category::Theory => "theory",
        }
    }
}

/// One prefix substitution: a repository browsing URL prefix and the
/// local path prefix that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    pub remote_prefix: String,
    pub local_prefix: String,
}

impl RewriteRule {
    pub fn new<R: Into<String>, L: Into<String>>(remote_prefix: R, local_prefix: L) -> Self {
        Self {
            remote_prefix: remote_prefix.into(),
            local_prefix: local_prefix.into(),
        }
    }
}

#[derive(Debug)]
pub enum RuleError {
    EmptyPrefix,
    OverlappingPrefixes(String, String),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::EmptyPrefix => write!(f, "rewrite rules need a non-empty remote prefix"),
            RuleError::OverlappingPrefixes(a, b) => {
                write!(f, "rewrite prefixes overlap: '{}' shadows '{}'", a, b)
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// What happens to destinations no rule matches.
///
/// The site this crate was built for normalizes every link, matched or
/// not. `Preserve` is the conservative alternative: leave unmatched
/// destinations byte-for-byte alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    #[default]
    Normalize,
    Preserve,
}

/// Rewrites repository browsing URLs into canonical local documentation
/// paths.
///
/// Applied to every hyperlink in a content tree: at most one prefix
/// substitution (declared order, first match wins), then extension
/// stripping, trailing-slash collapsing, lowercasing, and case
/// restoration of the project identifier. Stateless; safe to apply to
/// nodes in any order.
pub struct LinkRewriter {
    rules: Vec<RewriteRule>,
    project_slug: String,
    policy: UnmatchedPolicy,
}

impl LinkRewriter {
    /// Derive the four category rules from the site configuration.
    pub fn for_site(site: &SiteConfig) -> Self {
        let repository = site.repository.trim_end_matches('/');
        let rules = Category::ALL
            .iter()
            .map(|category| {
                RewriteRule::new(
                    format!(
                        "{}/blob/{}/{}",
                        repository,
                        site.branch,
                        category.remote_dir()
                    ),
                    format!("{}/{}", site.base_path, category.local_segment()),
                )
            })
            .collect();

        Self {
            rules,
            project_slug: site.project_slug().to_string(),
            policy: UnmatchedPolicy::default(),
        }
    }

    /// Build a rewriter from an explicit rule list. Rejects rule sets
    /// where one remote prefix shadows another, which would make the
    /// declared order load-bearing.
    pub fn with_rules(rules: Vec<RewriteRule>, project_slug: &str) -> Result<Self, RuleError> {
        for rule in &rules {
            if rule.remote_prefix.is_empty() {
                return Err(RuleError::EmptyPrefix);
            }
        }
        for (i, a) in rules.iter().enumerate() {
            for b in rules.iter().skip(i + 1) {
                if a.remote_prefix.starts_with(&b.remote_prefix)
                    || b.remote_prefix.starts_with(&a.remote_prefix)
                {
                    return Err(RuleError::OverlappingPrefixes(
                        a.remote_prefix.clone(),
                        b.remote_prefix.clone(),
                    ));
                }
            }
        }

        Ok(Self {
            rules,
            project_slug: project_slug.to_string(),
            policy: UnmatchedPolicy::default(),
        })
    }

    pub fn policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Rewrite one destination string.
    pub fn rewrite(&self, dest: &str) -> String {
        let (substituted, matched) = self.substitute_prefix(dest);
        if !matched && self.policy == UnmatchedPolicy::Preserve {
            return dest.to_string();
        }

        let stripped = strip_content_extension(&substituted);
        let collapsed = collapse_trailing_slashes(&stripped);
        let lowered = collapsed.to_lowercase();
        restore_identifier(&lowered, &self.project_slug)
    }

    fn substitute_prefix(&self, dest: &str) -> (String, bool) {
        for rule in &self.rules {
            if let Some(rest) = dest.strip_prefix(&rule.remote_prefix) {
                return (format!("{}{}", rule.local_prefix, rest), true);
            }
        }
        (dest.to_string(), false)
    }
}

impl Transform for LinkRewriter {
    fn name(&self) -> &str {
        "link-rewriter"
    }

    fn apply(&self, tree: &mut Node) {
        walk_mut(tree, &mut |node| {
            let Some(el) = node.as_element_mut() else {
                return;
            };
            if el.tag != "a" {
                return;
            }
            // Absent or non-textual destination: leave the node alone.
            let Some(dest) = el.text_attr("href") else {
                return;
            };
            let rewritten = self.rewrite(dest);
            el.set_attr("href", AttrValue::Text(rewritten));
        });
    }
}

/// Split a destination at the first query or fragment marker.
fn split_at_suffix(dest: &str) -> (&str, &str) {
    let cut = dest.find(['?', '#']).unwrap_or(dest.len());
    dest.split_at(cut)
}

/// Replace a trailing content extension with a single path separator,
/// keeping any query/fragment suffix verbatim.
fn strip_content_extension(dest: &str) -> String {
    let (path, suffix) = split_at_suffix(dest);
    match path.strip_suffix(CONTENT_EXTENSION) {
        Some(stem) => format!("{}/{}", stem, suffix),
        None => dest.to_string(),
    }
}

/// Collapse a run of trailing separators before the suffix (or end of
/// string) into exactly one.
fn collapse_trailing_slashes(dest: &str) -> String {
    let (path, suffix) = split_at_suffix(dest);
    if path.ends_with("//") {
        format!("{}/{}", path.trim_end_matches('/'), suffix)
    } else {
        dest.to_string()
    }
}

/// Undo the case folding for the one token that is not meant to be
/// folded.
fn restore_identifier(dest: &str, identifier: &str) -> String {
    if identifier.is_empty() {
        return dest.to_string();
    }
    dest.replace(&identifier.to_lowercase(), identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Element, walk};

    fn course_site() -> SiteConfig {
        SiteConfig {
            title: "Course".into(),
            url: "https://paquettm.github.io/420-302-VA_A25/".into(),
            base_path: "/420-302-VA_A25".into(),
            repository: "https://github.com/paquettm/420-302-VA_A25".into(),
            ..SiteConfig::default()
        }
    }

    fn rewriter() -> LinkRewriter {
        LinkRewriter::for_site(&course_site())
    }

    #[test]
    fn category_links_map_to_local_paths() {
        let rw = rewriter();
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/LABS/week1.md"),
            "/420-302-VA_A25/labs/week1/"
        );
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/ASSIGNMENTS/a1.md"),
            "/420-302-VA_A25/assignments/a1/"
        );
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/THEORY/intro.md"),
            "/420-302-VA_A25/theory/intro/"
        );
    }

    #[test]
    fn every_category_output_starts_with_the_base_path() {
        let rw = rewriter();
        for rule in rw.rules() {
            let rewritten = rw.rewrite(&format!("{}/page.md", rule.remote_prefix));
            assert!(
                rewritten.starts_with("/420-302-VA_A25/"),
                "unexpected rewrite: {}",
                rewritten
            );
        }
    }

    #[test]
    fn extension_is_stripped_before_a_query_string() {
        let rw = rewriter();
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/GUIDES/setup.md?tab=1"),
            "/420-302-VA_A25/guides/setup/?tab=1"
        );
    }

    #[test]
    fn extension_is_stripped_before_a_fragment() {
        let rw = rewriter();
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/GUIDES/setup.md#install"),
            "/420-302-VA_A25/guides/setup/#install"
        );
    }

    #[test]
    fn identifier_keeps_its_case_while_everything_else_folds() {
        let rw = rewriter();
        let out = rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/LABS/Week1.md");
        assert_eq!(out, "/420-302-VA_A25/labs/week1/");
        assert!(out.contains("420-302-VA_A25"));
        assert!(!out.contains("va_a25"));
    }

    #[test]
    fn trailing_separator_runs_collapse_to_one() {
        let rw = rewriter();
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/LABS//"),
            "/420-302-VA_A25/labs/"
        );
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/LABS//#top"),
            "/420-302-VA_A25/labs/#top"
        );
    }

    #[test]
    fn unmatched_links_are_still_normalized_by_default() {
        let rw = rewriter();
        assert_eq!(
            rw.rewrite("https://Example.com/Blog/Post.md?x=1"),
            "https://example.com/blog/post/?x=1"
        );
    }

    #[test]
    fn preserve_policy_skips_unmatched_links_entirely() {
        let rw = rewriter().policy(UnmatchedPolicy::Preserve);
        assert_eq!(
            rw.rewrite("https://Example.com/Blog/Post.md?x=1"),
            "https://Example.com/Blog/Post.md?x=1"
        );
        // Matched links still go through the whole chain.
        assert_eq!(
            rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/LABS/week1.md"),
            "/420-302-VA_A25/labs/week1/"
        );
    }

    #[test]
    fn rewriting_is_idempotent() {
        let rw = rewriter();
        let once = rw.rewrite("https://github.com/paquettm/420-302-VA_A25/blob/main/GUIDES/setup.md?tab=1");
        assert_eq!(rw.rewrite(&once), once);

        let generic = rw.rewrite("https://Example.com/Blog/Post.md");
        assert_eq!(rw.rewrite(&generic), generic);
    }

    #[test]
    fn overlapping_rule_prefixes_are_rejected() {
        let rules = vec![
            RewriteRule::new("https://example.com/a", "/x"),
            RewriteRule::new("https://example.com/a/b", "/y"),
        ];
        assert!(matches!(
            LinkRewriter::with_rules(rules, "X"),
            Err(RuleError::OverlappingPrefixes(_, _))
        ));
    }

    #[test]
    fn empty_rule_prefix_is_rejected() {
        let rules = vec![RewriteRule::new("", "/x")];
        assert!(matches!(
            LinkRewriter::with_rules(rules, "X"),
            Err(RuleError::EmptyPrefix)
        ));
    }

    #[test]
    fn non_textual_destinations_pass_through_unchanged() {
        let mut link = Element::new("a");
        link.set_attr("href", AttrValue::List(vec!["not".into(), "text".into()]));
        let mut root = Element::new("root");
        root.push_child(Node::Element(link.clone()));
        let mut tree = Node::Element(root);

        rewriter().apply(&mut tree);

        let mut unchanged = false;
        walk(&tree, &mut |node| {
            if let Some(el) = node.as_element() {
                if el.tag == "a" {
                    unchanged = el.attributes == link.attributes;
                }
            }
        });
        assert!(unchanged);
    }

    #[test]
    fn transform_rewrites_links_anywhere_in_the_tree() {
        let mut inner = Element::new("a");
        inner.set_attr(
            "href",
            AttrValue::Text(
                "https://github.com/paquettm/420-302-VA_A25/blob/main/GUIDES/setup.md".into(),
            ),
        );
        let mut item = Element::new("li");
        item.push_child(Node::Element(inner));
        let mut list = Element::new("ul");
        list.push_child(Node::Element(item));
        let mut root = Element::new("root");
        root.push_child(Node::Element(list));
        let mut tree = Node::Element(root);

        rewriter().apply(&mut tree);

        let mut seen = None;
        walk(&tree, &mut |node| {
            if let Some(el) = node.as_element() {
                if el.tag == "a" {
                    seen = el.text_attr("href").map(String::from);
                }
            }
        });
        assert_eq!(seen.as_deref(), Some("/420-302-VA_A25/guides/setup/"));
    }
}
