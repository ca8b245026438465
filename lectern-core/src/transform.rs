use crate::config::SiteConfig;
use crate::external::ExternalLinks;
use crate::headings::HeadingIds;
use crate::links::LinkRewriter;
use crate::tree::Node;

/// One step in the host pipeline's ordered list of tree visitors.
///
/// A transform mutates the tree in place and returns nothing; it never
/// fails and always leaves the tree valid. It holds no state between
/// invocations.
pub trait Transform {
    fn name(&self) -> &str;
    fn apply(&self, tree: &mut Node);
}

/// An ordered list of transforms, applied in declaration order.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// The step list the course site registers: link rewriting first,
    /// then heading ids, then external-link decoration. Rewriting runs
    /// first so repository links are local paths by the time the
    /// external-link pass looks at them.
    pub fn for_site(site: &SiteConfig) -> Self {
        Self::new()
            .step(LinkRewriter::for_site(site))
            .step(HeadingIds::new())
            .step(ExternalLinks::new())
    }

    pub fn step<T: Transform + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, tree: &mut Node) {
        for step in &self.steps {
            step.apply(tree);
        }
    }
}
