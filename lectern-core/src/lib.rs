pub mod config;
pub mod external;
pub mod headings;
pub mod links;
pub mod markdown;
pub mod sidebar;
pub mod transform;
pub mod tree;

// Re-export main types
pub use config::{Config, SidebarSection, SiteConfig, SocialLink, TocConfig};
pub use external::ExternalLinks;
pub use headings::{HeadingIds, outline, slugify};
pub use links::{LinkRewriter, RewriteRule, UnmatchedPolicy};
pub use markdown::{page_title, to_tree};
pub use sidebar::{NavItem, NavSection, SidebarScanner};
pub use transform::{Pipeline, Transform};
pub use tree::{AttrValue, Element, Node};
