use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::tree::{AttrValue, Element, Node, text_content};

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

enum FrameKind {
    /// Pops as an element node.
    Element,
    /// Pops by splicing its children into the parent.
    Splice,
    /// Pops into nothing.
    Discard,
}

struct Frame {
    element: Element,
    kind: FrameKind,
}

impl Frame {
    fn element(el: Element) -> Self {
        Self {
            element: el,
            kind: FrameKind::Element,
        }
    }

    fn splice() -> Self {
        Self {
            element: Element::new(""),
            kind: FrameKind::Splice,
        }
    }

    fn discard() -> Self {
        Self {
            element: Element::new(""),
            kind: FrameKind::Discard,
        }
    }
}

/// Parse markdown into a content tree rooted at a `root` element.
///
/// The shape mirrors what the host rendering pipeline hands its
/// transforms: headings, paragraphs, links, images, code, lists, block
/// quotes, tables, with raw HTML passed through untouched.
pub fn to_tree(markdown: &str) -> Node {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut stack = vec![Frame::element(Element::new("root"))];

    for event in parser {
        match event {
            Event::Start(tag) => {
                let frame = open_frame(&tag, &stack);
                stack.push(frame);
            }
            Event::End(tag_end) => {
                if stack.len() < 2 {
                    continue;
                }
                let mut frame = stack.pop().expect("frame stack underflow");
                close_frame(&mut frame, tag_end);
                let parent = stack.last_mut().expect("root frame");
                attach(&mut parent.element, frame);
            }
            Event::Text(text) => current(&mut stack).push_child(Node::text(text.as_ref())),
            Event::Code(code) => {
                let mut el = Element::new("code");
                el.push_child(Node::text(code.as_ref()));
                current(&mut stack).push_child(Node::Element(el));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                current(&mut stack).push_child(Node::Html(html.to_string()));
            }
            Event::SoftBreak => current(&mut stack).push_child(Node::text("\n")),
            Event::HardBreak => current(&mut stack).push_child(Node::element("br")),
            Event::Rule => current(&mut stack).push_child(Node::element("hr")),
            Event::TaskListMarker(checked) => {
                let mut el = Element::new("input");
                el.set_attr("type", AttrValue::Text("checkbox".into()));
                el.set_attr("checked", AttrValue::Flag(checked));
                el.set_attr("disabled", AttrValue::Flag(true));
                current(&mut stack).push_child(Node::Element(el));
            }
            _ => {}
        }
    }

    // Unclosed frames only happen on malformed event streams; fold them
    // down so the tree is still valid.
    while stack.len() > 1 {
        let frame = stack.pop().expect("frame stack underflow");
        let parent = stack.last_mut().expect("root frame");
        attach(&mut parent.element, frame);
    }

    let root = stack.pop().expect("root frame");
    Node::Element(root.element)
}

fn current<'a>(stack: &'a mut [Frame]) -> &'a mut Element {
    &mut stack.last_mut().expect("root frame").element
}

fn open_frame(tag: &Tag, stack: &[Frame]) -> Frame {
    match tag {
        Tag::Paragraph => Frame::element(Element::new("p")),
        Tag::Heading {
            level, id, classes, ..
        } => {
            let mut el = Element::new(&format!("h{}", *level as u32));
            if let Some(id) = id {
                el.set_attr("id", AttrValue::Text(id.to_string()));
            }
            if !classes.is_empty() {
                el.set_attr(
                    "class",
                    AttrValue::List(classes.iter().map(|c| c.to_string()).collect()),
                );
            }
            Frame::element(el)
        }
        Tag::BlockQuote(_) => Frame::element(Element::new("blockquote")),
        Tag::CodeBlock(kind) => {
            let mut el = Element::new("code");
            if let CodeBlockKind::Fenced(lang) = kind {
                if !lang.is_empty() {
                    el.set_attr(
                        "class",
                        AttrValue::List(vec![format!("language-{}", lang)]),
                    );
                }
            }
            Frame::element(el)
        }
        Tag::List(Some(start)) => {
            let mut el = Element::new("ol");
            if *start != 1 {
                el.set_attr("start", AttrValue::Text(start.to_string()));
            }
            Frame::element(el)
        }
        Tag::List(None) => Frame::element(Element::new("ul")),
        Tag::Item => Frame::element(Element::new("li")),
        Tag::Table(_) => Frame::element(Element::new("table")),
        Tag::TableHead => Frame::element(Element::new("thead")),
        Tag::TableRow => Frame::element(Element::new("tr")),
        Tag::TableCell => {
            let in_head = stack.iter().any(|f| f.element.tag == "thead");
            Frame::element(Element::new(if in_head { "th" } else { "td" }))
        }
        Tag::Emphasis => Frame::element(Element::new("em")),
        Tag::Strong => Frame::element(Element::new("strong")),
        Tag::Strikethrough => Frame::element(Element::new("del")),
        Tag::Link { dest_url, title, .. } => {
            let mut el = Element::new("a");
            el.set_attr("href", AttrValue::Text(dest_url.to_string()));
            if !title.is_empty() {
                el.set_attr("title", AttrValue::Text(title.to_string()));
            }
            Frame::element(el)
        }
        Tag::Image { dest_url, title, .. } => {
            let mut el = Element::new("img");
            el.set_attr("src", AttrValue::Text(dest_url.to_string()));
            if !title.is_empty() {
                el.set_attr("title", AttrValue::Text(title.to_string()));
            }
            Frame::element(el)
        }
        Tag::HtmlBlock => Frame::splice(),
        Tag::MetadataBlock(_) => Frame::discard(),
        Tag::FootnoteDefinition(_) => Frame::discard(),
        _ => Frame::splice(),
    }
}

fn close_frame(frame: &mut Frame, tag_end: TagEnd) {
    match tag_end {
        // Fenced and indented code render as pre > code.
        TagEnd::CodeBlock => {
            if matches!(frame.kind, FrameKind::Element) {
                let code = std::mem::replace(&mut frame.element, Element::new("pre"));
                frame.element.push_child(Node::Element(code));
            }
        }
        // Image alt text comes from the collected inner content; the
        // element itself stays a leaf.
        TagEnd::Image => {
            let alt = frame
                .element
                .children
                .iter()
                .map(text_content)
                .collect::<String>();
            frame.element.set_attr("alt", AttrValue::Text(alt));
            frame.element.children.clear();
        }
        // The parser emits header cells directly under the table head;
        // give them a row like every other cell.
        TagEnd::TableHead => {
            let mut row = Element::new("tr");
            row.children = std::mem::take(&mut frame.element.children);
            frame.element.push_child(Node::Element(row));
        }
        _ => {}
    }
}

fn attach(parent: &mut Element, frame: Frame) {
    match frame.kind {
        FrameKind::Element => parent.children.push(Node::Element(frame.element)),
        FrameKind::Splice => parent.children.extend(frame.element.children),
        FrameKind::Discard => {}
    }
}

/// Text of the document's first heading, if any.
pub fn page_title(markdown: &str) -> Option<String> {
    let parser = Parser::new_ext(markdown, parser_options());
    let mut in_heading = false;
    let mut text = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::End(TagEnd::Heading(_)) => {
                if in_heading {
                    return Some(text.trim().to_string());
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if in_heading {
                    text.push_str(&t);
                }
            }
            _ => {}
        }
    }
    None
}
