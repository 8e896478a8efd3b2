//! A small CSS-ish selector engine over an html5ever DOM.
//!
//! Supports compound selectors made of a tag, `#id`, `.class`, `[attr]` and
//! `[attr=value]` parts, combined with descendant (whitespace) and child
//! (` > `) combinators. Nothing else.

use std::{convert::TryFrom, sync::Arc};

use html5ever::{driver::ParseOpts, parse_document, tendril::TendrilSink, tree_builder::TreeBuilderOpts};
use markup5ever::{Attribute, QualName};
use markup5ever_arcdom::{ArcDom, Handle, NodeData};

pub struct Document {
    doc: ArcDom,
}

fn default_parse_opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

impl TryFrom<&str> for Document {
    type Error = std::io::Error;

    fn try_from(input: &str) -> Result<Self, Self::Error> {
        let doc = parse_document(ArcDom::default(), default_parse_opts())
            .from_utf8()
            .read_from(&mut input.as_bytes())?;

        Ok(Self { doc })
    }
}

impl Document {
    pub fn select(&self, selector: impl Into<Selector>) -> Vec<Element> {
        let sel: Selector = selector.into();
        sel.find(vec![Arc::clone(&self.doc.document)])
    }
}

#[derive(Debug, PartialEq, Clone)]
enum AttributeSpec {
    Present,
    Exact(String),
}

impl AttributeSpec {
    fn matches(&self, value: &str) -> bool {
        match self {
            AttributeSpec::Present => true,
            AttributeSpec::Exact(expected) => value == expected,
        }
    }
}

#[derive(Debug, Default, PartialEq, Clone)]
struct Matcher {
    tag: Option<String>,
    classes: Vec<String>,
    ids: Vec<String>,
    attributes: Vec<(String, AttributeSpec)>,
    direct: bool,
}

impl From<&str> for Matcher {
    fn from(input: &str) -> Self {
        let mut segments = vec![];
        let mut buf = String::new();
        let mut in_brackets = false;

        for c in input.chars() {
            match c {
                '[' if !in_brackets => {
                    segments.push(std::mem::take(&mut buf));
                    in_brackets = true;
                }
                ']' if in_brackets => {
                    segments.push(std::mem::take(&mut buf));
                    in_brackets = false;
                    continue;
                }
                '#' | '.' if !in_brackets => {
                    segments.push(std::mem::take(&mut buf));
                }
                _ => {}
            }

            buf.push(c);
        }
        segments.push(buf);

        let mut res = Self::default();

        for segment in segments {
            match segment.chars().next() {
                Some('#') => res.ids.push(segment[1..].to_string()),
                Some('.') => res.classes.push(segment[1..].to_string()),
                Some('[') => res.add_attribute(&segment[1..]),
                None => {}
                _ => res.tag = Some(segment.to_ascii_lowercase()),
            }
        }

        res
    }
}

impl Matcher {
    fn add_attribute(&mut self, spec: &str) {
        let (key, spec) = match spec.split_once('=') {
            Some((key, value)) => (
                key,
                AttributeSpec::Exact(value.trim_matches(|c| c == '"' || c == '\'').to_string()),
            ),
            None => (spec, AttributeSpec::Present),
        };

        self.attributes.push((key.trim().to_string(), spec));
    }

    fn matches_node(&self, handle: &Handle) -> bool {
        match handle.data {
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => self.matches(name, &attrs.borrow()),
            _ => false,
        }
    }

    fn matches(&self, name: &QualName, attrs: &[Attribute]) -> bool {
        let tag_match = self
            .tag
            .as_deref()
            .map_or(true, |tag| &*name.local == tag);

        let id_match = self.ids.is_empty()
            || get_attr(attrs, "id").map_or(false, |el_id| {
                let el_ids: Vec<_> = el_id.split_whitespace().collect();
                self.ids.iter().all(|id| el_ids.contains(&id.as_str()))
            });

        let class_match = self.classes.is_empty()
            || get_attr(attrs, "class").map_or(false, |el_class| {
                let el_classes: Vec<_> = el_class.split_whitespace().collect();
                self.classes
                    .iter()
                    .all(|class| el_classes.contains(&class.as_str()))
            });

        let attr_match = self.attributes.iter().all(|(key, spec)| {
            get_attr(attrs, key).map_or(false, |value| spec.matches(value))
        });

        tag_match && id_match && class_match && attr_match
    }
}

#[derive(Debug, PartialEq)]
pub struct Selector {
    matchers: Vec<Matcher>,
}

impl From<&str> for Selector {
    fn from(input: &str) -> Self {
        let mut matchers = vec![];
        let mut direct = false;

        for token in input.split_whitespace() {
            if token == ">" {
                direct = true;
                continue;
            }

            let mut matcher = Matcher::from(token);
            matcher.direct = direct;
            direct = false;

            matchers.push(matcher);
        }

        Selector { matchers }
    }
}

fn get_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| &*attr.value)
}

fn push_unique(acc: &mut Vec<Handle>, handle: &Handle) {
    if !acc.iter().any(|existing| Arc::ptr_eq(existing, handle)) {
        acc.push(Arc::clone(handle));
    }
}

impl Selector {
    fn collect_descendants(matcher: &Matcher, node: &Handle, acc: &mut Vec<Handle>) {
        for child in node.children.borrow().iter() {
            if matcher.matches_node(child) {
                push_unique(acc, child);
            }

            Self::collect_descendants(matcher, child, acc);
        }
    }

    fn find(&self, roots: Vec<Handle>) -> Vec<Element> {
        let mut current = roots;

        for matcher in &self.matchers {
            let mut next = vec![];

            for node in &current {
                if matcher.direct {
                    for child in node.children.borrow().iter() {
                        if matcher.matches_node(child) {
                            push_unique(&mut next, child);
                        }
                    }
                } else {
                    Self::collect_descendants(matcher, node, &mut next);
                }
            }

            current = next;
        }

        current.iter().map(Element::from).collect()
    }
}

#[derive(Debug)]
pub struct Element {
    handle: Handle,
}

impl From<&Handle> for Element {
    fn from(e: &Handle) -> Self {
        Element {
            handle: Arc::clone(e),
        }
    }
}

impl Element {
    /// Concatenated text of every descendant text node.
    pub fn text(&self) -> String {
        fn walk(handle: &Handle, out: &mut String) {
            for child in handle.children.borrow().iter() {
                match child.data {
                    NodeData::Text { ref contents } => out.push_str(&contents.borrow()),
                    NodeData::Element { .. } => walk(child, out),
                    _ => {}
                }
            }
        }

        let mut res = String::new();
        walk(&self.handle, &mut res);
        res
    }

    pub fn select(&self, selector: impl Into<Selector>) -> Vec<Element> {
        let sel: Selector = selector.into();
        sel.find(vec![Arc::clone(&self.handle)])
    }
}
