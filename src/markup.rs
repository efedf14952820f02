//! Tag lookup helpers over `scraper` documents.
//!
//! CSS selectors cover most lookups, but the scrapers need a few things they
//! cannot express: a regex on an attribute value, walking up to an enclosing
//! element, and "next sibling of one of these kinds". These helpers use a
//! small [`Attr`] filter instead, and [`find_required`] reports exactly what
//! it was looking for when the markup changes.

use crate::error::ScrapeError;
use itertools::Itertools;
use regex::Regex;
use scraper::ElementRef;

/// Attribute constraint for a tag lookup.
#[derive(Debug, Clone, Copy)]
pub enum Attr<'a> {
    Id(&'a str),
    /// Matches when the element carries this class among others.
    Class(&'a str),
    Eq(&'a str, &'a str),
    /// Attribute value matches the regex (search, not full match).
    Matches(&'a str, &'a Regex),
}

impl Attr<'_> {
    fn matches(&self, el: &ElementRef<'_>) -> bool {
        let value = el.value();
        match *self {
            Attr::Id(id) => value.id() == Some(id),
            Attr::Class(class) => value.classes().any(|c| c == class),
            Attr::Eq(name, expected) => value.attr(name) == Some(expected),
            Attr::Matches(name, re) => value.attr(name).is_some_and(|v| re.is_match(v)),
        }
    }

    fn describe(&self) -> String {
        match *self {
            Attr::Id(id) => format!("id={id}"),
            Attr::Class(class) => format!("class={class}"),
            Attr::Eq(name, value) => format!("{name}={value}"),
            Attr::Matches(name, re) => format!("{name}~/{}/", re.as_str()),
        }
    }
}

fn is_match(el: &ElementRef<'_>, tag: &str, attrs: &[Attr<'_>]) -> bool {
    el.value().name() == tag && attrs.iter().all(|a| a.matches(el))
}

/// All descendants of `scope` (excluding `scope` itself) in document order.
fn descendants<'a>(scope: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    scope.descendants().skip(1).filter_map(ElementRef::wrap)
}

pub fn find_first<'a>(scope: ElementRef<'a>, tag: &str, attrs: &[Attr<'_>]) -> Option<ElementRef<'a>> {
    descendants(scope).find(|el| is_match(el, tag, attrs))
}

/// First matching descendant, or a [`ScrapeError::MissingElement`] naming the
/// tag and attributes searched.
pub fn find_required<'a>(
    scope: ElementRef<'a>,
    tag: &str,
    attrs: &[Attr<'_>],
) -> Result<ElementRef<'a>, ScrapeError> {
    find_first(scope, tag, attrs).ok_or_else(|| ScrapeError::MissingElement {
        tag: tag.to_string(),
        attrs: if attrs.is_empty() {
            "none".to_string()
        } else {
            attrs.iter().map(Attr::describe).join(", ")
        },
    })
}

pub fn find_all<'a>(scope: ElementRef<'a>, tag: &str, attrs: &[Attr<'_>]) -> Vec<ElementRef<'a>> {
    descendants(scope).filter(|el| is_match(el, tag, attrs)).collect()
}

/// Like [`find_all`] but for any of several tag names, in document order.
pub fn find_all_of<'a>(scope: ElementRef<'a>, tags: &[&str]) -> Vec<ElementRef<'a>> {
    descendants(scope)
        .filter(|el| tags.contains(&el.value().name()))
        .collect()
}

pub fn nearest_enclosing<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|parent| parent.value().name() == tag)
}

/// The first following sibling whose tag is one of `kinds`, skipping others.
pub fn next_sibling_of_kind<'a>(el: ElementRef<'a>, kinds: &[&str]) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sib| kinds.contains(&sib.value().name()))
}

/// Concatenated text of the element and all its descendants.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}
