// crates/podcast-feed/src/category.rs
//! iTunes category taxonomy
//!
//! Categories arrive as a mapping of name to sub-categories, for example
//! (TOML):
//!
//! ```toml
//! [defaults.categories]
//! Comedy = {}
//! Technology = ["Podcasting", "Gadgets"]
//! Arts = { Design = {}, "Food & Drink" = ["Recipes"] }
//! ```
//!
//! A sub-category value may be empty, a marker (`true`, a number), a nested
//! mapping, a list of names or a single name. Input order is preserved.

use crate::value::escape;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// Deepest category nesting rendered into a feed
pub const MAX_CATEGORY_DEPTH: usize = 3;

/// A named category with optional sub-categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    /// Category name as rendered in the `text` attribute
    pub name: String,
    /// Sub-categories, empty for a leaf
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    /// Creates a category with sub-categories
    pub fn new(name: impl Into<String>, children: Vec<CategoryNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// Creates a category without sub-categories
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Returns true if the category has no sub-categories
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of levels in this subtree, counting itself
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::depth).max().unwrap_or(0)
    }

    fn escaped(&self) -> Self {
        Self {
            name: escape(&self.name),
            children: self.children.iter().map(CategoryNode::escaped).collect(),
        }
    }

    fn truncated(&self, levels: usize, dropped: &mut usize) -> Self {
        let children = if levels > 1 {
            self.children
                .iter()
                .map(|c| c.truncated(levels - 1, dropped))
                .collect()
        } else {
            *dropped += self.children.len();
            Vec::new()
        };
        Self::new(self.name.clone(), children)
    }
}

/// Ordered list of top-level categories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree(Vec<CategoryNode>);

impl CategoryTree {
    /// Creates an empty taxonomy
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a flat taxonomy of leaf categories
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(names.into_iter().map(CategoryNode::leaf).collect())
    }

    /// Adds a top-level category, builder style
    pub fn with(mut self, node: CategoryNode) -> Self {
        self.push(node);
        self
    }

    /// Appends a top-level category
    pub fn push(&mut self, node: CategoryNode) {
        self.0.push(node);
    }

    /// Top-level categories in input order
    pub fn nodes(&self) -> &[CategoryNode] {
        &self.0
    }

    /// Returns true if there are no categories
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level categories
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Deepest nesting level, 0 when empty
    pub fn depth(&self) -> usize {
        self.0.iter().map(CategoryNode::depth).max().unwrap_or(0)
    }

    /// Returns a copy with every name XML-escaped at every level
    pub fn escaped(&self) -> Self {
        Self(self.0.iter().map(CategoryNode::escaped).collect())
    }

    /// Returns a copy cut down to at most `max_depth` levels
    ///
    /// Dropped sub-categories are reported with a warning.
    pub fn limited_to(&self, max_depth: usize) -> Self {
        if max_depth == 0 {
            return Self::new();
        }
        let mut dropped = 0;
        let nodes = self
            .0
            .iter()
            .map(|n| n.truncated(max_depth, &mut dropped))
            .collect();
        if dropped > 0 {
            log::warn!(
                "Dropped {} categories nested deeper than {} levels",
                dropped,
                max_depth
            );
        }
        Self(nodes)
    }
}

impl From<Vec<CategoryNode>> for CategoryTree {
    fn from(nodes: Vec<CategoryNode>) -> Self {
        Self(nodes)
    }
}

impl<'de> Deserialize<'de> for CategoryTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TreeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = CategoryTree;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a category mapping or a list of category names")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut nodes = Vec::new();
        while let Some((name, Children(children))) = map.next_entry::<String, Children>()? {
            nodes.push(CategoryNode::new(name, children));
        }
        Ok(CategoryTree(nodes))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut nodes = Vec::new();
        while let Some(Children(entry)) = seq.next_element::<Children>()? {
            nodes.extend(entry);
        }
        Ok(CategoryTree(nodes))
    }
}

/// The value side of a category entry
struct Children(Vec<CategoryNode>);

impl<'de> Deserialize<'de> for Children {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ChildrenVisitor)
    }
}

struct ChildrenVisitor;

impl<'de> Visitor<'de> for ChildrenVisitor {
    type Value = Children;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("sub-categories as a mapping, a list, a name or nothing")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Children(Vec::new()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Children(Vec::new()))
    }

    // `Comedy = true` style markers carry no sub-categories
    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Self::Value, E> {
        Ok(Children(Vec::new()))
    }

    // Numeric values are markers too
    fn visit_i64<E: de::Error>(self, _v: i64) -> Result<Self::Value, E> {
        Ok(Children(Vec::new()))
    }

    fn visit_u64<E: de::Error>(self, _v: u64) -> Result<Self::Value, E> {
        Ok(Children(Vec::new()))
    }

    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Self::Value, E> {
        Ok(Children(Vec::new()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v.is_empty() {
            return Ok(Children(Vec::new()));
        }
        Ok(Children(vec![CategoryNode::leaf(v)]))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        TreeVisitor.visit_map(map).map(|tree| Children(tree.0))
    }

    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        TreeVisitor.visit_seq(seq).map(|tree| Children(tree.0))
    }
}
