//! Open-ended per-point measurements addressed by dotted paths
//!
//! `front.fl.pressure` names the leaf `pressure` inside branch `fl` inside
//! branch `front`. Paths are parsed up front into [`SetupPath`] rather than
//! resolved by dynamic property access, so an empty segment is rejected once
//! instead of silently producing a key named `""`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// A parsed dotted path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetupPath {
    segments: Vec<String>,
}

impl SetupPath {
    /// Path segments, outermost first (never empty)
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment (the leaf name)
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl FromStr for SetupPath {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if s.is_empty() || segments.iter().any(|seg| seg.is_empty()) {
            return Err(SetupError::InvalidPath(s.to_string()));
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for SetupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A node in the extras tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtrasNode {
    Value(f64),
    Branch(BTreeMap<String, ExtrasNode>),
}

impl ExtrasNode {
    /// Leaf value, if this node is a leaf
    pub fn as_value(&self) -> Option<f64> {
        match self {
            ExtrasNode::Value(v) => Some(*v),
            ExtrasNode::Branch(_) => None,
        }
    }
}

/// Nested map of measurements, serialized as plain nested JSON objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(BTreeMap<String, ExtrasNode>);

impl Extras {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from `(dotted path, value)` pairs
    pub fn from_leaves<'a, I>(leaves: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut extras = Self::new();
        for (path, value) in leaves {
            ensure_finite(path, value)?;
            extras.set(&path.parse()?, value);
        }
        Ok(extras)
    }

    /// Top-level entries
    pub fn entries(&self) -> &BTreeMap<String, ExtrasNode> {
        &self.0
    }

    /// Check if the tree holds nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a parsed path, descending one segment at a time
    pub fn get(&self, path: &SetupPath) -> Option<&ExtrasNode> {
        let (head, rest) = path.segments().split_first()?;
        let mut node = self.0.get(head)?;
        for segment in rest {
            node = match node {
                ExtrasNode::Branch(children) => children.get(segment)?,
                ExtrasNode::Value(_) => return None,
            };
        }
        Some(node)
    }

    /// Resolve a dotted path; missing or malformed paths yield `None`
    pub fn get_path(&self, path: &str) -> Option<&ExtrasNode> {
        let path: SetupPath = path.parse().ok()?;
        self.get(&path)
    }

    /// Resolve a dotted path to a leaf value
    pub fn get_value(&self, path: &str) -> Option<f64> {
        self.get_path(path).and_then(ExtrasNode::as_value)
    }

    /// Set a leaf, creating intermediate branches as needed
    ///
    /// A leaf standing where a branch is needed is replaced by a branch. The
    /// value is not checked here; [`SetupStore`](crate::setup::SetupStore)
    /// refuses to persist non-finite leaves.
    pub fn set(&mut self, path: &SetupPath, value: f64) {
        insert_at(&mut self.0, path.segments(), value);
    }

    /// Copy of this tree with one leaf set
    pub fn with_path(&self, path: &str, value: f64) -> Result<Self, SetupError> {
        let path: SetupPath = path.parse()?;
        ensure_finite(&path.to_string(), value)?;
        let mut next = self.clone();
        next.set(&path, value);
        Ok(next)
    }

    /// Remove the node at a path, pruning branches left empty
    pub fn remove(&mut self, path: &SetupPath) -> Option<ExtrasNode> {
        remove_at(&mut self.0, path.segments())
    }

    /// Flatten to `(dotted path, value)` pairs in key order
    pub fn leaves(&self) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        collect_leaves(&self.0, "", &mut out);
        out
    }

    /// Deep-merge another tree into this one; `other` wins on conflicts
    pub fn merge(&mut self, other: &Extras) {
        merge_into(&mut self.0, &other.0);
    }
}

/// JSON has no encoding for NaN or infinity
pub(crate) fn ensure_finite(path: &str, value: f64) -> Result<(), SetupError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SetupError::NonFinite {
            path: path.to_string(),
            value,
        })
    }
}

fn insert_at(map: &mut BTreeMap<String, ExtrasNode>, segments: &[String], value: f64) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert(head.clone(), ExtrasNode::Value(value));
        return;
    }

    let node = map
        .entry(head.clone())
        .or_insert_with(|| ExtrasNode::Branch(BTreeMap::new()));
    if let ExtrasNode::Value(_) = node {
        *node = ExtrasNode::Branch(BTreeMap::new());
    }
    if let ExtrasNode::Branch(children) = node {
        insert_at(children, rest, value);
    }
}

fn remove_at(map: &mut BTreeMap<String, ExtrasNode>, segments: &[String]) -> Option<ExtrasNode> {
    let (head, rest) = segments.split_first()?;
    if rest.is_empty() {
        return map.remove(head);
    }

    let children = match map.get_mut(head)? {
        ExtrasNode::Branch(children) => children,
        ExtrasNode::Value(_) => return None,
    };
    let removed = remove_at(children, rest)?;
    if children.is_empty() {
        map.remove(head);
    }
    Some(removed)
}

fn collect_leaves(map: &BTreeMap<String, ExtrasNode>, prefix: &str, out: &mut Vec<(String, f64)>) {
    for (key, node) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match node {
            ExtrasNode::Value(v) => out.push((path, *v)),
            ExtrasNode::Branch(children) => collect_leaves(children, &path, out),
        }
    }
}

fn merge_into(dst: &mut BTreeMap<String, ExtrasNode>, src: &BTreeMap<String, ExtrasNode>) {
    for (key, node) in src {
        if let (Some(ExtrasNode::Branch(existing)), ExtrasNode::Branch(incoming)) =
            (dst.get_mut(key), node)
        {
            merge_into(existing, incoming);
            continue;
        }
        dst.insert(key.clone(), node.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_path() {
        let path: SetupPath = "front.fl.pressure".parse().unwrap();
        assert_eq!(path.segments(), &["front", "fl", "pressure"]);
        assert_eq!(path.leaf(), "pressure");
        assert_eq!(path.to_string(), "front.fl.pressure");

        assert!("".parse::<SetupPath>().is_err());
        assert!("front..pressure".parse::<SetupPath>().is_err());
        assert!(".front".parse::<SetupPath>().is_err());
    }

    #[test]
    fn test_set_creates_branches() {
        let extras = Extras::new().with_path("front.fl.pressure", 1.9).unwrap();
        assert_eq!(
            serde_json::to_value(&extras).unwrap(),
            json!({"front": {"fl": {"pressure": 1.9}}})
        );
    }

    #[test]
    fn test_with_path_leaves_original_untouched() {
        let original = Extras::new();
        let updated = original.with_path("aero.rear_wing", 14.0).unwrap();
        assert!(original.is_empty());
        assert_eq!(updated.get_value("aero.rear_wing"), Some(14.0));
    }

    #[test]
    fn test_with_path_rejects_non_finite() {
        let result = Extras::new().with_path("aero.rear_wing", f64::NEG_INFINITY);
        assert!(matches!(result, Err(SetupError::NonFinite { .. })));
        assert!(Extras::from_leaves([("aero.gurney", f64::NAN)]).is_err());
    }

    #[test]
    fn test_missing_intermediate_is_none() {
        let extras = Extras::from_leaves([("front.fl.pressure", 1.9)]).unwrap();
        assert_eq!(extras.get_value("rear.rl.pressure"), None);
        assert_eq!(extras.get_value("front.fl.pressure.deeper"), None);
        assert_eq!(extras.get_value("front..pressure"), None);
        assert!(matches!(extras.get_path("front.fl"), Some(ExtrasNode::Branch(_))));
    }

    #[test]
    fn test_leaf_replaced_by_branch() {
        let mut extras = Extras::from_leaves([("diff", 40.0)]).unwrap();
        extras.set(&"diff.preload".parse().unwrap(), 60.0);
        assert_eq!(extras.get_value("diff.preload"), Some(60.0));
        assert_eq!(extras.get_value("diff"), None);
    }

    #[test]
    fn test_remove_prunes_empty_branches() {
        let mut extras =
            Extras::from_leaves([("front.fl.pressure", 1.9), ("rear.rl.pressure", 1.7)]).unwrap();
        let removed = extras.remove(&"front.fl.pressure".parse().unwrap());
        assert_eq!(removed, Some(ExtrasNode::Value(1.9)));
        assert!(extras.get_path("front").is_none());
        assert_eq!(extras.leaves(), vec![("rear.rl.pressure".to_string(), 1.7)]);
    }

    #[test]
    fn test_merge_is_deep() {
        let mut base =
            Extras::from_leaves([("front.fl.pressure", 1.9), ("front.fl.camber", -3.0)]).unwrap();
        let patch = Extras::from_leaves([("front.fl.pressure", 2.0), ("aero.front_wing", 5.0)])
            .unwrap();
        base.merge(&patch);

        assert_eq!(
            base.leaves(),
            vec![
                ("aero.front_wing".to_string(), 5.0),
                ("front.fl.camber".to_string(), -3.0),
                ("front.fl.pressure".to_string(), 2.0),
            ]
        );
    }

    #[test]
    fn test_deserialize_integers() {
        let extras: Extras = serde_json::from_value(json!({"brakes": {"bias": 56}})).unwrap();
        assert_eq!(extras.get_value("brakes.bias"), Some(56.0));
    }
}
