//! Generic YAML tree for chart documents.
//!
//! Unlike `serde_yaml::Value`, integers of any width serde_yaml can report are kept
//! (`i128`/`u128` included), mappings keep duplicate keys in document order, and
//! explicit tags are recorded instead of interpreted.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};

const MERGE_KEY: &str = "<<";

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Null,
    Bool(bool),
    /// Integer, kept as its decimal digits
    Int(String),
    Float(f64),
    String(String),
    Sequence(Vec<Node>),
    /// Entries in document order; later duplicates win on lookup
    Mapping(Vec<(Node, Node)>),
    /// An explicitly tagged node, e.g. `!custom value`
    Tagged(String),
}

/// A `<<` entry whose value is not a mapping or a sequence of mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InvalidMerge;

impl Node {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Int(_) | Node::Float(_) => "number",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
            Node::Tagged(_) => "tagged value",
        }
    }

    /// Last value stored under the string key `key`, if this is a mapping.
    pub(crate) fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries
                .iter()
                .rev()
                .find(|(k, _)| matches!(k, Node::String(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// First explicit tag anywhere in the tree, keys included.
    pub(crate) fn find_tag(&self) -> Option<&str> {
        match self {
            Node::Tagged(tag) => Some(tag),
            Node::Sequence(items) => items.iter().find_map(Node::find_tag),
            Node::Mapping(entries) => entries
                .iter()
                .find_map(|(k, v)| k.find_tag().or_else(|| v.find_tag())),
            _ => None,
        }
    }

    /// Resolve `<<` merge keys throughout the tree.
    ///
    /// Keys already present in a mapping win over merged ones; within a sequence of
    /// merged mappings, earlier mappings win.
    pub(crate) fn apply_merge(&mut self) -> Result<(), InvalidMerge> {
        match self {
            Node::Sequence(items) => {
                for item in items {
                    item.apply_merge()?;
                }
            }
            Node::Mapping(entries) => {
                for (k, v) in entries.iter_mut() {
                    k.apply_merge()?;
                    v.apply_merge()?;
                }

                let (merges, mut own): (Vec<_>, Vec<_>) = std::mem::take(entries)
                    .into_iter()
                    .partition(|(k, _)| matches!(k, Node::String(s) if s == MERGE_KEY));

                for (_, source) in merges {
                    let sources = match source {
                        Node::Mapping(m) => vec![m],
                        Node::Sequence(items) => items
                            .into_iter()
                            .map(|item| match item {
                                Node::Mapping(m) => Ok(m),
                                _ => Err(InvalidMerge),
                            })
                            .collect::<Result<Vec<_>, _>>()?,
                        _ => return Err(InvalidMerge),
                    };
                    for (k, v) in sources.into_iter().flatten() {
                        if !own.iter().any(|(existing, _)| *existing == k) {
                            own.push((k, v));
                        }
                    }
                }

                *entries = own;
            }
            _ => {}
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Node, E> {
        Ok(Node::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Node, E> {
        Ok(Node::Int(n.to_string()))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Node, E> {
        Ok(Node::Int(n.to_string()))
    }

    fn visit_i128<E: de::Error>(self, n: i128) -> Result<Node, E> {
        Ok(Node::Int(n.to_string()))
    }

    fn visit_u128<E: de::Error>(self, n: u128) -> Result<Node, E> {
        Ok(Node::Int(n.to_string()))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Node, E> {
        Ok(Node::Float(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Node, E> {
        Ok(Node::String(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Node, E> {
        Ok(Node::String(s))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry()? {
            entries.push(entry);
        }
        Ok(Node::Mapping(entries))
    }

    // serde_yaml reports `!tag value` as an enum whose variant is the tag name
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Node, A::Error> {
        let (tag, contents): (String, _) = data.variant()?;
        contents.newtype_variant::<Node>()?;
        Ok(Node::Tagged(format!("!{tag}")))
    }
}
