//! Runtime values
//!
//! Every symbol, literal and intermediate result is a [`Value`]. Values carry
//! a total order (numbers via `f64::total_cmp`, then variant rank) so they can
//! live inside sets and so set results materialize deterministically.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

/// Default relation label for `from->to` edges
pub const DEFAULT_RELATION: &str = "to";

/// A dynamically typed value
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
    Boolean(bool),
    List(Vec<Value>),
    Set(BTreeSet<Value>),
    Graph(Graph),
    Object(BTreeMap<String, Value>),
    /// Marker produced by `error(msg)`; surfaced by constraints
    Error(String),
}

/// A directed graph with labelled edges
///
/// Each source maps a relation label to one destination; a second edge with
/// the same source and relation replaces the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Graph {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeMap<String, BTreeMap<String, String>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: impl Into<String>) {
        self.nodes.insert(node.into());
    }

    /// Add an edge; both endpoints join the node set.
    pub fn add_edge(
        &mut self,
        from: impl Into<String>,
        relation: impl Into<String>,
        to: impl Into<String>,
    ) {
        let from = from.into();
        let to = to.into();
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.edges
            .entry(from)
            .or_default()
            .insert(relation.into(), to);
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Destinations reachable in one step from `node`, in relation order
    pub fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .get(node)
            .into_iter()
            .flat_map(|relations| relations.values().map(String::as_str))
    }

    /// Unweighted breadth-first search for a shortest path.
    ///
    /// Returns the node sequence from `from` to `to` inclusive, or `None`
    /// when `to` is unreachable.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        if from == to {
            return Some(vec![from.to_string()]);
        }

        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        previous.insert(from, from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if previous.contains_key(next) {
                    continue;
                }
                previous.insert(next, current);
                if next == to {
                    let mut path = vec![to.to_string()];
                    let mut step = to;
                    while step != from {
                        step = previous[step];
                        path.push(step.to_string());
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }

        None
    }
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    /// Name of the runtime shape, matching the declared symbol type names
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Text(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Graph(_) => "graph",
            Value::Object(_) => "object",
            Value::Error(_) => "error",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::List(_)
            | Value::Set(_)
            | Value::Graph(_)
            | Value::Object(_)
            | Value::Error(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    /// Elements of a set or list, in iteration order
    pub fn elements(&self) -> Option<Vec<&Value>> {
        match self {
            Value::Set(set) => Some(set.iter().collect()),
            Value::List(list) => Some(list.iter().collect()),
            _ => None,
        }
    }

    /// Replace set values by their sorted list form; other values are unchanged.
    pub fn materialized(self) -> Value {
        match self {
            Value::Set(set) => Value::List(set.into_iter().collect()),
            other => other,
        }
    }

    /// Equality as used by `==`, `!=` and `in`: numbers compare numerically
    /// (so `NaN` equals nothing), composites compare structurally.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => self == other,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Number(_) => 2,
            Value::Text(_) => 3,
            Value::List(_) => 4,
            Value::Set(_) => 5,
            Value::Object(_) => 6,
            Value::Graph(_) => 7,
            Value::Error(_) => 8,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => a.cmp(b),
            (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Object(a), Value::Object(b)) => a.cmp(b),
            (Value::Graph(a), Value::Graph(b)) => a.cmp(b),
            (Value::Error(a), Value::Error(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// Render a number the way documents write it: integral values without a
/// fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a Value>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match item {
            Value::Text(s) => write!(f, "\"{}\"", s)?,
            other => write!(f, "{}", other)?,
        }
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Value::Set(items) => {
                write!(f, "{{")?;
                write_joined(f, items)?;
                write!(f, "}}")
            }
            Value::Graph(graph) => write!(
                f,
                "graph({} nodes, {} edges)",
                graph.nodes.len(),
                graph.edge_count()
            ),
            Value::Object(properties) => {
                write!(f, "{{")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Error(message) => write!(f, "error(\"{}\")", message),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Number(n) => {
                if !n.is_finite() {
                    serializer.serialize_unit()
                } else if n.fract() == 0.0 && n.abs() < 9.0e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::Text(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Set(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Graph(graph) => {
                let edges: Vec<BTreeMap<&str, &str>> = graph
                    .edges
                    .iter()
                    .flat_map(|(from, relations)| {
                        relations.iter().map(move |(relation, to)| {
                            BTreeMap::from([
                                ("from", from.as_str()),
                                ("relation", relation.as_str()),
                                ("to", to.as_str()),
                            ])
                        })
                    })
                    .collect();
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("nodes", &graph.nodes)?;
                map.serialize_entry("edges", &edges)?;
                map.end()
            }
            Value::Object(properties) => {
                let mut map = serializer.serialize_map(Some(properties.len()))?;
                for (key, value) in properties {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Error(message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}
