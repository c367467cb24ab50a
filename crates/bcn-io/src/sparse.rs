//! Sparse indexed variables.
//!
//! Solvers only print the non-zero entries of a decision variable, keyed by
//! the set members it is indexed over. A [`Variable`] collects those entries
//! under a fixed-arity key and reads back zero for anything never set. Every
//! key component is also registered in the named [`Index`] of its position,
//! which is how decoders learn which OD pairs, arcs, levels and breakpoints a
//! report actually mentions.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use bcn_core::{BcnError, BcnResult};

/// Named set of key values observed so far, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Index {
    name: String,
    seen: HashSet<String>,
    values: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record `value`; returns false if it was already present.
    pub fn add(&mut self, value: &str) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.to_string());
        self.values.push(value.to_string());
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Indexes shared by the variables of one decoding pass, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct Indexes {
    by_name: BTreeMap<String, Index>,
}

impl Indexes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, index: &str, value: &str) {
        self.by_name
            .entry(index.to_string())
            .or_insert_with(|| Index::new(index))
            .add(value);
    }

    pub fn get(&self, name: &str) -> Option<&Index> {
        self.by_name.get(name)
    }

    /// Members of the index named `name`; empty if nothing was registered.
    pub fn members(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|i| i.iter().collect()).unwrap_or_default()
    }
}

/// Fixed-arity key of a sparse variable.
pub trait VariableKey: Clone + Eq + Hash {
    const ARITY: usize;

    /// Build a key from its textual components; `None` on an arity mismatch.
    fn from_parts(parts: &[&str]) -> Option<Self>;

    fn parts(&self) -> Vec<&str>;
}

impl VariableKey for () {
    const ARITY: usize = 0;

    fn from_parts(parts: &[&str]) -> Option<Self> {
        // a scalar may be printed as `name` or `name()`
        match parts {
            [] | [""] => Some(()),
            _ => None,
        }
    }

    fn parts(&self) -> Vec<&str> {
        Vec::new()
    }
}

impl VariableKey for String {
    const ARITY: usize = 1;

    fn from_parts(parts: &[&str]) -> Option<Self> {
        match parts {
            [a] => Some(a.to_string()),
            _ => None,
        }
    }

    fn parts(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl VariableKey for (String, String) {
    const ARITY: usize = 2;

    fn from_parts(parts: &[&str]) -> Option<Self> {
        match parts {
            [a, b] => Some((a.to_string(), b.to_string())),
            _ => None,
        }
    }

    fn parts(&self) -> Vec<&str> {
        vec![self.0.as_str(), self.1.as_str()]
    }
}

impl VariableKey for (String, String, String) {
    const ARITY: usize = 3;

    fn from_parts(parts: &[&str]) -> Option<Self> {
        match parts {
            [a, b, c] => Some((a.to_string(), b.to_string(), c.to_string())),
            _ => None,
        }
    }

    fn parts(&self) -> Vec<&str> {
        vec![self.0.as_str(), self.1.as_str(), self.2.as_str()]
    }
}

/// Conversion applied to every raw value before it is stored.
pub type Coercion<V> = fn(&str) -> BcnResult<V>;

/// A sparse decision variable with key type `K` and value type `V`.
#[derive(Clone)]
pub struct Variable<K: VariableKey, V> {
    name: String,
    index_names: Vec<String>,
    coerce: Coercion<V>,
    values: HashMap<K, V>,
}

impl<K: VariableKey, V: Copy + Default> Variable<K, V> {
    /// `index_names` names the [`Index`] of each key position.
    pub fn new(name: impl Into<String>, index_names: &[&str], coerce: Coercion<V>) -> Self {
        debug_assert_eq!(index_names.len(), K::ARITY);
        Self {
            name: name.into(),
            index_names: index_names.iter().map(|s| s.to_string()).collect(),
            coerce,
            values: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Coerce `raw` and store it under `key`, registering every key component.
    pub fn set(&mut self, key: K, raw: &str, indexes: &mut Indexes) -> BcnResult<()> {
        let value = (self.coerce)(raw.trim()).map_err(|e| match e {
            BcnError::Parse(msg) => BcnError::Parse(format!("variable {}: {}", self.name, msg)),
            other => other,
        })?;
        for (index, part) in self.index_names.iter().zip(key.parts()) {
            indexes.register(index, part);
        }
        self.values.insert(key, value);
        Ok(())
    }

    /// Stored value, or zero when `key` was never set.
    pub fn get(&self, key: &K) -> V {
        self.values.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Copy + Default> Variable<(), V> {
    /// Value of a zero-arity variable.
    pub fn scalar(&self) -> V {
        self.get(&())
    }
}

/// Object-safe view used by decoders that dispatch on the variable name.
pub trait SparseVariable {
    fn name(&self) -> &str;

    /// Store `raw` under the key made of `parts`.
    fn set_raw(&mut self, parts: &[&str], raw: &str, indexes: &mut Indexes) -> BcnResult<()>;
}

impl<K: VariableKey, V: Copy + Default> SparseVariable for Variable<K, V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_raw(&mut self, parts: &[&str], raw: &str, indexes: &mut Indexes) -> BcnResult<()> {
        let key = K::from_parts(parts).ok_or_else(|| {
            BcnError::Parse(format!(
                "variable {} expects {} index components, got {}",
                self.name,
                K::ARITY,
                parts.len()
            ))
        })?;
        self.set(key, raw, indexes)
    }
}

/// Integer from a solver-printed float that should have been integral.
///
/// Solvers report binaries as `0.9999999` or `1e-07`; values are snapped to
/// the nearest integer by taking the remainder against the rounded value.
pub fn solver_int(raw: &str) -> BcnResult<i64> {
    let value = solver_float(raw)?;
    if value < 0.0 {
        return Ok(-snap(-value));
    }
    Ok(snap(value))
}

fn snap(value: f64) -> i64 {
    let divisor = value.round().max(1.0);
    let module = value % divisor;
    if module > 0.5 {
        value.ceil() as i64
    } else {
        value.floor() as i64
    }
}

pub fn solver_float(raw: &str) -> BcnResult<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| BcnError::Parse(format!("'{}' is not a number", raw)))
}
