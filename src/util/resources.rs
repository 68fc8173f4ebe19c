//! Resource vectors exchanged with the resource manager.
//!
//! A [`Resources`] value maps resource names to either a scalar quantity
//! (`cpus`, `mem`, `disk`, or any custom name) or a set of inclusive integer
//! ranges (`ports`). Scalar arithmetic is done in fixed point with three
//! decimal places so that repeated subtraction never drifts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// CPU shares.
pub const CPUS: &str = "cpus";
/// Memory in megabytes.
pub const MEM: &str = "mem";
/// Disk in megabytes.
pub const DISK: &str = "disk";
/// Port ranges.
pub const PORTS: &str = "ports";

/// Inclusive integer range, e.g. a block of ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueRange {
    /// First value in the range.
    pub begin: u64,
    /// Last value in the range (inclusive).
    pub end: u64,
}

impl ValueRange {
    /// Create a range; `begin > end` yields an empty range that is dropped on normalization.
    pub const fn new(begin: u64, end: u64) -> Self {
        Self { begin, end }
    }

    /// Number of values covered.
    pub const fn len(&self) -> u64 {
        if self.begin > self.end {
            0
        } else {
            self.end - self.begin + 1
        }
    }

    /// True when the range covers no value.
    pub const fn is_empty(&self) -> bool {
        self.begin > self.end
    }
}

/// Value of a single named resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceValue {
    /// Divisible quantity.
    Scalar(f64),
    /// Set of discrete values.
    Ranges(Vec<ValueRange>),
}

/// A resource vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources {
    entries: BTreeMap<String, ResourceValue>,
}

#[allow(clippy::cast_possible_truncation)]
fn to_milli(value: f64) -> i64 {
    (value * 1000.0).round() as i64
}

/// Milli units of a requirement: rounded up, so any positive need costs at
/// least one unit. Values within float noise of a whole unit stay exact.
#[allow(clippy::cast_possible_truncation)]
fn need_milli(value: f64) -> i64 {
    let scaled = value * 1000.0;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < 1e-6 {
        nearest as i64
    } else {
        scaled.ceil() as i64
    }
}

#[allow(clippy::cast_precision_loss)]
fn from_milli(value: i64) -> f64 {
    value as f64 / 1000.0
}

fn normalize(ranges: &[ValueRange]) -> Vec<ValueRange> {
    let mut sorted: Vec<ValueRange> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
    sorted.sort_unstable();
    let mut out: Vec<ValueRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match out.last_mut() {
            Some(last) if range.begin <= last.end.saturating_add(1) => {
                last.end = last.end.max(range.end);
            }
            _ => out.push(range),
        }
    }
    out
}

/// Both inputs must be normalized; a contiguous need then lies inside one available range.
fn covers(available: &[ValueRange], needed: &[ValueRange]) -> bool {
    needed
        .iter()
        .all(|n| available.iter().any(|a| a.begin <= n.begin && n.end <= a.end))
}

fn subtract_ranges(available: &[ValueRange], needed: &[ValueRange]) -> Vec<ValueRange> {
    let mut out = available.to_vec();
    for n in needed {
        out = out
            .into_iter()
            .flat_map(|a| {
                let mut parts = Vec::with_capacity(2);
                if n.end < a.begin || n.begin > a.end {
                    parts.push(a);
                } else {
                    if a.begin < n.begin {
                        parts.push(ValueRange::new(a.begin, n.begin - 1));
                    }
                    if n.end < a.end {
                        parts.push(ValueRange::new(n.end + 1, a.end));
                    }
                }
                parts
            })
            .collect();
    }
    out
}

impl Resources {
    /// Empty resource vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style scalar setter.
    #[must_use]
    pub fn with_scalar(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_scalar(name, value);
        self
    }

    /// Builder-style range setter; ranges are given as inclusive `(begin, end)` pairs.
    #[must_use]
    pub fn with_ranges(
        mut self,
        name: impl Into<String>,
        ranges: impl IntoIterator<Item = (u64, u64)>,
    ) -> Self {
        let ranges: Vec<ValueRange> = ranges
            .into_iter()
            .map(|(begin, end)| ValueRange::new(begin, end))
            .collect();
        self.entries
            .insert(name.into(), ResourceValue::Ranges(normalize(&ranges)));
        self
    }

    /// Set a scalar resource, replacing any previous value under that name.
    pub fn set_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.entries.insert(name.into(), ResourceValue::Scalar(value));
    }

    /// Scalar quantity under `name`, 0 when absent or not a scalar.
    pub fn scalar(&self, name: &str) -> f64 {
        match self.entries.get(name) {
            Some(ResourceValue::Scalar(v)) => *v,
            _ => 0.0,
        }
    }

    /// Normalized ranges under `name`, empty when absent or not a range set.
    pub fn ranges(&self, name: &str) -> Vec<ValueRange> {
        match self.entries.get(name) {
            Some(ResourceValue::Ranges(r)) => normalize(r),
            _ => Vec::new(),
        }
    }

    /// CPU shares.
    pub fn cpus(&self) -> f64 {
        self.scalar(CPUS)
    }

    /// Memory in megabytes.
    pub fn mem(&self) -> f64 {
        self.scalar(MEM)
    }

    /// Iterate over all named entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// True when every scalar is zero and every range set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|v| match v {
            ResourceValue::Scalar(s) => to_milli(*s) <= 0,
            ResourceValue::Ranges(r) => r.iter().all(ValueRange::is_empty),
        })
    }

    /// True when `self` has at least as much of every resource in `other`.
    pub fn contains(&self, other: &Self) -> bool {
        other.entries.iter().all(|(name, needed)| match needed {
            ResourceValue::Scalar(n) => {
                need_milli(*n) <= 0 || to_milli(self.scalar(name)) >= need_milli(*n)
            }
            ResourceValue::Ranges(n) => covers(&self.ranges(name), &normalize(n)),
        })
    }

    /// `self - other`, or `None` when `other` does not fit in `self`.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if !self.contains(other) {
            return None;
        }
        let mut out = self.clone();
        for (name, needed) in &other.entries {
            match needed {
                ResourceValue::Scalar(n) => {
                    if need_milli(*n) <= 0 {
                        continue;
                    }
                    let left = to_milli(self.scalar(name)) - need_milli(*n);
                    out.entries
                        .insert(name.clone(), ResourceValue::Scalar(from_milli(left)));
                }
                ResourceValue::Ranges(n) => {
                    let left = subtract_ranges(&self.ranges(name), &normalize(n));
                    out.entries.insert(name.clone(), ResourceValue::Ranges(left));
                }
            }
        }
        Some(out)
    }

    /// Add `other` into `self`. Entries whose kind differs from the existing
    /// entry of the same name are ignored.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.entries {
            match (self.entries.get_mut(name), value) {
                (None, v) => {
                    self.entries.insert(name.clone(), v.clone());
                }
                (Some(ResourceValue::Scalar(have)), ResourceValue::Scalar(add)) => {
                    *have = from_milli(to_milli(*have) + to_milli(*add));
                }
                (Some(ResourceValue::Ranges(have)), ResourceValue::Ranges(add)) => {
                    let mut joined = have.clone();
                    joined.extend_from_slice(add);
                    *have = normalize(&joined);
                }
                _ => {}
            }
        }
    }

    /// Sum a sequence of resource vectors.
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut total = Self::new();
        for item in items {
            total.merge(item);
        }
        total
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in &self.entries {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            match value {
                ResourceValue::Scalar(v) => write!(f, "{name}:{v}")?,
                ResourceValue::Ranges(ranges) => {
                    write!(f, "{name}:[")?;
                    for (i, r) in normalize(ranges).iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}-{}", r.begin, r.end)?;
                    }
                    f.write_str("]")?;
                }
            }
        }
        Ok(())
    }
}
