//! The scalar value model addressed by paths, evaluated by conditions, and mutated
//! by effects (§3, §4.2).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A value stored at a path: a number, string, boolean, or list of scalars.
///
/// Equality never crosses variants — a number is never `==` to a string or a bool,
/// even if they'd print the same, per the coercion rule in §4.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A real number. Used for stats, metrics, and intensity.
    Number(f64),
    /// Free text: mood, status, tags-as-text, arbitrary string vars.
    Text(String),
    /// A boolean flag.
    Bool(bool),
    /// A list of scalars — also doubles as the representation of `tags`,
    /// `traits`, `goals`, and `fears`, which are sets of strings.
    List(Vec<Scalar>),
}

impl Scalar {
    /// Human-readable kind name, used in `TypeMismatch` reasons.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "text",
            Scalar::Bool(_) => "bool",
            Scalar::List(_) => "list",
        }
    }

    /// The number inside, if this is a `Number`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The list inside, if this is a `List`.
    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Scalar::List(items) => Some(items),
            _ => None,
        }
    }

    /// A list of strings, built from an ordered slice of owned strings.
    pub fn string_list<I: IntoIterator<Item = String>>(items: I) -> Scalar {
        Scalar::List(items.into_iter().map(Scalar::Text).collect())
    }

    /// Render for use in reason strings ("world.vars.tension = 45").
    pub fn display(&self) -> String {
        match self {
            Scalar::Number(n) => format_number(*n),
            Scalar::Text(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::List(items) => {
                let inner: Vec<String> = items.iter().map(Scalar::display).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }
}

/// Render a number without a trailing `.0` for whole values, matching the
/// canonical-JSON number rendering rule in §6.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let mut s = format!("{n}");
        if !s.contains('.') && !s.contains('e') && !s.contains("inf") && !s.contains("NaN") {
            s.push_str(".0");
        }
        s
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::List(a), Scalar::List(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Scalar {
    /// Numeric order for numbers, Unicode code-point order for text. Other
    /// combinations have no defined order (`<`/`<=`/`>`/`>=` require numbers).
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => a.chars().partial_cmp(b.chars()),
            _ => None,
        }
    }
}
