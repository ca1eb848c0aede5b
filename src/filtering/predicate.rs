use super::FilterOperator;
use crate::fields::{FieldAccessor, FieldKind, Value};
use std::{fmt, sync::Arc};

/// One `field <operator> operand` test.
///
/// Date-time fields are compared by their date: both the operand and the
/// value read from the entity drop their time of day.
pub struct Comparison<T> {
    accessor: FieldAccessor<T>,
    operator: FilterOperator,
    operand: Value,
}

impl<T> Comparison<T> {
    pub(crate) fn new(accessor: FieldAccessor<T>, operator: FilterOperator, operand: Value) -> Self {
        let operand = if accessor.kind() == FieldKind::DateTime {
            operand.into_day()
        } else {
            operand
        };
        Self {
            accessor,
            operator,
            operand,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.accessor.path()
    }

    #[must_use]
    pub const fn operator(&self) -> FilterOperator {
        self.operator
    }

    #[must_use]
    pub const fn operand(&self) -> &Value {
        &self.operand
    }

    /// A missing intermediate relation never matches, whatever the operator.
    #[must_use]
    pub fn evaluate(&self, entity: &T) -> bool {
        let Some(value) = self.accessor.read(entity) else {
            return false;
        };
        let value = if self.accessor.kind() == FieldKind::DateTime {
            value.into_day()
        } else {
            value
        };
        self.operator
            .apply(&value, &self.operand, self.accessor.collation())
    }
}

impl<T> Clone for Comparison<T> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            operator: self.operator,
            operand: self.operand.clone(),
        }
    }
}

impl<T> fmt::Display for Comparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.accessor.path(),
            self.operator.symbol(),
            self.operand
        )
    }
}

type TestFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Boolean expression tree over an entity type.
///
/// Combinators flatten nested `All`/`Any` nodes and fold away `Always` and
/// `Never` where the result is unchanged, so `a.and(b).and(c)` is a single
/// three-way `All`.
pub enum Predicate<T> {
    Always,
    Never,
    Compare(Comparison<T>),
    /// Bespoke test such as a one-to-many traversal; `label` is used for display.
    Test { label: String, test: TestFn<T> },
    All(Vec<Predicate<T>>),
    Any(Vec<Predicate<T>>),
    Not(Box<Predicate<T>>),
}

impl<T> Predicate<T> {
    /// Evaluate against an entity, short-circuiting left to right.
    #[must_use]
    pub fn evaluate(&self, entity: &T) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Compare(comparison) => comparison.evaluate(entity),
            Self::Test { test, .. } => test(entity),
            Self::All(parts) => parts.iter().all(|part| part.evaluate(entity)),
            Self::Any(parts) => parts.iter().any(|part| part.evaluate(entity)),
            Self::Not(inner) => !inner.evaluate(entity),
        }
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Always, other) | (other, Self::Always) => other,
            (Self::Never, _) | (_, Self::Never) => Self::Never,
            (Self::All(mut left), Self::All(right)) => {
                left.extend(right);
                Self::All(left)
            }
            (Self::All(mut left), right) => {
                left.push(right);
                Self::All(left)
            }
            (left, Self::All(mut right)) => {
                right.insert(0, left);
                Self::All(right)
            }
            (left, right) => Self::All(vec![left, right]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Never, other) | (other, Self::Never) => other,
            (Self::Always, _) | (_, Self::Always) => Self::Always,
            (Self::Any(mut left), Self::Any(right)) => {
                left.extend(right);
                Self::Any(left)
            }
            (Self::Any(mut left), right) => {
                left.push(right);
                Self::Any(left)
            }
            (left, Self::Any(mut right)) => {
                right.insert(0, left);
                Self::Any(right)
            }
            (left, right) => Self::Any(vec![left, right]),
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Always => Self::Never,
            Self::Never => Self::Always,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    #[must_use]
    pub const fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    #[must_use]
    pub const fn is_never(&self) -> bool {
        matches!(self, Self::Never)
    }

    /// Number of leaf tests (comparisons and custom tests) in the tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Always | Self::Never => 0,
            Self::Compare(_) | Self::Test { .. } => 1,
            Self::All(parts) | Self::Any(parts) => parts.iter().map(Self::leaf_count).sum(),
            Self::Not(inner) => inner.leaf_count(),
        }
    }
}

impl<T: 'static> Predicate<T> {
    /// Wrap an arbitrary test.
    pub fn test(label: impl Into<String>, test: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::Test {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Matches when any related entity reached through a one-to-many link
    /// satisfies `inner`.
    #[must_use]
    pub fn related_any<U: 'static>(relation: &str, link: fn(&T) -> &[U], inner: Predicate<U>) -> Self {
        match inner {
            Predicate::Never => Self::Never,
            inner => Self::test(format!("any {relation}({inner})"), move |entity| {
                link(entity).iter().any(|related| inner.evaluate(related))
            }),
        }
    }
}

/// Fold predicates left to right with OR. `None` when the input is empty, which
/// callers treat as "no constraint".
pub fn any_of<T>(predicates: impl IntoIterator<Item = Predicate<T>>) -> Option<Predicate<T>> {
    predicates.into_iter().reduce(Predicate::or)
}

/// Fold predicates left to right with AND. `None` when the input is empty.
pub fn all_of<T>(predicates: impl IntoIterator<Item = Predicate<T>>) -> Option<Predicate<T>> {
    predicates.into_iter().reduce(Predicate::and)
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Always => Self::Always,
            Self::Never => Self::Never,
            Self::Compare(comparison) => Self::Compare(comparison.clone()),
            Self::Test { label, test } => Self::Test {
                label: label.clone(),
                test: Arc::clone(test),
            },
            Self::All(parts) => Self::All(parts.clone()),
            Self::Any(parts) => Self::Any(parts.clone()),
            Self::Not(inner) => Self::Not(inner.clone()),
        }
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("true"),
            Self::Never => f.write_str("false"),
            Self::Compare(comparison) => write!(f, "{comparison}"),
            Self::Test { label, .. } => f.write_str(label),
            Self::All(parts) => write_joined(f, parts, " AND ", "true"),
            Self::Any(parts) => write_joined(f, parts, " OR ", "false"),
            Self::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

fn write_joined<T>(
    f: &mut fmt::Formatter<'_>,
    parts: &[Predicate<T>],
    separator: &str,
    empty: &str,
) -> fmt::Result {
    if parts.is_empty() {
        return f.write_str(empty);
    }
    f.write_str("(")?;
    for (position, part) in parts.iter().enumerate() {
        if position > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{part}")?;
    }
    f.write_str(")")
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({self})")
    }
}
