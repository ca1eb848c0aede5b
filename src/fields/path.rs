use super::{Collation, FieldDef, FieldKind, Value};
use std::{fmt, sync::Arc};

type Reader<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;

/// Reads one (possibly nested) field from an entity.
///
/// `read` returns `None` when an intermediate relation is absent, which every
/// operator treats as "no match". A present but empty field reads as
/// `Some(Value::Null)`.
pub struct FieldAccessor<T> {
    path: String,
    kind: FieldKind,
    nullable: bool,
    collation: Collation,
    read: Reader<T>,
}

impl<T: 'static> FieldAccessor<T> {
    pub(super) fn from_def(def: &FieldDef<T>) -> Self {
        let getter = Arc::clone(&def.getter);
        Self {
            path: def.name.to_string(),
            kind: def.kind,
            nullable: def.nullable,
            collation: def.collation,
            read: Arc::new(move |entity: &T| Some(getter(entity))),
        }
    }

    /// Lift this accessor onto a parent type through a to-one link.
    pub(super) fn through<P: 'static>(self, relation: &str, link: fn(&P) -> Option<&T>) -> FieldAccessor<P> {
        let inner = self.read;
        FieldAccessor {
            path: format!("{relation}.{}", self.path),
            kind: self.kind,
            nullable: true,
            collation: self.collation,
            read: Arc::new(move |parent: &P| link(parent).and_then(|child| inner(child))),
        }
    }
}

impl<T> FieldAccessor<T> {
    #[must_use]
    pub fn read(&self, entity: &T) -> Option<Value> {
        (self.read)(entity)
    }

    /// Canonical dotted path using the declared spelling of every segment.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub const fn collation(&self) -> Collation {
        self.collation
    }

    #[must_use]
    pub(crate) fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }
}

impl<T> Clone for FieldAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            kind: self.kind,
            nullable: self.nullable,
            collation: self.collation,
            read: Arc::clone(&self.read),
        }
    }
}

impl<T> fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("collation", &self.collation)
            .finish_non_exhaustive()
    }
}
