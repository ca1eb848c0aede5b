use super::{Collation, FieldAccessor, FieldEnum, FieldKind, Value};
use std::{collections::HashMap, fmt, sync::Arc};

pub(super) type Getter<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

type RelationResolver<T> = Arc<dyn Fn(&str) -> Option<FieldAccessor<T>> + Send + Sync>;

/// A scalar field registered on an [`EntitySchema`].
pub struct FieldDef<T> {
    pub(super) name: &'static str,
    pub(super) kind: FieldKind,
    pub(super) nullable: bool,
    pub(super) collation: Collation,
    pub(super) getter: Getter<T>,
}

impl<T: 'static> FieldDef<T> {
    pub fn new(
        name: &'static str,
        kind: FieldKind,
        getter: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            collation: Collation::Ordinal,
            getter: Arc::new(getter),
        }
    }

    pub fn text(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Text, getter)
    }

    pub fn integer(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Integer, getter)
    }

    pub fn float(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Float, getter)
    }

    pub fn decimal(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Decimal, getter)
    }

    pub fn boolean(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Boolean, getter)
    }

    pub fn date(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Date, getter)
    }

    pub fn date_time(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::DateTime, getter)
    }

    pub fn uuid(name: &'static str, getter: impl Fn(&T) -> Value + Send + Sync + 'static) -> Self {
        Self::new(name, FieldKind::Uuid, getter)
    }

    /// Register an enum-typed field; values order by declaration position.
    pub fn enumeration<E: FieldEnum>(name: &'static str, getter: fn(&T) -> E) -> Self {
        Self::new(name, FieldKind::Enum(E::VARIANTS), move |entity| {
            Value::enumeration(getter(entity))
        })
    }

    pub fn optional_enumeration<E: FieldEnum>(name: &'static str, getter: fn(&T) -> Option<E>) -> Self {
        Self::new(name, FieldKind::Enum(E::VARIANTS), move |entity| {
            getter(entity).map_or(Value::Null, Value::enumeration)
        })
        .nullable()
    }

    /// Accept the literal `null` as a filter value for this field.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Compare text on this field without regard to case.
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.collation = Collation::IgnoreCase;
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .field("collation", &self.collation)
            .finish_non_exhaustive()
    }
}

/// Declared, read-only field table for one entity type.
///
/// Built once (usually inside a `LazyLock`) and shared across requests. All
/// lookups ignore case.
pub struct EntitySchema<T: 'static> {
    name: &'static str,
    fields: Vec<FieldDef<T>>,
    index: HashMap<String, usize>,
    relations: Vec<&'static str>,
    resolvers: HashMap<String, RelationResolver<T>>,
}

impl<T: 'static> EntitySchema<T> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            index: HashMap::new(),
            relations: Vec::new(),
            resolvers: HashMap::new(),
        }
    }

    /// Register a scalar field. A later field with the same name replaces the
    /// earlier one.
    #[must_use]
    pub fn field(mut self, def: FieldDef<T>) -> Self {
        let key = def.name.to_uppercase();
        if let Some(&position) = self.index.get(&key) {
            self.fields[position] = def;
        } else {
            self.index.insert(key, self.fields.len());
            self.fields.push(def);
        }
        self
    }

    /// Register a to-one relation. Paths starting with `name.` continue on the
    /// target schema; an absent link reads as "no match".
    #[must_use]
    pub fn relation<U: 'static>(
        mut self,
        name: &'static str,
        link: fn(&T) -> Option<&U>,
        target: &'static EntitySchema<U>,
    ) -> Self {
        let resolver: RelationResolver<T> =
            Arc::new(move |rest: &str| target.resolve(rest).map(|inner| inner.through(name, link)));
        self.resolvers.insert(name.to_uppercase(), resolver);
        if !self.relations.contains(&name) {
            self.relations.push(name);
        }
        self
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a scalar field declared directly on this entity.
    #[must_use]
    pub fn field_def(&self, name: &str) -> Option<&FieldDef<T>> {
        self.index
            .get(&name.trim().to_uppercase())
            .and_then(|&position| self.fields.get(position))
    }

    /// Declared scalar field names, in registration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|def| def.name)
    }

    /// Declared relation names, in registration order.
    #[must_use]
    pub fn relation_names(&self) -> &[&'static str] {
        &self.relations
    }

    /// Resolve a dotted field path into an accessor.
    ///
    /// Returns `None` when any segment is unknown. Segments are matched
    /// case-insensitively; the accessor reports the declared spelling.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<FieldAccessor<T>> {
        let path = path.trim();
        match path.split_once('.') {
            None => self.field_def(path).map(FieldAccessor::from_def),
            Some((head, rest)) => self
                .resolvers
                .get(&head.trim().to_uppercase())
                .and_then(|resolver| resolver(rest)),
        }
    }
}

impl<T: 'static> fmt::Debug for EntitySchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("relations", &self.relations)
            .finish_non_exhaustive()
    }
}
