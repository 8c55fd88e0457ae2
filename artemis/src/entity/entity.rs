use crate::common::Convertible;
use crate::query::split_words;
use smallvec::SmallVec;

/// Trait that provides the mapping metadata of a persistable type.
///
/// # Purpose
/// Tells the query translator which fields a repository's entity has, what the
/// store calls them, and which collection (column family, bucket, index,
/// class) holds them. Implemented automatically by `#[derive(Entity)]`.
///
/// # Usage
/// ```ignore
/// #[derive(Entity, Convertible, Default)]
/// #[entity(name = "Person", id = "name")]
/// pub struct Person {
///     name: String,
///     #[column(name = "person_age")]
///     age: i32,
/// }
/// ```
pub trait Entity: Convertible<Output = Self> + Send + Sync + 'static {
    /// Returns the metadata for this entity type.
    ///
    /// Called once per repository when its proxy is built; the result is
    /// shared by every invocation afterwards.
    fn entity_metadata() -> EntityMetadata;
}

/// Maps one entity field to the column that stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    field_name: String,
    column_name: String,
    words: SmallVec<[String; 4]>,
}

impl FieldMapping {
    /// Creates a mapping; the column defaults to the field name.
    pub fn new(field_name: &str, column_name: Option<&str>) -> Self {
        FieldMapping {
            field_name: field_name.to_string(),
            column_name: column_name.unwrap_or(field_name).to_string(),
            words: split_words(field_name),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// The field name split into lower-case words, as matched against method names.
    pub(crate) fn words(&self) -> &[String] {
        &self.words
    }
}

/// Describes how an entity type is laid out in the store.
///
/// # Characteristics
/// - Immutable once built; shared behind an `Arc` by the repository proxies
/// - Field order is declaration order
/// - The id field, if any, decides the record key used for upserts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    name: String,
    fields: Vec<FieldMapping>,
    id_field: Option<String>,
}

impl EntityMetadata {
    /// Starts metadata for the collection `name` with no fields.
    pub fn new(name: &str) -> Self {
        EntityMetadata {
            name: name.to_string(),
            fields: Vec::new(),
            id_field: None,
        }
    }

    /// Adds a field stored under its own name.
    pub fn field(self, field_name: &str) -> Self {
        self.mapped_field(field_name, field_name)
    }

    /// Adds a field stored under `column_name`.
    pub fn mapped_field(mut self, field_name: &str, column_name: &str) -> Self {
        self.fields.push(FieldMapping::new(field_name, Some(column_name)));
        self
    }

    /// Marks `field_name` as the entity id.
    pub fn id(mut self, field_name: &str) -> Self {
        self.id_field = Some(field_name.to_string());
        self
    }

    /// The collection name used by queries against this entity.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn field_mapping(&self, field_name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.field_name == field_name)
    }

    /// Column that holds the id, if the entity declares one.
    pub fn id_column(&self) -> Option<&str> {
        let id_field = self.id_field.as_deref()?;
        self.field_mapping(id_field)
            .map(FieldMapping::column_name)
            .or(Some(id_field))
    }
}
