use crate::common::Value;
use crate::entity::{Entity, EntityMetadata};
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::store::Record;
use std::marker::PhantomData;
use std::sync::Arc;

/// Converts entities of type `T` to store [Record]s and back.
pub struct EntityConverter<T> {
    metadata: Arc<EntityMetadata>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityConverter<T> {
    fn clone(&self) -> Self {
        EntityConverter {
            metadata: Arc::clone(&self.metadata),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> EntityConverter<T> {
    pub fn new(metadata: Arc<EntityMetadata>) -> Self {
        EntityConverter {
            metadata,
            _phantom: PhantomData,
        }
    }

    pub fn metadata(&self) -> &Arc<EntityMetadata> {
        &self.metadata
    }

    pub fn to_record(&self, entity: &T) -> ArtemisResult<Record> {
        match entity.to_value()? {
            Value::Document(document) => {
                let key = self
                    .metadata
                    .id_column()
                    .map(|column| document.get(column))
                    .filter(|key| !key.is_null());
                Ok(Record::new(self.metadata.name(), key, document))
            }
            other => {
                log::error!("Entity {} did not convert to a document: {}", self.metadata.name(), other);
                Err(ArtemisError::new(
                    &format!("Entity {} must convert to a document", self.metadata.name()),
                    ErrorKind::ObjectMappingError,
                ))
            }
        }
    }

    pub fn to_records(&self, entities: &[T]) -> ArtemisResult<Vec<Record>> {
        entities.iter().map(|e| self.to_record(e)).collect()
    }

    pub fn to_entity(&self, record: &Record) -> ArtemisResult<T> {
        T::from_value(&Value::Document(record.document().clone()))
    }

    pub fn to_entities(&self, records: &[Record]) -> ArtemisResult<Vec<T>> {
        records.iter().map(|r| self.to_entity(r)).collect()
    }
}
