use artemis::common::{Convertible, Value};
use artemis::doc;
use artemis::entity::{Entity, FieldMapping};
use artemis::errors::ErrorKind;
use artemis_int_test::test_util::{Car, Person};

#[test]
fn test_derived_metadata() {
    let metadata = Person::entity_metadata();
    assert_eq!(metadata.name(), "Person");
    assert_eq!(metadata.id_column(), Some("name"));

    let fields: Vec<&str> = metadata.fields().iter().map(FieldMapping::field_name).collect();
    assert_eq!(fields, vec!["name", "age", "city"]);
}

#[test]
fn test_derived_metadata_with_columns() {
    let metadata = Car::entity_metadata();
    assert_eq!(metadata.name(), "cars");
    assert_eq!(metadata.id_column(), Some("_key"));
    assert_eq!(
        metadata.field_mapping("year").map(FieldMapping::column_name),
        Some("model_year")
    );
    // ignored fields cannot be queried
    assert!(metadata.field_mapping("display_name").is_none());
}

#[test]
fn test_default_entity_name() {
    #[derive(Debug, Default, artemis_derive::Convertible, artemis_derive::Entity)]
    struct Book {
        title: String,
    }

    let metadata = Book::entity_metadata();
    assert_eq!(metadata.name(), "Book");
    assert_eq!(metadata.id_column(), None);
    assert_eq!(metadata.fields().len(), 1);
}

#[test]
fn test_derived_conversion() {
    let ada = Person::new("Ada", 36).living_in("London");
    let value = ada.to_value().unwrap();
    assert_eq!(
        value,
        Value::Document(doc! { name: "Ada", age: 36, city: "London" })
    );
    assert_eq!(Person::from_value(&value).unwrap(), ada);
}

#[test]
fn test_derived_conversion_renames_and_ignores() {
    let car = Car {
        plate: "KA-01".to_string(),
        model: "Beetle".to_string(),
        year: 1967,
        display_name: "my car".to_string(),
    };

    let value = car.to_value().unwrap();
    let document = value.as_document().unwrap();
    assert_eq!(document.get("_key"), Value::from("KA-01"));
    assert_eq!(document.get("model_year"), Value::from(1967));
    assert!(!document.contains_key("display_name"));

    let back = Car::from_value(&value).unwrap();
    assert_eq!(back.plate, "KA-01");
    assert_eq!(back.display_name, "");
}

#[test]
fn test_missing_optional_field_is_none() {
    let person = Person::from_value(&Value::Document(doc! { name: "Ada", age: 36 })).unwrap();
    assert_eq!(person.city, None);
}

#[test]
fn test_conversion_from_non_document() {
    let err = Person::from_value(&Value::from(1)).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
}

#[test]
fn test_conversion_with_wrong_field_type() {
    let err = Person::from_value(&Value::Document(doc! { name: 7, age: 36 })).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
}
