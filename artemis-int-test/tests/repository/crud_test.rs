use artemis::common::Convertible;
use artemis::errors::ErrorKind;
use artemis::query::ConsistencyLevel;
use artemis::repository::{Args, CrudRepository, Outcome};
use artemis::val;
use artemis_int_test::test_util::{
    cleanup, create_recording_context, create_test_context, run_test, Car, Person,
    RecordingStore,
};
use std::time::Duration;

#[test]
fn test_save_forwards_the_entity_unchanged() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            let ada = Person::new("Ada", 36).living_in("London");

            let saved = people.proxy().save(ada.clone())?;
            assert_eq!(saved, ada);
            people
                .proxy()
                .save_with_ttl(ada.clone(), Duration::from_secs(30))?;

            let saves = ctx.recorder().unwrap().saves();
            assert_eq!(saves.len(), 2);
            for (record, _) in &saves {
                assert_eq!(record.collection(), "Person");
                assert_eq!(Person::from_value(&val!(record.document().clone()))?, ada);
            }
            assert_eq!(saves[0].1, None);
            assert_eq!(saves[1].1, Some(Duration::from_secs(30)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_save_by_name_accepts_every_form() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            let ada = Person::new("Ada", 36);
            let grace = Person::new("Grace", 85);

            let one: Outcome<Person> = people.proxy().call("save", Args::new().entity(ada.clone()))?;
            assert!(matches!(one, Outcome::Saved(ref s) if s == &vec![ada.clone()]));

            let many: Vec<Person> = people.proxy().call(
                "save",
                Args::new()
                    .entities(vec![ada.clone(), grace.clone()])
                    .ttl(Duration::from_secs(5)),
            )?;
            assert_eq!(many, vec![ada.clone(), grace.clone()]);

            let saves = ctx.recorder().unwrap().saves();
            assert_eq!(saves.len(), 3);
            assert_eq!(saves[1].0.key(), Some(&val!("Ada")));
            assert_eq!(saves[2].0.key(), Some(&val!("Grace")));
            assert_eq!(saves[2].1, Some(Duration::from_secs(5)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_forwards_entities() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            people.proxy().update(Person::new("Ada", 37))?;
            people
                .proxy()
                .update_all(vec![Person::new("Grace", 86), Person::new("Alan", 42)])?;
            people
                .proxy()
                .execute("update", Args::new().entity(Person::new("Linus", 13)))?;

            let updates = ctx.recorder().unwrap().updates();
            let names: Vec<Person> = updates
                .iter()
                .map(|r| Person::from_value(&val!(r.document().clone())))
                .collect::<Result<_, _>>()?;
            assert_eq!(
                names,
                vec![
                    Person::new("Ada", 37),
                    Person::new("Grace", 86),
                    Person::new("Alan", 42),
                    Person::new("Linus", 13),
                ]
            );
            assert!(ctx.recorder().unwrap().saves().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_save_without_entity_fails() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            let err = people
                .proxy()
                .execute("save", Args::new().param("Ada"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_write_with_consistency_is_refused() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            for method in ["save", "update"] {
                let err = people
                    .proxy()
                    .execute(
                        method,
                        Args::new()
                            .entity(Person::new("Ada", 36))
                            .consistency(ConsistencyLevel::All),
                    )
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
            }

            let recorder = ctx.recorder().unwrap();
            assert!(recorder.saves().is_empty());
            assert!(recorder.updates().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_save_replaces_by_id_in_memory() {
    run_test(
        create_test_context,
        |ctx| {
            let people = ctx.people()?;
            people.proxy().save(Person::new("Ada", 36))?;
            people.proxy().save(Person::new("Ada", 37))?;
            assert_eq!(ctx.memory().unwrap().count("Person"), 1);

            people.proxy().update(Person::new("Ada", 38))?;
            let ada: Option<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(ada.map(|p| p.age), Some(38));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_saved_with_ttl_expires_in_memory() {
    run_test(
        create_test_context,
        |ctx| {
            let people = ctx.people()?;
            people
                .proxy()
                .save_with_ttl(Person::new("Ada", 36), Duration::from_millis(50))?;
            people.proxy().save(Person::new("Grace", 85))?;

            let memory = ctx.memory().unwrap().clone();
            awaitility::at_most(Duration::from_secs(5)).until(move || memory.count("Person") == 1);

            let ada: Option<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(ada, None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_mapped_columns_in_memory() {
    run_test(
        create_test_context,
        |ctx| {
            let cars = ctx.cars()?;
            cars.proxy().save(Car {
                plate: "KA-01".to_string(),
                model: "Beetle".to_string(),
                year: 1967,
                display_name: "ignored".to_string(),
            })?;

            let found: Option<Car> = cars
                .proxy()
                .call("findByYearLessThan", Args::new().param(1970))?;
            let found = found.unwrap();
            assert_eq!(found.plate, "KA-01");
            assert_eq!(found.display_name, "");

            let by_plate: Vec<Car> = cars.proxy().call("findByPlate", Args::new().param("KA-01"))?;
            assert_eq!(by_plate.len(), 1);
            Ok(())
        },
        cleanup,
    )
}
