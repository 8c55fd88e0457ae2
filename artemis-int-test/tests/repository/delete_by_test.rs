use artemis::errors::{ArtemisError, ErrorKind};
use artemis::query::{column, ConsistencyLevel};
use artemis::repository::{Args, Callback, CrudRepository, Outcome};
use artemis_int_test::test_util::{
    cleanup, create_recording_context, create_test_context, run_test, Captured, Person,
    RecordingStore,
};

#[test]
fn test_async_delete_by_name_reaches_the_store() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.async_people()?;
            let captured = Captured::<()>::new();
            people.proxy().invoke(
                "deleteByName",
                Args::new().param("Ada"),
                Some(Callback::completion(captured.sink())),
            )?;

            captured.wait()?;
            assert_eq!(captured.calls(), 1);

            let deletes = ctx.recorder().unwrap().deletes();
            assert_eq!(deletes.len(), 1);
            assert_eq!(deletes[0].collection(), "Person");
            assert_eq!(deletes[0].condition(), Some(&column("name").eq("Ada")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_async_delete_without_callback() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.async_people()?;
            people.proxy().invoke("deleteByAgeLessThan", Args::new().param(18), None)?;

            let recorder = ctx.recorder().unwrap().clone();
            awaitility::at_most(std::time::Duration::from_secs(5))
                .until(move || recorder.deletes().len() == 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_async_delete_failure_goes_to_callback() {
    run_test(
        || {
            create_recording_context(RecordingStore::failing(ArtemisError::new(
                "write timeout",
                ErrorKind::BackendError,
            )))
        },
        |ctx| {
            let people = ctx.async_people()?;
            let captured = Captured::<()>::new();
            // the dispatcher itself succeeds, the store reports through the callback
            people.proxy().invoke(
                "deleteByName",
                Args::new().param("Ada"),
                Some(Callback::completion(captured.sink())),
            )?;

            let err = captured.wait().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::BackendError);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sync_delete_by() {
    run_test(
        create_test_context,
        |ctx| {
            let people = ctx.people()?;
            people.proxy().save_all(vec![
                Person::new("Ada", 36),
                Person::new("Linus", 12),
                Person::new("Grace", 85),
            ])?;

            people
                .proxy()
                .execute("deleteByAgeLessThan", Args::new().param(18))?;
            assert_eq!(ctx.memory().unwrap().count("Person"), 2);

            people
                .proxy()
                .execute("delete_by_name", Args::new().param("Grace"))?;
            let left: Vec<Person> = people.proxy().call("findByAgeGreaterThan", Args::new().param(0))?;
            assert_eq!(left, vec![Person::new("Ada", 36)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_carries_consistency() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            people.proxy().execute(
                "deleteByName",
                Args::new().param("Ada").consistency(ConsistencyLevel::LocalQuorum),
            )?;

            let deletes = ctx.recorder().unwrap().deletes();
            assert_eq!(deletes[0].consistency(), Some(ConsistencyLevel::LocalQuorum));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_with_entity_result_leaves_the_store_untouched() {
    run_test(
        create_test_context,
        |ctx| {
            let people = ctx.people()?;
            people.proxy().save(Person::new("Ada", 36))?;

            let err = people
                .proxy()
                .call::<Vec<Person>>("deleteByName", Args::new().param("Ada"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert_eq!(ctx.memory().unwrap().count("Person"), 1);

            let outcome: Outcome<Person> = people
                .proxy()
                .call("deleteByName", Args::new().param("Ada"))?;
            assert_eq!(outcome, Outcome::Done);
            assert_eq!(ctx.memory().unwrap().count("Person"), 0);
            Ok(())
        },
        cleanup,
    )
}
