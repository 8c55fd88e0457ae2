use artemis::doc;
use artemis::errors::ErrorKind;
use artemis::query::{ConsistencyLevel, Params, QueryLanguage};
use artemis::repository::Args;
use artemis::store::Record;
use artemis::val;
use artemis_int_test::test_util::{
    cleanup, create_recording_context, create_test_context, run_test, Person, RecordingStore,
};

#[test]
fn test_literal_query_binds_positional_params() {
    let rows = vec![Record::of("Person", doc! { name: "Grace", age: 85 })];
    run_test(
        || create_recording_context(RecordingStore::with_rows(rows.clone())),
        |ctx| {
            let people = ctx.people()?;
            let adults: Vec<Person> = people.proxy().call("findAdults", Args::new())?;
            assert_eq!(adults, vec![Person::new("Grace", 85)]);

            let executes = ctx.recorder().unwrap().executes();
            assert_eq!(executes.len(), 1);
            assert_eq!(executes[0].0.text(), "select * from Person where age > 17");
            assert_eq!(executes[0].1, Params::None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_literal_query_takes_precedence_over_the_name() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            // findByCity would parse as a derived query, the attached text wins
            let found: Option<Person> = people
                .proxy()
                .call("findByCity", Args::new().param(doc! { city: "London" }))?;
            assert_eq!(found, None);

            let recorder = ctx.recorder().unwrap();
            assert!(recorder.finds().is_empty());

            let executes = recorder.executes();
            assert_eq!(executes[0].0.language(), QueryLanguage::N1ql);
            assert_eq!(executes[0].1, Params::Named(doc! { city: "London" }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_literal_query_with_several_params() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            people
                .proxy()
                .execute("findAdults", Args::new().param("Ada").param(36))?;

            let executes = ctx.recorder().unwrap().executes();
            assert_eq!(
                executes[0].1,
                Params::Positional(vec![val!("Ada"), val!(36)])
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_later_document_param_binds_by_name() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            people.proxy().execute(
                "findByCity",
                Args::new()
                    .param("ignored")
                    .param(doc! { city: "Paris" })
                    .param(doc! { city: "Rome" }),
            )?;

            let executes = ctx.recorder().unwrap().executes();
            assert_eq!(executes[0].1, Params::Named(doc! { city: "Paris" }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_literal_query_refuses_consistency() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            let err = people
                .proxy()
                .execute(
                    "findAdults",
                    Args::new().consistency(ConsistencyLevel::Quorum),
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DynamicQueryError);
            assert!(ctx.recorder().unwrap().executes().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_memory_store_rejects_literal_queries() {
    run_test(
        create_test_context,
        |ctx| {
            let people = ctx.people()?;
            let err = people
                .proxy()
                .call::<Vec<Person>>("findAdults", Args::new())
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);
            Ok(())
        },
        cleanup,
    )
}
