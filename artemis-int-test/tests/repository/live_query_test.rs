use artemis::doc;
use artemis::errors::{ArtemisResult, ErrorKind};
use artemis::query::{column, LiteralQuery, Params, Query};
use artemis::repository::{Args, AsyncCrudRepository, CrudRepository};
use artemis::store::{LiveQuery, Record};
use artemis::val;
use artemis_int_test::test_util::{
    cleanup, create_recording_context, create_test_context, run_test, Person, RecordingStore,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

type Seen = Arc<Mutex<Vec<ArtemisResult<Person>>>>;

fn seen() -> Seen {
    Arc::new(Mutex::new(Vec::new()))
}

fn names(seen: &Seen) -> Vec<String> {
    let mut names: Vec<String> = seen
        .lock()
        .iter()
        .filter_map(|p| p.as_ref().ok())
        .map(|p| p.name.clone())
        .collect();
    names.sort();
    names
}

#[test]
fn test_live_query_follows_writes_in_memory() {
    run_test(
        create_test_context,
        |ctx| {
            let async_people = ctx.async_people()?;
            let people = ctx.people()?;
            let londoners = seen();
            let sink = Arc::clone(&londoners);

            let subscription = async_people.proxy().live(
                Query::new("Person").with_condition(column("city").eq("London")),
                move |person| sink.lock().push(person),
            )?;
            assert_eq!(ctx.memory().unwrap().live_queries(), 1);

            people.proxy().save(Person::new("Ada", 36).living_in("London"))?;
            people.proxy().save(Person::new("Grace", 85).living_in("New York"))?;
            async_people
                .proxy()
                .save(Person::new("Alan", 41).living_in("London"), None)?;

            let watched = Arc::clone(&londoners);
            awaitility::at_most(Duration::from_secs(5)).until(move || watched.lock().len() == 2);
            assert_eq!(names(&londoners), vec!["Ada", "Alan"]);

            async_people.proxy().unsubscribe(&subscription)?;
            assert_eq!(ctx.memory().unwrap().live_queries(), 0);
            people.proxy().update(Person::new("Ada", 37).living_in("London"))?;
            assert_eq!(londoners.lock().len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_live_literal_query_reaches_the_driver() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let async_people = ctx.async_people()?;
            let received = seen();
            let sink = Arc::clone(&received);
            let query = LiteralQuery::orient_sql("select from Person where name = ?");

            async_people.proxy().live_literal(
                query.clone(),
                Args::new().param("Ada"),
                move |person| sink.lock().push(person),
            )?;

            let recorder = ctx.recorder().unwrap();
            assert_eq!(
                recorder.live_queries(),
                vec![LiveQuery::Literal(query, Params::Positional(vec![val!("Ada")]))]
            );

            recorder.publish(Record::of("Person", doc! { name: "Ada", age: 36 }));
            let watched = Arc::clone(&received);
            awaitility::at_most(Duration::from_secs(5)).until(move || watched.lock().len() == 1);

            let person = received.lock().remove(0)?;
            assert_eq!(person, Person::new("Ada", 36));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_memory_store_rejects_live_literal_queries() {
    run_test(
        create_test_context,
        |ctx| {
            let async_people = ctx.async_people()?;
            let err = async_people
                .proxy()
                .live_literal(
                    LiteralQuery::orient_sql("select from Person"),
                    Args::new(),
                    |_| {},
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);
            assert_eq!(ctx.memory().unwrap().live_queries(), 0);
            Ok(())
        },
        cleanup,
    )
}
