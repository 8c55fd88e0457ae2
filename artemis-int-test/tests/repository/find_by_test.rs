use artemis::doc;
use artemis::errors::ErrorKind;
use artemis::query::{column, ConsistencyLevel, Sort};
use artemis::repository::{Args, CrudRepository, EntityStream, Outcome};
use artemis::store::Record;
use artemis_int_test::test_util::{
    cleanup, create_recording_context, create_test_context, run_test, Person, RecordingStore,
    TestContext,
};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashSet, VecDeque};

fn ada_record() -> Record {
    Record::of("Person", doc! { name: "Ada", age: 12 })
}

fn seed(people: &[Person], ctx: &TestContext) {
    let repository = ctx.people().unwrap();
    repository.proxy().save_all(people.to_vec()).unwrap();
}

#[test]
fn test_find_by_name_returns_the_stored_record() {
    run_test(
        || create_recording_context(RecordingStore::with_rows(vec![ada_record()])),
        |ctx| {
            let people = ctx.people()?;
            let found: Option<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(found, Some(Person::new("Ada", 12)));

            let finds = ctx.recorder().unwrap().finds();
            assert_eq!(finds.len(), 1);
            assert_eq!(finds[0].collection(), "Person");
            assert_eq!(finds[0].condition(), Some(&column("name").eq("Ada")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_with_no_records_returns_none() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            let found: Option<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(found, None);

            let all: Vec<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert!(all.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_optional_takes_first_of_many() {
    let rows = vec![
        Record::of("Person", doc! { name: "Ada", age: 12 }),
        Record::of("Person", doc! { name: "Ada", age: 40 }),
    ];
    run_test(
        || create_recording_context(RecordingStore::with_rows(rows.clone())),
        |ctx| {
            let people = ctx.people()?;
            let found: Option<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(found, Some(Person::new("Ada", 12)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sets_collapse_duplicates() {
    let rows = vec![ada_record(), ada_record(), Record::of("Person", doc! { name: "Ada", age: 13 })];
    run_test(
        || create_recording_context(RecordingStore::with_rows(rows.clone())),
        |ctx| {
            let people = ctx.people()?;
            let hashed: HashSet<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(hashed.len(), 2);

            let ordered: BTreeSet<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(ordered.len(), 2);
            assert_eq!(ordered.iter().next(), Some(&Person::new("Ada", 12)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_other_shapes_keep_every_record() {
    let rows = vec![
        Record::of("Person", doc! { name: "Grace", age: 85 }),
        Record::of("Person", doc! { name: "Ada", age: 36 }),
    ];
    run_test(
        || create_recording_context(RecordingStore::with_rows(rows.clone())),
        |ctx| {
            let people = ctx.people()?;
            let args = || Args::new().param(18);

            let deque: VecDeque<Person> = people.proxy().call("findByAgeGreaterThan", args())?;
            assert_eq!(deque.front().map(|p| p.name.as_str()), Some("Grace"));

            let mut queue: BinaryHeap<Reverse<Person>> =
                people.proxy().call("findByAgeGreaterThan", args())?;
            assert_eq!(queue.pop().map(|Reverse(p)| p.name), Some("Ada".to_string()));

            let stream: EntityStream<Person> = people.proxy().call("findByAgeGreaterThan", args())?;
            assert_eq!(stream.len(), 2);
            let names: Vec<String> = stream.map(|p| p.name).collect();
            assert_eq!(names, vec!["Grace", "Ada"]);

            let raw: Outcome<Person> = people.proxy().call("findByAgeGreaterThan", args())?;
            assert!(matches!(raw, Outcome::Entities(ref e) if e.len() == 2));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_against_memory_store() {
    run_test(
        create_test_context,
        |ctx| {
            seed(
                &[
                    Person::new("Ada", 36).living_in("London"),
                    Person::new("Grace", 85).living_in("New York"),
                    Person::new("Alan", 41).living_in("London"),
                    Person::new("Linus", 12),
                ],
                &ctx,
            );
            let people = ctx.people()?;

            let ada: Option<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;
            assert_eq!(ada.map(|p| p.age), Some(36));

            let londoners: Vec<Person> = people.proxy().call(
                "findByCityAndAgeGreaterThanOrderByAgeDesc",
                Args::new().param("London").param(18),
            )?;
            let names: Vec<&str> = londoners.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Alan", "Ada"]);

            let between: Vec<Person> = people.proxy().call(
                "findByAgeBetweenOrderByName",
                Args::new().param(12).param(41),
            )?;
            let names: Vec<&str> = between.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Ada", "Alan", "Linus"]);

            let like: Vec<Person> = people.proxy().call("findByNameLike", Args::new().param("A%"))?;
            assert_eq!(like.len(), 2);

            let within: Vec<Person> = people
                .proxy()
                .call("findByNameIn", Args::new().param(vec!["Grace", "Linus", "Nobody"]))?;
            assert_eq!(within.len(), 2);

            let either: Vec<Person> = people.proxy().call(
                "findByNameOrAge",
                Args::new().param("Grace").param(12),
            )?;
            assert_eq!(either.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_first_and_top_limit_results() {
    run_test(
        create_test_context,
        |ctx| {
            seed(
                &[Person::new("Ada", 36), Person::new("Grace", 85), Person::new("Alan", 41)],
                &ctx,
            );
            let people = ctx.people()?;

            let oldest: Vec<Person> = people.proxy().call(
                "findFirstByAgeGreaterThanOrderByAgeDesc",
                Args::new().param(0),
            )?;
            assert_eq!(oldest, vec![Person::new("Grace", 85)]);

            let youngest: Vec<Person> =
                people.proxy().call("findTop2ByOrderByAgeAsc", Args::new())?;
            let names: Vec<&str> = youngest.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, vec!["Ada", "Alan"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_snake_case_method_names() {
    run_test(
        || create_recording_context(RecordingStore::with_rows(vec![ada_record()])),
        |ctx| {
            let people = ctx.people()?;
            let found: Vec<Person> = people
                .proxy()
                .call("find_by_age_less_than_equal_order_by_name", Args::new().param(12))?;
            assert_eq!(found.len(), 1);

            let finds = ctx.recorder().unwrap().finds();
            assert_eq!(finds[0].condition(), Some(&column("age").lte(12)));
            assert_eq!(finds[0].sorts(), &[Sort::asc("name")]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_consistency_reaches_the_query() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;
            let _: Vec<Person> = people.proxy().call(
                "findByName",
                Args::new().param("Ada").consistency(ConsistencyLevel::Quorum),
            )?;
            let _: Vec<Person> = people.proxy().call("findByName", Args::new().param("Ada"))?;

            let finds = ctx.recorder().unwrap().finds();
            assert_eq!(finds[0].consistency(), Some(ConsistencyLevel::Quorum));
            assert_eq!(finds[1].consistency(), None);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_method_names() {
    run_test(
        || create_recording_context(RecordingStore::new()),
        |ctx| {
            let people = ctx.people()?;

            let unknown_field = people
                .proxy()
                .call::<Vec<Person>>("findByHeight", Args::new().param(180))
                .unwrap_err();
            assert_eq!(unknown_field.kind(), &ErrorKind::DynamicQueryError);

            let missing_param = people
                .proxy()
                .call::<Vec<Person>>("findByNameAndAge", Args::new().param("Ada"))
                .unwrap_err();
            assert_eq!(missing_param.kind(), &ErrorKind::DynamicQueryError);

            let extra_param = people
                .proxy()
                .call::<Vec<Person>>("findByName", Args::new().param("Ada").param(1))
                .unwrap_err();
            assert_eq!(extra_param.kind(), &ErrorKind::DynamicQueryError);

            // nothing reached the store
            assert!(ctx.recorder().unwrap().finds().is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_backend_error_propagates_unchanged() {
    run_test(
        || {
            create_recording_context(RecordingStore::failing(
                artemis::errors::ArtemisError::new("node unavailable", ErrorKind::BackendError),
            ))
        },
        |ctx| {
            let people = ctx.people()?;
            let err = people
                .proxy()
                .call::<Option<Person>>("findByName", Args::new().param("Ada"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::BackendError);
            assert_eq!(err.message(), "node unavailable");
            Ok(())
        },
        cleanup,
    )
}
