use lifetree_core::db::open_db_in_memory;
use lifetree_core::{
    Gender, LifeStatus, Origin, Person, PersonListQuery, PersonRepository, PersonValidationError,
    RelationRole, RepoError, SqlitePersonRepository,
};
use rusqlite::Connection;

const GROUP: &str = "family-1";

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn upsert_and_get_roundtrip_preserves_all_fields() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::with_id("gm", "Rosa", RelationRole::Grandmother);
    person.gender = Some(Gender::Female);
    person.birth_date = Some("1931-03-09".to_string());
    person.death_date = Some("2004".to_string());
    person.father_id = Some("ggf".to_string());
    person.spouse_id = Some("gf".to_string());
    person.status = Some(LifeStatus::Deceased);
    person.biography = Some("Baker in Lyon".to_string());
    person.profession = Some("Baker".to_string());
    person.education = Some("Apprenticeship".to_string());
    person.health_issues = Some("Diabetes".to_string());
    repo.upsert_person(GROUP, Origin::Ancestor, &person).unwrap();

    let record = repo.get_person(GROUP, "gm").unwrap().unwrap();
    assert_eq!(record.group_id, GROUP);
    assert_eq!(record.origin, Origin::Ancestor);
    assert_eq!(record.person, person);
    assert!(record.created_at > 0);
}

#[test]
fn free_form_roles_survive_storage() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = Person::with_id("x", "Pat", RelationRole::from_label("Godmother"));
    repo.upsert_person(GROUP, Origin::Member, &person).unwrap();

    let record = repo.get_person(GROUP, "x").unwrap().unwrap();
    assert_eq!(record.person.role, RelationRole::Other("Godmother".to_string()));
}

#[test]
fn upsert_replaces_existing_record_and_keeps_order() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let first = Person::with_id("a", "Alice", RelationRole::Mother);
    let second = Person::with_id("b", "Bob", RelationRole::Father);
    repo.upsert_person(GROUP, Origin::Member, &first).unwrap();
    repo.upsert_person(GROUP, Origin::Member, &second).unwrap();

    let mut renamed = first.clone();
    renamed.name = "Alicia".to_string();
    repo.upsert_person(GROUP, Origin::Ancestor, &renamed).unwrap();

    let records = repo.list_persons(&PersonListQuery::group(GROUP)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].person.name, "Alicia");
    assert_eq!(records[0].origin, Origin::Ancestor);
    assert_eq!(records[1].person.id, "b");
}

#[test]
fn upsert_rejects_invalid_person() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let blank = Person::with_id("a", "   ", RelationRole::Mother);
    let err = repo.upsert_person(GROUP, Origin::Member, &blank).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(PersonValidationError::BlankName)
    ));
}

#[test]
fn groups_are_isolated() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = Person::with_id("same", "Same Id", RelationRole::Sibling);
    repo.upsert_person("g1", Origin::Member, &person).unwrap();
    repo.upsert_person("g2", Origin::Member, &person).unwrap();

    assert_eq!(repo.list_persons(&PersonListQuery::group("g1")).unwrap().len(), 1);
    repo.delete_person("g1", "same").unwrap();
    assert!(repo.get_person("g1", "same").unwrap().is_none());
    assert!(repo.get_person("g2", "same").unwrap().is_some());
}

#[test]
fn list_filters_by_origin_and_name() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    repo.upsert_person(
        GROUP,
        Origin::Ancestor,
        &Person::with_id("1", "Johann Weber", RelationRole::GreatGrandfather),
    )
    .unwrap();
    repo.upsert_person(
        GROUP,
        Origin::Member,
        &Person::with_id("2", "Anna Weber", RelationRole::SelfPerson),
    )
    .unwrap();
    repo.upsert_person(
        GROUP,
        Origin::Member,
        &Person::with_id("3", "Leo Kim", RelationRole::Spouse),
    )
    .unwrap();

    let members = repo
        .list_persons(&PersonListQuery {
            origin: Some(Origin::Member),
            ..PersonListQuery::group(GROUP)
        })
        .unwrap();
    assert_eq!(members.len(), 2);

    let webers = repo
        .list_persons(&PersonListQuery {
            name_contains: Some("weBER".to_string()),
            ..PersonListQuery::group(GROUP)
        })
        .unwrap();
    let ids: Vec<_> = webers.iter().map(|record| record.person.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn list_supports_limit_and_offset() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    for index in 0..5 {
        let person = Person::with_id(format!("p{index}"), format!("P{index}"), RelationRole::Cousin);
        repo.upsert_person(GROUP, Origin::Member, &person).unwrap();
    }

    let page = repo
        .list_persons(&PersonListQuery {
            limit: Some(2),
            offset: 1,
            ..PersonListQuery::group(GROUP)
        })
        .unwrap();
    let ids: Vec<_> = page.iter().map(|record| record.person.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);

    let tail = repo
        .list_persons(&PersonListQuery {
            offset: 3,
            ..PersonListQuery::group(GROUP)
        })
        .unwrap();
    assert_eq!(tail.len(), 2);
}

#[test]
fn batch_upsert_writes_nothing_when_any_record_is_invalid() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let good = Person::with_id("a", "Alice", RelationRole::Mother);
    let bad = Person::with_id("b", " ", RelationRole::Father);
    let err = repo
        .upsert_persons(GROUP, &[(Origin::Member, &good), (Origin::Member, &bad)])
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(repo.get_person(GROUP, "a").unwrap().is_none());

    let second = Person::with_id("c", "Carl", RelationRole::Father);
    repo.upsert_persons(GROUP, &[(Origin::Member, &good), (Origin::Ancestor, &second)])
        .unwrap();
    assert_eq!(repo.list_persons(&PersonListQuery::group(GROUP)).unwrap().len(), 2);
    assert_eq!(
        repo.get_person(GROUP, "c").unwrap().unwrap().origin,
        Origin::Ancestor
    );
}

#[test]
fn delete_missing_person_returns_not_found() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo.delete_person(GROUP, "ghost").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { ref id, .. } if id == "ghost"));
}

#[test]
fn load_snapshot_splits_by_origin_in_insertion_order() {
    let conn = setup();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    repo.upsert_person(GROUP, Origin::Member, &Person::with_id("m1", "M1", RelationRole::SelfPerson))
        .unwrap();
    repo.upsert_person(GROUP, Origin::Ancestor, &Person::with_id("a1", "A1", RelationRole::Grandfather))
        .unwrap();
    repo.upsert_person(GROUP, Origin::Member, &Person::with_id("m2", "M2", RelationRole::Son))
        .unwrap();

    let snapshot = repo.load_snapshot(GROUP).unwrap();
    assert_eq!(snapshot.ancestors.len(), 1);
    assert_eq!(snapshot.ancestors[0].id, "a1");
    let member_ids: Vec<_> = snapshot.members.iter().map(|person| person.id.as_str()).collect();
    assert_eq!(member_ids, vec!["m1", "m2"]);
}

#[test]
fn read_rejects_invalid_persisted_enum() {
    let conn = setup();
    conn.execute(
        "INSERT INTO persons (group_id, id, origin, name, gender) VALUES (?1, 'bad', 'member', 'Bad', 'unknown');",
        [GROUP],
    )
    .unwrap();
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;").unwrap();
    conn.execute(
        "UPDATE persons SET origin = 'alien' WHERE id = 'bad';",
        [],
    )
    .unwrap();

    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let err = repo.get_person(GROUP, "bad").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqlitePersonRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}
