use lifetree_core::{
    Gender, LifeStatus, Person, PersonValidationError, ReferenceField, RelationRole,
};

#[test]
fn person_new_generates_uuid_id_and_empty_links() {
    let person = Person::new("Ada", RelationRole::Mother);

    assert!(uuid::Uuid::parse_str(&person.id).is_ok());
    assert_eq!(person.name, "Ada");
    assert_eq!(person.father_id, None);
    assert_eq!(person.mother_id, None);
    assert_eq!(person.spouse_id, None);
    assert!(person.validate().is_ok());
}

#[test]
fn validate_rejects_blank_id_and_name() {
    let blank_id = Person::with_id("  ", "Ada", RelationRole::Mother);
    assert_eq!(blank_id.validate(), Err(PersonValidationError::EmptyId));

    let blank_name = Person::with_id("p1", " ", RelationRole::Mother);
    assert_eq!(blank_name.validate(), Err(PersonValidationError::BlankName));
}

#[test]
fn validate_rejects_self_references() {
    let mut person = Person::with_id("p1", "Ada", RelationRole::Mother);
    person.spouse_id = Some("p1".to_string());

    assert_eq!(
        person.validate(),
        Err(PersonValidationError::SelfReference {
            field: ReferenceField::Spouse
        })
    );
}

#[test]
fn validate_rejects_identical_parents() {
    let mut person = Person::with_id("c", "Child", RelationRole::Son);
    person.father_id = Some("p".to_string());
    person.mother_id = Some("p".to_string());

    assert_eq!(
        person.validate(),
        Err(PersonValidationError::ParentsIdentical)
    );
}

#[test]
fn validate_rejects_death_before_birth() {
    let mut person = Person::with_id("g", "Grandpa", RelationRole::Grandfather);
    person.birth_date = Some("1920-04-01".to_string());
    person.death_date = Some("1910".to_string());

    assert_eq!(
        person.validate(),
        Err(PersonValidationError::DeathBeforeBirth {
            birth_year: 1920,
            death_year: 1910
        })
    );
}

#[test]
fn dangling_references_are_valid() {
    let mut person = Person::with_id("c", "Child", RelationRole::Daughter);
    person.father_id = Some("nobody".to_string());

    assert!(person.validate().is_ok());
}

#[test]
fn effective_gender_prefers_explicit_value() {
    let mut person = Person::with_id("p", "Sam", RelationRole::Child);
    assert_eq!(person.effective_gender(), Gender::Unknown);

    person.role = RelationRole::Daughter;
    assert_eq!(person.effective_gender(), Gender::Female);

    person.gender = Some(Gender::Male);
    assert_eq!(person.effective_gender(), Gender::Male);

    person.gender = Some(Gender::Unknown);
    assert_eq!(person.effective_gender(), Gender::Female);
}

#[test]
fn living_state_follows_status_then_death_date() {
    let mut person = Person::with_id("p", "Sam", RelationRole::Uncle);
    assert!(person.is_living());

    person.death_date = Some("2001".to_string());
    assert!(!person.is_living());

    person.status = Some(LifeStatus::Living);
    assert!(person.is_living());
}

#[test]
fn life_span_label_uses_available_years() {
    let mut person = Person::with_id("p", "Sam", RelationRole::Uncle);
    assert_eq!(person.life_span_label(), None);

    person.birth_date = Some("1931-02-03".to_string());
    assert_eq!(person.life_span_label().as_deref(), Some("b. 1931"));

    person.death_date = Some("c. 1999".to_string());
    assert_eq!(person.life_span_label().as_deref(), Some("1931 - 1999"));
}

#[test]
fn serialization_uses_document_store_field_names() {
    let mut person = Person::with_id("b", "Ben", RelationRole::Son);
    person.birth_date = Some("1990-01-01".to_string());
    person.father_id = Some("a".to_string());
    person.status = Some(LifeStatus::Living);
    person.health_issues = Some("asthma".to_string());

    let json = serde_json::to_value(&person).unwrap();
    assert_eq!(json["id"], "b");
    assert_eq!(json["role"], "Son");
    assert_eq!(json["birthDate"], "1990-01-01");
    assert_eq!(json["fatherId"], "a");
    assert_eq!(json["status"], "Living");
    assert_eq!(json["healthIssues"], "asthma");
    assert!(json.get("motherId").is_none());

    let decoded: Person = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, person);
}

#[test]
fn deserialization_maps_legacy_role_labels() {
    let person: Person = serde_json::from_str(
        r#"{"id":"g","name":"Nana","role":"grandma","spouseId":"h"}"#,
    )
    .unwrap();

    assert_eq!(person.role, RelationRole::Grandmother);
    assert_eq!(person.spouse_id.as_deref(), Some("h"));

    let free_form: Person =
        serde_json::from_str(r#"{"id":"x","name":"Pat","role":"Family friend"}"#).unwrap();
    assert_eq!(
        free_form.role,
        RelationRole::Other("Family friend".to_string())
    );
}

#[test]
fn deserialization_tolerates_missing_role() {
    let person: Person = serde_json::from_str(r#"{"id":"x","name":"Pat"}"#).unwrap();
    assert!(person.role.is_other());
    assert_eq!(person.role.generation_offset(), None);

    let null_role: Person =
        serde_json::from_str(r#"{"id":"y","name":"Sam","role":null}"#).unwrap();
    assert_eq!(null_role.role, RelationRole::default());
    assert_eq!(null_role.effective_gender(), Gender::Unknown);
}
