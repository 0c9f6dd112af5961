//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store ancestor and member records per owning group.
//! - Load whole family snapshots for the layout engine.
//!
//! # Invariants
//! - `(group_id, id)` is unique; writing an existing pair replaces it.
//! - Listing order is insertion order (`seq ASC, id ASC`) and stable across
//!   updates.
//! - Relationship columns are stored verbatim; they are never checked
//!   against other rows.
//! - Batch writes commit all records or none.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::person::{LifeStatus, Origin, Person, PersonId, PersonValidationError};
use crate::model::role::{Gender, RelationRole};
use crate::model::snapshot::FamilySnapshot;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PERSON_SELECT_SQL: &str = "SELECT
    group_id,
    id,
    origin,
    name,
    role,
    gender,
    birth_date,
    death_date,
    father_id,
    mother_id,
    spouse_id,
    status,
    biography,
    profession,
    education,
    health_issues,
    created_at,
    updated_at
FROM persons";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound { group_id: String, id: PersonId },
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { group_id, id } => {
                write!(f, "person not found: {id} in group {group_id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "person repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Stored person plus storage metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub group_id: String,
    pub origin: Origin,
    pub person: Person,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

/// Query options for listing persons of one group.
#[derive(Debug, Clone, Default)]
pub struct PersonListQuery {
    pub group_id: String,
    pub origin: Option<Origin>,
    /// Case-insensitive substring match on `name`.
    pub name_contains: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PersonListQuery {
    /// Every person of one group.
    pub fn group(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            ..Self::default()
        }
    }
}

/// Repository interface for person records.
pub trait PersonRepository {
    /// Inserts or replaces one person; origin may change on replace.
    fn upsert_person(&self, group_id: &str, origin: Origin, person: &Person) -> RepoResult<()>;
    /// Upserts several persons in one transaction.
    fn upsert_persons(&self, group_id: &str, records: &[(Origin, &Person)]) -> RepoResult<()>;
    fn get_person(&self, group_id: &str, id: &str) -> RepoResult<Option<PersonRecord>>;
    fn list_persons(&self, query: &PersonListQuery) -> RepoResult<Vec<PersonRecord>>;
    /// Hard-deletes one person. References held by others are left alone.
    fn delete_person(&self, group_id: &str, id: &str) -> RepoResult<()>;

    /// Loads every person of a group, split by origin.
    fn load_snapshot(&self, group_id: &str) -> RepoResult<FamilySnapshot> {
        let mut snapshot = FamilySnapshot::default();
        for record in self.list_persons(&PersonListQuery::group(group_id))? {
            snapshot.push(record.origin, record.person);
        }
        Ok(snapshot)
    }
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn upsert_person(&self, group_id: &str, origin: Origin, person: &Person) -> RepoResult<()> {
        person.validate()?;
        write_person(self.conn, group_id, origin, person)
    }

    fn upsert_persons(&self, group_id: &str, records: &[(Origin, &Person)]) -> RepoResult<()> {
        for (_, person) in records {
            person.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (origin, person) in records {
            write_person(&tx, group_id, *origin, person)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_person(&self, group_id: &str, id: &str) -> RepoResult<Option<PersonRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE group_id = ?1
               AND id = ?2;"
        ))?;

        let mut rows = stmt.query(params![group_id, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn list_persons(&self, query: &PersonListQuery) -> RepoResult<Vec<PersonRecord>> {
        let mut sql = format!("{PERSON_SELECT_SQL} WHERE group_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(query.group_id.clone())];

        if let Some(origin) = query.origin {
            sql.push_str(" AND origin = ?");
            bind_values.push(Value::Text(origin_to_db(origin).to_string()));
        }

        if let Some(needle) = query
            .name_contains
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
        {
            sql.push_str(" AND instr(lower(name), lower(?)) > 0");
            bind_values.push(Value::Text(needle.to_string()));
        }

        sql.push_str(" ORDER BY seq ASC, id ASC");

        match (query.limit, query.offset) {
            (Some(limit), 0) => {
                sql.push_str(" LIMIT ?");
                bind_values.push(Value::Integer(i64::from(limit)));
            }
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_person_row(row)?);
        }

        Ok(records)
    }

    fn delete_person(&self, group_id: &str, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM persons WHERE group_id = ?1 AND id = ?2;",
            params![group_id, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                group_id: group_id.to_string(),
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

fn write_person(conn: &Connection, group_id: &str, origin: Origin, person: &Person) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO persons (
            group_id,
            id,
            origin,
            name,
            role,
            gender,
            birth_date,
            death_date,
            father_id,
            mother_id,
            spouse_id,
            status,
            biography,
            profession,
            education,
            health_issues,
            seq
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
            (SELECT COALESCE(MAX(seq), 0) + 1 FROM persons)
        )
        ON CONFLICT (group_id, id) DO UPDATE SET
            origin = excluded.origin,
            name = excluded.name,
            role = excluded.role,
            gender = excluded.gender,
            birth_date = excluded.birth_date,
            death_date = excluded.death_date,
            father_id = excluded.father_id,
            mother_id = excluded.mother_id,
            spouse_id = excluded.spouse_id,
            status = excluded.status,
            biography = excluded.biography,
            profession = excluded.profession,
            education = excluded.education,
            health_issues = excluded.health_issues,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            group_id,
            person.id.as_str(),
            origin_to_db(origin),
            person.name.as_str(),
            person.role.label(),
            person.gender.map(gender_to_db),
            person.birth_date.as_deref(),
            person.death_date.as_deref(),
            person.father_id.as_deref(),
            person.mother_id.as_deref(),
            person.spouse_id.as_deref(),
            person.status.map(status_to_db),
            person.biography.as_deref(),
            person.profession.as_deref(),
            person.education.as_deref(),
            person.health_issues.as_deref(),
        ],
    )?;
    Ok(())
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<PersonRecord> {
    let origin_text: String = row.get("origin")?;
    let origin = parse_origin(&origin_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid origin `{origin_text}` in persons.origin"))
    })?;

    let gender = match row.get::<_, Option<String>>("gender")? {
        Some(value) => Some(parse_gender(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid gender `{value}` in persons.gender"))
        })?),
        None => None,
    };

    let status = match row.get::<_, Option<String>>("status")? {
        Some(value) => Some(parse_status(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid status `{value}` in persons.status"))
        })?),
        None => None,
    };

    let role_label: String = row.get("role")?;
    let person = Person {
        id: row.get("id")?,
        name: row.get("name")?,
        role: RelationRole::from_label(&role_label),
        gender,
        birth_date: row.get("birth_date")?,
        death_date: row.get("death_date")?,
        father_id: row.get("father_id")?,
        mother_id: row.get("mother_id")?,
        spouse_id: row.get("spouse_id")?,
        status,
        biography: row.get("biography")?,
        profession: row.get("profession")?,
        education: row.get("education")?,
        health_issues: row.get("health_issues")?,
    };
    person.validate()?;

    Ok(PersonRecord {
        group_id: row.get("group_id")?,
        origin,
        person,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn origin_to_db(origin: Origin) -> &'static str {
    match origin {
        Origin::Ancestor => "ancestor",
        Origin::Member => "member",
    }
}

fn parse_origin(value: &str) -> Option<Origin> {
    match value {
        "ancestor" => Some(Origin::Ancestor),
        "member" => Some(Origin::Member),
        _ => None,
    }
}

fn gender_to_db(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Unknown => "unknown",
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        "unknown" => Some(Gender::Unknown),
        _ => None,
    }
}

fn status_to_db(status: LifeStatus) -> &'static str {
    match status {
        LifeStatus::Living => "living",
        LifeStatus::Deceased => "deceased",
    }
}

fn parse_status(value: &str) -> Option<LifeStatus> {
    match value {
        "living" => Some(LifeStatus::Living),
        "deceased" => Some(LifeStatus::Deceased),
        _ => None,
    }
}
