//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose family layout and person editing use-cases to Dart via FRB.
//! - Hand layouts over as JSON so the renderer owns its own graph types.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported through `ok = false` plus a message.

use lifetree_core::db::open_db;
use lifetree_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, layout_family,
    ping as ping_inner, FamilyGraph, FamilyService, FamilyServiceResult, FamilySnapshot,
    LayoutConfig, Origin, Person, SqlitePersonRepository,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const FAMILY_DB_FILE_NAME: &str = "lifetree_family.sqlite3";
static FAMILY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Layout response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResponse {
    /// Whether layout succeeded.
    pub ok: bool,
    /// Serialized `FamilyGraph` (camelCase JSON); empty on failure.
    pub graph_json: String,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    pub node_count: u32,
    pub edge_count: u32,
}

impl LayoutResponse {
    fn from_graph(graph: &FamilyGraph) -> Self {
        let graph_json = match serde_json::to_string(graph) {
            Ok(json) => json,
            Err(err) => return Self::failure(format!("graph serialization failed: {err}")),
        };
        let message = if graph.diagnostics.is_clean() {
            format!("Laid out {} person(s).", graph.nodes.len())
        } else {
            format!(
                "Laid out {} person(s) with {} unresolved reference(s).",
                graph.nodes.len(),
                graph.diagnostics.unresolved.len()
            )
        };
        Self {
            ok: true,
            graph_json,
            message,
            node_count: saturating_u32(graph.nodes.len()),
            edge_count: saturating_u32(graph.edges.len()),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            graph_json: String::new(),
            message: message.into(),
            node_count: 0,
            edge_count: 0,
        }
    }
}

/// Generic action response envelope for person edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the affected person.
    pub person_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PersonActionResponse {
    fn success(message: impl Into<String>, person_id: String) -> Self {
        Self {
            ok: true,
            person_id: Some(person_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            person_id: None,
            message: message.into(),
        }
    }
}

/// Lays out a snapshot delivered as JSON (`{"ancestors": [...], "members": [...]}`).
///
/// `config_json` may be partial; missing fields use defaults.
///
/// # FFI contract
/// - Sync call, pure computation (no DB access).
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn family_layout_json(snapshot_json: String, config_json: Option<String>) -> LayoutResponse {
    let config = match parse_config(config_json) {
        Ok(config) => config,
        Err(message) => return LayoutResponse::failure(message),
    };
    let snapshot: FamilySnapshot = match serde_json::from_str(&snapshot_json) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("event=family_layout module=ffi status=error reason=invalid_snapshot");
            return LayoutResponse::failure(format!("family_layout_json failed: {err}"));
        }
    };
    LayoutResponse::from_graph(&layout_family(&snapshot, &config))
}

/// Inserts or replaces one person of a stored family group.
///
/// Input semantics:
/// - `origin`: `ancestor|member`.
/// - `person_json`: one person document (camelCase fields). An empty `id`
///   gets a generated one.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn family_upsert_person(
    group_id: String,
    origin: String,
    person_json: String,
) -> PersonActionResponse {
    let origin = match parse_origin(&origin) {
        Ok(origin) => origin,
        Err(message) => return PersonActionResponse::failure(message),
    };
    let mut person: Person = match serde_json::from_str(&person_json) {
        Ok(person) => person,
        Err(err) => {
            return PersonActionResponse::failure(format!("family_upsert_person failed: {err}"))
        }
    };
    if person.id.trim().is_empty() {
        person.id = Person::new(person.name.clone(), person.role.clone()).id;
    }

    let result = with_family_service(|service| match origin {
        Origin::Ancestor => service.add_ancestor(&group_id, &person),
        Origin::Member => service.add_member(&group_id, &person),
    });
    match result {
        Ok(person_id) => PersonActionResponse::success("Person saved.", person_id),
        Err(err) => PersonActionResponse::failure(format!("family_upsert_person failed: {err}")),
    }
}

/// Links two stored persons as spouses on both sides.
#[flutter_rust_bridge::frb(sync)]
pub fn family_link_spouses(group_id: String, a: String, b: String) -> PersonActionResponse {
    match with_family_service(|service| service.link_spouses(&group_id, a.trim(), b.trim())) {
        Ok(()) => PersonActionResponse::success("Spouses linked.", a.trim().to_string()),
        Err(err) => PersonActionResponse::failure(format!("family_link_spouses failed: {err}")),
    }
}

/// Records `parent_id` as father or mother of `child_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn family_link_parent(
    group_id: String,
    child_id: String,
    parent_id: String,
) -> PersonActionResponse {
    let child_id = child_id.trim().to_string();
    match with_family_service(|service| {
        service.link_parent(&group_id, &child_id, parent_id.trim())
    }) {
        Ok(()) => PersonActionResponse::success("Parent linked.", child_id),
        Err(err) => PersonActionResponse::failure(format!("family_link_parent failed: {err}")),
    }
}

/// Deletes one stored person. References to it elsewhere stay dangling.
#[flutter_rust_bridge::frb(sync)]
pub fn family_remove_person(group_id: String, person_id: String) -> PersonActionResponse {
    let person_id = person_id.trim().to_string();
    match with_family_service(|service| service.remove_person(&group_id, &person_id)) {
        Ok(()) => PersonActionResponse::success("Person removed.", person_id),
        Err(err) => PersonActionResponse::failure(format!("family_remove_person failed: {err}")),
    }
}

/// Lays out a stored family group.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn family_group_layout(group_id: String, config_json: Option<String>) -> LayoutResponse {
    let config = match parse_config(config_json) {
        Ok(config) => config,
        Err(message) => return LayoutResponse::failure(message),
    };
    match with_family_service(|service| service.build_layout(&group_id, &config)) {
        Ok(graph) => LayoutResponse::from_graph(&graph),
        Err(err) => LayoutResponse::failure(format!("family_group_layout failed: {err}")),
    }
}

fn parse_config(config_json: Option<String>) -> Result<LayoutConfig, String> {
    match config_json.as_deref().map(str::trim) {
        None | Some("") => Ok(LayoutConfig::default()),
        Some(raw) => {
            serde_json::from_str(raw).map_err(|err| format!("invalid layout config: {err}"))
        }
    }
}

fn parse_origin(raw: &str) -> Result<Origin, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "ancestor" => Ok(Origin::Ancestor),
        "member" => Ok(Origin::Member),
        other => Err(format!(
            "unsupported origin `{other}`; expected ancestor|member"
        )),
    }
}

fn resolve_family_db_path() -> PathBuf {
    FAMILY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("LIFETREE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(FAMILY_DB_FILE_NAME)
        })
        .clone()
}

fn with_family_service<T>(
    f: impl FnOnce(&FamilyService<SqlitePersonRepository<'_>>) -> FamilyServiceResult<T>,
) -> Result<T, String> {
    let db_path = resolve_family_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("family DB open failed: {err}"))?;
    let repo = SqlitePersonRepository::try_new(&conn)
        .map_err(|err| format!("family repo init failed: {err}"))?;
    let service = FamilyService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, family_group_layout, family_layout_json, family_link_parent,
        family_link_spouses, family_remove_person, family_upsert_person, init_logging, ping,
    };
    use lifetree_core::db::open_db;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn layout_json_builds_parent_edge() {
        let snapshot = r#"{
            "ancestors": [{"id":"a","name":"Al","role":"Father","birthDate":"1960-01-01"}],
            "members": [{"id":"b","name":"Bo","role":"Son","birthDate":"1990-01-01","fatherId":"a"}]
        }"#;

        let response = family_layout_json(snapshot.to_string(), None);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.node_count, 2);
        assert_eq!(response.edge_count, 1);

        let graph: serde_json::Value = serde_json::from_str(&response.graph_json).unwrap();
        assert_eq!(graph["edges"][0]["id"], "father-0-1");
    }

    #[test]
    fn layout_json_reports_dangling_spouse_in_message() {
        let snapshot = r#"{"members":[{"id":"x","name":"X","role":"Spouse","spouseId":"ghost"}]}"#;

        let response = family_layout_json(snapshot.to_string(), Some("  ".to_string()));
        assert!(response.ok);
        assert_eq!(response.edge_count, 0);
        assert!(response.message.contains("1 unresolved"));
    }

    #[test]
    fn layout_json_rejects_invalid_input() {
        let bad_snapshot = family_layout_json("not json".to_string(), None);
        assert!(!bad_snapshot.ok);
        assert!(bad_snapshot.graph_json.is_empty());

        let bad_config =
            family_layout_json("{}".to_string(), Some(r#"{"strategy":"coin_flip"}"#.to_string()));
        assert!(!bad_config.ok);
        assert!(bad_config.message.contains("layout config"));
    }

    #[test]
    fn layout_json_survives_extreme_anchor_year() {
        let snapshot = r#"{"members":[{"id":"a","name":"A","birthDate":"1960"}]}"#;
        let config = r#"{"anchorYear":-2147483648}"#;

        let response = family_layout_json(snapshot.to_string(), Some(config.to_string()));
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.node_count, 1);
    }

    #[test]
    fn stored_group_round_trip_through_layout() {
        let group = unique_token("ffi-group");
        for (origin, person) in [
            ("ancestor", r#"{"id":"gf","name":"Grandpa","role":"Grandfather"}"#),
            ("ancestor", r#"{"id":"gm","name":"Grandma","role":"Grandmother"}"#),
            ("member", r#"{"id":"mum","name":"Mum","role":"Mother"}"#),
        ] {
            let saved = family_upsert_person(group.clone(), origin.to_string(), person.to_string());
            assert!(saved.ok, "{}", saved.message);
        }

        assert!(family_link_spouses(group.clone(), "gf".into(), "gm".into()).ok);
        assert!(family_link_parent(group.clone(), "mum".into(), "gm".into()).ok);

        let layout = family_group_layout(group.clone(), None);
        assert!(layout.ok, "{}", layout.message);
        assert_eq!(layout.node_count, 3);
        assert_eq!(layout.edge_count, 2);

        let removed = family_remove_person(group.clone(), "gm".into());
        assert!(removed.ok, "{}", removed.message);
        let after = family_group_layout(group, None);
        assert_eq!(after.node_count, 2);
        assert_eq!(after.edge_count, 0);
    }

    #[test]
    fn upsert_generates_id_when_missing() {
        let group = unique_token("ffi-generated");
        let response = family_upsert_person(
            group.clone(),
            "Member".to_string(),
            r#"{"id":"","name":"Kim","role":"Sister"}"#.to_string(),
        );
        assert!(response.ok, "{}", response.message);
        let person_id = response.person_id.expect("upsert should return person_id");

        let conn = open_db(super::resolve_family_db_path()).expect("open db");
        let (origin, role): (String, String) = conn
            .query_row(
                "SELECT origin, role FROM persons WHERE group_id = ?1 AND id = ?2",
                [group.as_str(), person_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("query person row");
        assert_eq!(origin, "member");
        assert_eq!(role, "Sister");
    }

    #[test]
    fn edits_report_failures_without_panicking() {
        let group = unique_token("ffi-failures");

        let bad_origin = family_upsert_person(
            group.clone(),
            "stranger".to_string(),
            r#"{"id":"a","name":"A"}"#.to_string(),
        );
        assert!(!bad_origin.ok);
        assert!(bad_origin.message.contains("origin"));

        let missing = family_link_spouses(group.clone(), "a".into(), "b".into());
        assert!(!missing.ok);
        assert_eq!(missing.person_id, None);

        let blank_group = family_remove_person("  ".to_string(), "a".into());
        assert!(!blank_group.ok);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
