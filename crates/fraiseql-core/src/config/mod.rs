//! Engine configuration.
//!
//! The engine is configured from a TOML document describing the databases
//! it serves, the roles allowed to query them, and the per-role table
//! policies that the compiler consults when resolving ABAC filters.
//!
//! ```toml
//! [[databases]]
//! name = "main"
//! dialect = "postgres"
//! default = true
//! read_only = false
//!
//! [[databases]]
//! name = "analytics"
//! dialect = "mysql"
//! read_only = true
//!
//! [roles.anon]
//! resolve_sql = "select 'anon'"
//!
//! [roles.user.tables.orders]
//! filter = "{ user_id: { _eq: $user_id } }"
//! ```
//!
//! Values may reference environment variables with `${VAR}` syntax, expanded
//! before the TOML is parsed.

use crate::error::{Error, Result};
use fraiseql_error::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Databases the engine fans queries out to.
    pub databases: Vec<DatabaseConfig>,

    /// Per-role table policies, keyed by role name.
    pub roles: IndexMap<String, RoleConfig>,

    /// Polling interval for the subscription engine.
    pub subscriptions: SubscriptionConfig,

    /// 32-byte hex-encoded key used to encrypt opaque cursor tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_key: Option<String>,
}

/// One database the engine can route root fields to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Logical name used in schema metadata and multi-database routing.
    pub name: String,

    /// Which dialect contract implementation to render SQL through.
    pub dialect: DialectKind,

    /// Connection string. May contain `${VAR}` references.
    pub url: String,

    /// Whether root fields resolve here when a query doesn't name a database.
    pub default: bool,

    /// Mutations against a read-only database are rejected before rendering.
    pub read_only: bool,

    /// Maximum pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            dialect: DialectKind::Postgres,
            url: String::new(),
            default: false,
            read_only: false,
            max_connections: 10,
        }
    }
}

/// Supported dialect families. Only `Postgres` and `MySql` have complete
/// rendering support; other values are accepted for forward-compatible
/// configuration but the engine rejects them at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    /// Postgres-family: lateral joins, writable CTEs, `RETURNING`.
    Postgres,
    /// MySQL-family: linear scripts, session-variable id capture.
    MySql,
}

/// Per-role configuration: how to resolve the role name, and the table
/// policies the compiler enforces for that role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoleConfig {
    /// SQL expression resolving `$user_id`/session context to a role name.
    /// Only meaningful on the `anon` entry; other roles are matched
    /// directly against the resolved value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_sql: Option<String>,

    /// Per-table ABAC policy, keyed by table name.
    pub tables: IndexMap<String, TablePolicy>,
}

/// ABAC policy attached to one table for one role.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TablePolicy {
    /// GraphQL-style filter expression AND-ed onto every query against this
    /// table for the owning role, e.g. `{ user_id: { _eq: $user_id } }`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Columns hidden from selection sets for this role.
    pub hidden_columns: Vec<String>,

    /// Whether inserts are permitted.
    pub insert: bool,
    /// Whether updates are permitted.
    pub update: bool,
    /// Whether deletes are permitted.
    pub delete: bool,
}

/// Subscription polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    /// Interval between polling passes.
    pub poll_interval_ms: u64,
    /// Maximum members per polling worker slab.
    pub max_slab_size: usize,
    /// Timeout for delivering an update to a lagging subscriber.
    pub update_send_timeout_ms: u64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_slab_size: 2_000,
            update_send_timeout_ms: 250,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file, expanding `${VAR}` references
    /// against the process environment first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            Error::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string, expanding `${VAR}` references.
    pub fn from_toml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content);
        let config: Self = toml::from_str(&expanded).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants that serde can't express: at most one
    /// default database, unique database names, known dialect kinds.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.databases.is_empty() {
            errors.push(ConfigError::ValidationError {
                field: "databases".into(),
                message: "at least one database must be configured".into(),
            });
        }

        let default_count = self.databases.iter().filter(|d| d.default).count();
        if default_count > 1 {
            errors.push(ConfigError::ValidationError {
                field: "databases".into(),
                message: "only one database may be marked default".into(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for db in &self.databases {
            if !seen.insert(db.name.as_str()) {
                errors.push(ConfigError::ValidationError {
                    field: "databases".into(),
                    message: format!("duplicate database name '{}'", db.name),
                });
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(Error::Config(errors.remove(0))),
            _ => Err(Error::Config(ConfigError::MultipleErrors { errors })),
        }
    }

    /// The database marked `default = true`, or the sole configured
    /// database when there is exactly one.
    #[must_use]
    pub fn default_database(&self) -> Option<&DatabaseConfig> {
        self.databases
            .iter()
            .find(|d| d.default)
            .or_else(|| (self.databases.len() == 1).then(|| &self.databases[0]))
    }

    /// Find a configured database by name.
    #[must_use]
    pub fn database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.databases.iter().find(|d| d.name == name)
    }
}

/// Expand `${VAR}` references against the process environment. Unknown
/// variables are left untouched rather than causing a parse error; they
/// surface later as a normal TOML type mismatch or empty-string value.
fn expand_env_vars(content: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();
    let re = ENV_VAR_REGEX
        .get_or_init(|| regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

    let mut result = content.to_string();
    for cap in re.captures_iter(content) {
        let full = &cap[0];
        let name = &cap[1];
        if let Ok(value) = std::env::var(name) {
            result = result.replace(full, &value);
        }
    }
    result
}
