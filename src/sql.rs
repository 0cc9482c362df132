use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use color_eyre::eyre::{self, Result};
use serde::{Deserialize, Serialize};
use sqlx::{
  mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlRow},
  postgres::{PgConnectOptions, PgPoolOptions, PgRow},
  sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
  types::Uuid,
  Column, Row,
};
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::schema::{DbColumn, DbTable};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
  /// MySQL and MariaDB
  #[default]
  MySql,
  Postgres,
  Sqlite,
}

impl Backend {
  pub fn default_port(&self) -> u16 {
    match self {
      Self::MySql => 3306,
      Self::Postgres => 5432,
      Self::Sqlite => 0,
    }
  }

  pub fn next(&self) -> Self {
    match self {
      Self::MySql => Self::Postgres,
      Self::Postgres => Self::Sqlite,
      Self::Sqlite => Self::MySql,
    }
  }

  pub fn previous(&self) -> Self {
    match self {
      Self::MySql => Self::Sqlite,
      Self::Postgres => Self::MySql,
      Self::Sqlite => Self::Postgres,
    }
  }
}

/// Everything needed to open the session's connection. For SQLite `database`
/// is the path of the database file and the network fields are ignored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionDescriptor {
  pub backend: Backend,
  pub host: String,
  pub port: u16,
  pub username: String,
  pub password: String,
  pub database: String,
}

impl Default for ConnectionDescriptor {
  fn default() -> Self {
    Self {
      backend: Backend::MySql,
      host: "localhost".to_string(),
      port: Backend::MySql.default_port(),
      username: "root".to_string(),
      password: String::new(),
      database: String::new(),
    }
  }
}

impl ConnectionDescriptor {
  pub fn sqlite(path: impl Into<String>) -> Self {
    Self { backend: Backend::Sqlite, database: path.into(), ..Self::default() }
  }
}

// Never print the password: descriptors travel through actions and logs.
impl fmt::Debug for ConnectionDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConnectionDescriptor")
      .field("backend", &self.backend)
      .field("host", &self.host)
      .field("port", &self.port)
      .field("username", &self.username)
      .field("password", &if self.password.is_empty() { "" } else { "***" })
      .field("database", &self.database)
      .finish()
  }
}

impl fmt::Display for ConnectionDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.backend {
      Backend::Sqlite => write!(f, "sqlite:{}", self.database),
      backend => write!(f, "{}://{}@{}:{}/{}", backend, self.username, self.host, self.port, self.database),
    }
  }
}

/// Stringified result of an executed statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRows {
  pub headers: Vec<String>,
  pub rows: Vec<Vec<String>>,
}

impl QueryRows {
  pub fn row_count(&self) -> usize {
    self.rows.len()
  }

  /// Tuple-list rendering used inside prompts: `[(1, AC/DC), (2, Accept)]`.
  pub fn render(&self) -> String {
    let rows: Vec<String> = self.rows.iter().map(|row| format!("({})", row.join(", "))).collect();
    format!("[{}]", rows.join(", "))
  }
}

#[async_trait]
pub trait Queryer: Send + Sync {
  fn backend(&self) -> Backend;
  async fn load_tables(&self) -> Result<Vec<DbTable>>;
  async fn load_table_columns(&self, table_name: &str, schema: &str) -> Result<Vec<DbColumn>>;
  async fn run(&self, query: &str) -> Result<QueryRows>;

  /// Tables with their columns filled in, always read fresh from the database.
  async fn table_info(&self) -> Result<Vec<DbTable>> {
    let mut tables = self.load_tables().await?;
    for table in tables.iter_mut() {
      table.columns = self.load_table_columns(&table.name, &table.schema).await?;
    }
    Ok(tables)
  }
}

/// Opens the single connection a chat session works against.
pub async fn connect(descriptor: &ConnectionDescriptor) -> Result<Arc<dyn Queryer>> {
  info!("Connecting to {descriptor}");
  let conn: Arc<dyn Queryer> = match descriptor.backend {
    Backend::MySql => Arc::new(MySql::new(descriptor).await?),
    Backend::Postgres => Arc::new(Postgres::new(descriptor).await?),
    Backend::Sqlite => Arc::new(Sqlite::new(&descriptor.database).await?),
  };
  Ok(conn)
}

pub struct MySql {
  pool: sqlx::MySqlPool,
}

impl MySql {
  pub async fn new(descriptor: &ConnectionDescriptor) -> Result<Self> {
    let mut options = MySqlConnectOptions::new()
      .host(&descriptor.host)
      .port(descriptor.port)
      .username(&descriptor.username)
      .password(&descriptor.password);
    if !descriptor.database.is_empty() {
      options = options.database(&descriptor.database);
    }

    let pool = MySqlPoolOptions::new()
      .max_connections(1)
      .connect_with(options)
      .await
      .map_err(|e| eyre::eyre!("Failed to connect to MySQL: {}", e))?;

    Ok(Self { pool })
  }
}

#[async_trait]
impl Queryer for MySql {
  fn backend(&self) -> Backend {
    Backend::MySql
  }

  async fn load_tables(&self) -> Result<Vec<DbTable>> {
    // Text protocol: SHOW/DESCRIBE are not reliably preparable across MySQL and MariaDB
    let rows = sqlx::raw_sql("SHOW TABLES").fetch_all(&self.pool).await?;

    let mut tables: Vec<DbTable> = rows
      .iter()
      .filter_map(|row| mysql_text(row, 0))
      .map(|name| DbTable { schema: String::new(), name, columns: Vec::new() })
      .collect();

    tables.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tables)
  }

  async fn load_table_columns(&self, table_name: &str, _schema: &str) -> Result<Vec<DbColumn>> {
    let describe = format!("DESCRIBE `{}`", table_name.replace('`', "``"));
    let rows = sqlx::raw_sql(&describe).fetch_all(&self.pool).await?;

    let columns = rows
      .iter()
      .filter_map(|row| {
        let name = mysql_text(row, 0)?;
        let data_type = mysql_text(row, 1)?;
        let is_nullable = mysql_text(row, 2).is_some_and(|n| n == "YES");
        Some(DbColumn { name, data_type, is_nullable })
      })
      .collect();

    Ok(columns)
  }

  async fn run(&self, query: &str) -> Result<QueryRows> {
    let rows = sqlx::raw_sql(query).fetch_all(&self.pool).await?;
    debug!("MySQL returned {} rows", rows.len());
    Ok(collect_rows(&rows, get_mysql_value))
  }
}

pub struct Postgres {
  pool: sqlx::PgPool,
}

impl Postgres {
  pub async fn new(descriptor: &ConnectionDescriptor) -> Result<Self> {
    let mut options = PgConnectOptions::new()
      .host(&descriptor.host)
      .port(descriptor.port)
      .username(&descriptor.username)
      .password(&descriptor.password);
    if !descriptor.database.is_empty() {
      options = options.database(&descriptor.database);
    }

    let pool = PgPoolOptions::new()
      .max_connections(1)
      .connect_with(options)
      .await
      .map_err(|e| eyre::eyre!("Failed to connect to PostgreSQL: {}", e))?;

    Ok(Self { pool })
  }
}

#[async_trait]
impl Queryer for Postgres {
  fn backend(&self) -> Backend {
    Backend::Postgres
  }

  async fn load_tables(&self) -> Result<Vec<DbTable>> {
    let rows = sqlx::query(
      "SELECT table_schema::text AS table_schema, table_name::text AS table_name
       FROM information_schema.tables
       WHERE table_type = 'BASE TABLE' AND table_schema NOT IN ('pg_catalog', 'information_schema')
       ORDER BY table_schema, table_name",
    )
    .fetch_all(&self.pool)
    .await?;

    let mut tables: Vec<DbTable> = rows
      .into_iter()
      .filter_map(|row| {
        let name = row.try_get::<String, _>("table_name").ok()?;
        let schema = row.try_get::<String, _>("table_schema").ok()?;
        Some(DbTable { schema, name, columns: Vec::new() })
      })
      .collect();

    tables.sort_by_key(|t| t.qualified_name());
    Ok(tables)
  }

  async fn load_table_columns(&self, table_name: &str, schema: &str) -> Result<Vec<DbColumn>> {
    let rows = sqlx::query(
      "SELECT column_name::text AS column_name, data_type::text AS data_type, is_nullable::text AS is_nullable
       FROM information_schema.columns
       WHERE table_schema = $1 AND table_name = $2
       ORDER BY ordinal_position",
    )
    .bind(schema)
    .bind(table_name)
    .fetch_all(&self.pool)
    .await?;

    let columns = rows
      .into_iter()
      .filter_map(|row| {
        let name = row.try_get::<String, _>("column_name").ok()?;
        let data_type = row.try_get::<String, _>("data_type").ok()?;
        let is_nullable = row.try_get::<String, _>("is_nullable").ok()? == "YES";
        Some(DbColumn { name, data_type, is_nullable })
      })
      .collect();

    Ok(columns)
  }

  async fn run(&self, query: &str) -> Result<QueryRows> {
    let rows = sqlx::raw_sql(query).fetch_all(&self.pool).await?;
    debug!("PostgreSQL returned {} rows", rows.len());
    Ok(collect_rows(&rows, get_pg_value))
  }
}

pub struct Sqlite {
  conn: sqlx::SqlitePool,
}

impl Sqlite {
  pub async fn new(filename: &str) -> Result<Self> {
    let options = SqliteConnectOptions::new().filename(filename).create_if_missing(false);
    let conn = SqlitePoolOptions::new()
      .max_connections(1)
      .connect_with(options)
      .await
      .map_err(|e| eyre::eyre!("Failed to connect to Sqlite: {}", e))?;

    Ok(Self { conn })
  }
}

#[async_trait]
impl Queryer for Sqlite {
  fn backend(&self) -> Backend {
    Backend::Sqlite
  }

  async fn load_tables(&self) -> Result<Vec<DbTable>> {
    let table_query = r#"SELECT name FROM sqlite_schema WHERE type = 'table' AND name NOT LIKE 'sqlite_%'"#;
    let rows = sqlx::query(table_query).fetch_all(&self.conn).await?;

    let mut tables: Vec<DbTable> = rows
      .into_iter()
      .filter_map(|row| {
        row
          .try_get::<String, _>("name")
          .ok()
          .map(|name| DbTable { schema: "main".to_string(), name, columns: Vec::new() })
      })
      .collect();

    tables.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(tables)
  }

  async fn load_table_columns(&self, table_name: &str, _schema: &str) -> Result<Vec<DbColumn>> {
    let pragma_query = format!("PRAGMA table_info(\"{}\")", table_name.replace('"', "\"\""));
    let rows = sqlx::query(&pragma_query).fetch_all(&self.conn).await?;

    let columns: Vec<DbColumn> = rows
      .into_iter()
      .filter_map(|row| {
        let name = row.try_get::<String, _>("name").ok()?;
        let type_str = row.try_get::<String, _>("type").ok()?;
        let not_null = row.try_get::<i32, _>("notnull").ok()?;
        let is_nullable = not_null == 0; // SQLite uses 0 for nullable, 1 for not null
        Some(DbColumn { name, data_type: type_str, is_nullable })
      })
      .collect();

    Ok(columns)
  }

  async fn run(&self, query: &str) -> Result<QueryRows> {
    let rows = sqlx::raw_sql(query).fetch_all(&self.conn).await?;
    debug!("SQLite returned {} rows", rows.len());
    Ok(collect_rows(&rows, get_sqlite_value))
  }
}

fn collect_rows<R, F>(rows: &[R], value: F) -> QueryRows
where
  R: Row,
  F: Fn(&R, usize) -> Result<String>,
{
  let headers = rows
    .first()
    .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
    .unwrap_or_default();

  let rows = rows
    .iter()
    .map(|row| {
      (0..row.len())
        .map(|i| {
          value(row, i).unwrap_or_else(|e| {
            debug!("{e}");
            "<unsupported>".to_string()
          })
        })
        .collect()
    })
    .collect();

  QueryRows { headers, rows }
}

fn mysql_text(row: &MySqlRow, index: usize) -> Option<String> {
  row
    .try_get::<String, _>(index)
    .ok()
    .or_else(|| row.try_get::<Vec<u8>, _>(index).ok().map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

#[macro_export]
macro_rules! get_or_null {
  ($value:expr) => {
    $value.map_or("NULL".to_string(), |v| v.to_string())
  };
}

fn hex(values: &[u8]) -> String {
  format!("\\x{}", values.iter().map(|v| format!("{v:02x}")).collect::<String>())
}

fn get_mysql_value(row: &MySqlRow, index: usize) -> Result<String> {
  if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<u64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<rust_decimal::Decimal>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<String>, _>(index) {
    Ok(value.unwrap_or_else(|| "NULL".to_string()))
  } else if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<NaiveTime>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<serde_json::Value>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
    // MySQL reports text from some server-side expressions as binary
    Ok(value.map_or("NULL".to_string(), |bytes| String::from_utf8_lossy(&bytes).into_owned()))
  } else {
    eyre::bail!("Unknown type for column {}", row.columns()[index].name());
  }
}

fn get_sqlite_value(row: &SqliteRow, index: usize) -> Result<String> {
  if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<String>, _>(index) {
    Ok(value.unwrap_or_else(|| "NULL".to_string()))
  } else if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
    Ok(value.map_or("NULL".to_string(), |values| hex(&values)))
  } else {
    eyre::bail!("Unknown type for column {}", row.columns()[index].name());
  }
}

fn get_pg_value(row: &PgRow, index: usize) -> Result<String> {
  if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<rust_decimal::Decimal>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<String>, _>(index) {
    Ok(value.unwrap_or_else(|| "NULL".to_string()))
  } else if let Ok(value) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<NaiveTime>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<serde_json::Value>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<Vec<String>>, _>(index) {
    Ok(value.map_or("NULL".to_string(), |v| v.join(",")))
  } else if let Ok(value) = row.try_get::<Option<Uuid>, _>(index) {
    Ok(get_or_null!(value))
  } else if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
    Ok(value.map_or("NULL".to_string(), |values| hex(&values)))
  } else {
    eyre::bail!("Unknown type for column {}", row.columns()[index].name());
  }
}
