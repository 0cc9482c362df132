use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Schemas that are implied when a table name is written unqualified.
const DEFAULT_SCHEMAS: &[&str] = &["", "public", "main"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbColumn {
  pub name: String,
  pub data_type: String,
  pub is_nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbTable {
  pub schema: String,
  pub name: String,
  pub columns: Vec<DbColumn>,
}

impl DbTable {
  pub fn qualified_name(&self) -> String {
    if DEFAULT_SCHEMAS.contains(&self.schema.as_str()) {
      self.name.clone()
    } else {
      format!("{}.{}", self.schema, self.name)
    }
  }
}

/// Renders the schema snapshot handed to the model: one block per table, one
/// indented line per column, blocks separated by a blank line.
pub fn render_schema(tables: &[DbTable]) -> String {
  let mut out = String::new();
  for (i, table) in tables.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    let _ = writeln!(out, "Table: {}", table.qualified_name());
    for column in &table.columns {
      let _ = writeln!(out, "  {} {}", column.name, column.data_type);
    }
  }
  out
}
