use clap::Parser;

use crate::{
  sql::{Backend, ConnectionDescriptor},
  utils::version,
};

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
  #[arg(short, long, value_name = "FLOAT", help = "Tick rate, i.e. number of ticks per second", default_value_t = 1.0)]
  pub tick_rate: f64,

  #[arg(
    short('r'),
    long,
    value_name = "FLOAT",
    help = "Frame rate, i.e. number of frames per second",
    default_value_t = 4.0
  )]
  pub frame_rate: f64,

  // Pre-fill the connection form
  #[arg(long, value_name = "BACKEND", help = "Database backend (mysql, postgres, sqlite)")]
  pub backend: Option<Backend>,

  #[arg(short('H'), long = "host", value_name = "HOST", help = "Database server host")]
  pub host: Option<String>,

  #[arg(short('p'), long = "port", value_name = "PORT", help = "Database server port")]
  pub port: Option<u16>,

  #[arg(short('U'), long = "username", value_name = "USERNAME", help = "Database user name")]
  pub username: Option<String>,

  #[arg(short('d'), long = "dbname", value_name = "DBNAME", help = "Database name to connect to")]
  pub dbname: Option<String>,

  #[arg(long = "password", help = "Prompt for the database password before the UI starts")]
  pub password_prompt: bool,

  #[arg(short('f'), long = "file", value_name = "FILE", help = "SQLite database file to use")]
  pub filename: Option<String>,
}

impl Cli {
  /// Check if SQLite mode is requested
  pub fn is_sqlite_mode(&self) -> bool {
    self.filename.is_some() || self.backend == Some(Backend::Sqlite)
  }

  /// Form values: config defaults, then CLI flags on top.
  pub fn connection_form(&self, defaults: &ConnectionDescriptor) -> ConnectionDescriptor {
    let mut form = defaults.clone();

    if let Some(backend) = self.backend {
      if backend != form.backend && self.port.is_none() {
        form.port = backend.default_port();
      }
      form.backend = backend;
    }
    if let Some(filename) = &self.filename {
      form.backend = Backend::Sqlite;
      form.database = filename.clone();
    }
    if let Some(host) = &self.host {
      form.host = host.clone();
    }
    if let Some(port) = self.port {
      form.port = port;
    }
    if let Some(username) = &self.username {
      form.username = username.clone();
    }
    if let Some(dbname) = &self.dbname {
      if form.backend != Backend::Sqlite || self.filename.is_none() {
        form.database = dbname.clone();
      }
    }
    if self.password_prompt && form.backend != Backend::Sqlite {
      eprintln!("Password required for user '{}'", form.username);
      form.password = Self::prompt_password_with_paste_support();
    }

    form
  }

  /// Prompt for password with better paste support
  pub fn prompt_password_with_paste_support() -> String {
    use dialoguer::Password;

    match Password::new().with_prompt("Password").allow_empty_password(true).interact() {
      Ok(password) => password,
      Err(_) => {
        eprintln!("Primary password input failed, trying fallback...");
        eprintln!("Tip: Use Ctrl+Shift+V or right-click to paste in most terminals");

        rpassword::prompt_password("Password (fallback): ").unwrap_or_else(|_| {
          eprintln!("All password input methods failed. Enter the password in the connection form instead.");
          String::new()
        })
      },
    }
  }
}
