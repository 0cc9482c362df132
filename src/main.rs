use clap::Parser;
use color_eyre::eyre::Result;
use sql_chat::{
  app::App,
  cli::Cli,
  utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
  // Provider keys and the log level may come from a local .env
  let dotenv = dotenvy::dotenv();

  initialize_logging()?;

  initialize_panic_handler()?;

  if let Err(e) = dotenv {
    log::debug!("No .env loaded: {e}");
  }

  let args = Cli::parse();

  let mut app = App::new(&args)?;
  app.run().await?;

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  if let Err(e) = tokio_main().await {
    eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
    Err(e)
  } else {
    Ok(())
  }
}
