use std::sync::Arc;

use pretty_assertions::assert_eq;
use sql_chat::{
    conversation::Role,
    pipeline::{Pipeline, QueryOutcome},
    prompt::Prompts,
    session::Session,
    sql::ConnectionDescriptor,
};

use crate::test_utils::{assertions::ConversationAssertions, ChinookFixture, ScriptedModel};

fn session_with(model: &Arc<ScriptedModel>) -> Session {
    Session::new(Pipeline::new(model.clone(), Prompts::default()))
}

async fn connected(model: &Arc<ScriptedModel>) -> (ChinookFixture, Session) {
    let fixture = ChinookFixture::new().await.unwrap();
    let mut session = session_with(model);
    session.connect(&fixture.descriptor()).await.unwrap();
    (fixture, session)
}

#[tokio::test]
async fn test_connect_then_reuse_connection() {
    let model = Arc::new(
        ScriptedModel::new()
            .reply("SELECT Name FROM Artist WHERE ArtistId = 1;")
            .reply("The first artist is AC/DC.")
            .reply("SELECT COUNT(*) FROM Album;")
            .reply("There are 3 albums."),
    );
    let (fixture, mut session) = connected(&model).await;

    assert!(session.is_connected());
    assert_eq!(session.descriptor(), Some(&fixture.descriptor()));

    session.ask("Who is the first artist?").await.unwrap();
    session.ask("How many albums are there?").await.unwrap();

    assert_eq!(session.conversation().len(), 5);
    session.conversation().assert_last_from(Role::Assistant, "There are 3 albums.");
    assert_eq!(model.remaining(), 0);
}

#[tokio::test]
async fn test_failed_connect_keeps_previous_connection() {
    let model = Arc::new(ScriptedModel::new());
    let (fixture, mut session) = connected(&model).await;

    let missing = ConnectionDescriptor::sqlite("/nonexistent/dir/chinook.db");
    assert!(session.connect(&missing).await.is_err());

    assert!(session.is_connected());
    assert_eq!(session.descriptor(), Some(&fixture.descriptor()));
}

#[tokio::test]
async fn test_schema_lists_every_table() {
    let model = Arc::new(ScriptedModel::new().reply("SELECT 1;").reply("One."));
    let (_fixture, mut session) = connected(&model).await;

    session.ask("anything").await.unwrap();

    let sql_prompt = &model.prompts()[0];
    assert_eq!(sql_prompt.matches("Table: ").count(), 2);
    assert!(sql_prompt.contains("Table: Album\n"));
    assert!(sql_prompt.contains("Table: Artist\n  ArtistId INTEGER\n  Name NVARCHAR(120)\n"));
}

#[tokio::test]
async fn test_schema_is_read_fresh_every_turn() {
    let model = Arc::new(
        ScriptedModel::new()
            .reply("SELECT 1;")
            .reply("One.")
            .reply("SELECT 1;")
            .reply("One again."),
    );
    let (fixture, mut session) = connected(&model).await;

    session.ask("first").await.unwrap();
    fixture
        .execute("ALTER TABLE Artist ADD COLUMN Country TEXT; CREATE TABLE Genre (GenreId INTEGER, Name TEXT);")
        .await
        .unwrap();
    session.ask("second").await.unwrap();

    let prompts = model.prompts();
    assert!(!prompts[0].contains("Country"));
    assert!(!prompts[0].contains("Table: Genre"));
    assert!(prompts[2].contains("  Country TEXT\n"));
    assert!(prompts[2].contains("Table: Genre\n"));
}

#[tokio::test]
async fn test_generated_sql_is_executed_and_reported() {
    let sql = "SELECT Name FROM Artist ORDER BY ArtistId LIMIT 2;";
    let model = Arc::new(ScriptedModel::new().reply(&format!("  {sql}\n")).reply("AC/DC and Accept."));
    let (_fixture, mut session) = connected(&model).await;

    session.ask("Name 2 artists").await.unwrap();

    let report = session.last_report().unwrap();
    assert_eq!(report.question, "Name 2 artists");
    assert_eq!(report.sql, sql);
    assert_eq!(report.outcome, QueryOutcome::Rows("[(AC/DC), (Accept)]".to_string()));
    assert_eq!(report.answer, "AC/DC and Accept.");

    let answer_prompt = &model.prompts()[1];
    assert!(answer_prompt.contains(&format!("<SQL>{sql}</SQL>")));
    assert!(answer_prompt.contains("SQL Response: [(AC/DC), (Accept)]"));
}

#[tokio::test]
async fn test_result_text_is_escaped_in_answer_prompt() {
    let model = Arc::new(
        ScriptedModel::new()
            .reply("SELECT Name FROM Artist WHERE ArtistId IN (3, 4) ORDER BY ArtistId;")
            .reply("Two artists."),
    );
    let (_fixture, mut session) = connected(&model).await;

    session.ask("Which artists have odd names?").await.unwrap();

    let answer_prompt = &model.prompts()[1];
    assert!(answer_prompt.contains(r"SQL Response: [(Guns\_N\_Roses), (Back\\Slash)]"));
    // the report keeps the raw text
    assert_eq!(session.last_report().unwrap().outcome.text(), r"[(Guns_N_Roses), (Back\Slash)]");
}

#[tokio::test]
async fn test_execution_error_reaches_the_answer_prompt() {
    let model = Arc::new(
        ScriptedModel::new()
            .reply("SELECT Nme FROM Artist;")
            .reply("The query failed because the column Nme does not exist."),
    );
    let (_fixture, mut session) = connected(&model).await;

    session.ask("Name the artists").await.unwrap();

    let conversation = session.conversation();
    assert_eq!(conversation.len(), 3);
    conversation.assert_alternates();
    conversation.assert_last_from(Role::Assistant, "The query failed because the column Nme does not exist.");

    let report = session.last_report().unwrap();
    assert!(report.outcome.is_failure());
    assert!(report.outcome.text().contains("no such column"));
    assert!(model.prompts()[1].contains("no such column"));
}

#[tokio::test]
async fn test_execution_error_text_is_passed_verbatim() {
    let model = Arc::new(
        ScriptedModel::new()
            .reply("SELECT Name FROM track_list;")
            .reply("There is no track_list table."),
    );
    let (_fixture, mut session) = connected(&model).await;

    session.ask("List the tracks").await.unwrap();

    let answer_prompt = &model.prompts()[1];
    assert!(answer_prompt.contains("no such table: track_list"), "{answer_prompt}");
    assert!(!answer_prompt.contains(r"track\_list"));
    assert_eq!(session.conversation().len(), 3);
}

#[tokio::test]
async fn test_model_error_adds_one_entry() {
    let model = Arc::new(ScriptedModel::new().fail("HTTP 401 Unauthorized"));
    let (_fixture, mut session) = connected(&model).await;

    let reply = session.ask("Name 10 artists").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert!(reply.content.contains("SQL generation failed"));
    assert!(reply.content.contains("HTTP 401 Unauthorized"));

    assert_eq!(session.conversation().len(), 3);
    assert!(session.last_report().is_none());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_answer_failure_after_query_adds_one_entry() {
    let model = Arc::new(ScriptedModel::new().reply("SELECT 1;").fail("rate limited"));
    let (_fixture, mut session) = connected(&model).await;

    let reply = session.ask("one?").await.unwrap();
    assert!(reply.content.contains("answer generation failed"));
    assert_eq!(session.conversation().len(), 3);
    assert!(session.last_report().is_none());
}

#[tokio::test]
async fn test_turns_grow_transcript_in_order() {
    let questions = ["first question", "second question", "third question"];
    let mut model = ScriptedModel::new();
    for i in 0..questions.len() {
        model = model.reply("SELECT 1;").reply(&format!("answer {i}"));
    }
    let model = Arc::new(model);
    let (_fixture, mut session) = connected(&model).await;

    for question in questions {
        session.ask(question).await.unwrap();
    }

    let conversation = session.conversation();
    assert_eq!(conversation.len(), 1 + 2 * questions.len());
    conversation.assert_alternates();
    for (i, question) in questions.iter().enumerate() {
        assert_eq!(conversation.messages()[1 + 2 * i].content, *question);
        assert_eq!(conversation.messages()[2 + 2 * i].content, format!("answer {i}"));
    }
}

#[tokio::test]
async fn test_history_includes_current_question() {
    let model = Arc::new(
        ScriptedModel::new()
            .reply("SELECT 1;")
            .reply("One.")
            .reply("SELECT 2;")
            .reply("Two."),
    );
    let (_fixture, mut session) = connected(&model).await;

    session.ask("first").await.unwrap();
    session.ask("second").await.unwrap();

    let second_sql_prompt = &model.prompts()[2];
    assert!(second_sql_prompt.contains("Human: first\nAI: One.\nHuman: second"));
}

#[tokio::test]
async fn test_not_connected_does_not_call_the_model() {
    let model = Arc::new(ScriptedModel::new());
    let mut session = session_with(&model);

    let reply = session.ask("Name 10 artists").await.unwrap();
    assert_eq!(reply.content, sql_chat::session::NOT_CONNECTED);
    assert!(model.prompts().is_empty());
}
