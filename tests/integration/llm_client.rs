use pretty_assertions::assert_eq;
use serial_test::serial;
use sql_chat::llm::{ChatModel, LlmConfig, OpenAiCompatible};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// Serves exactly one HTTP response and hands back the raw request it got.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn config(base_url: String) -> LlmConfig {
    LlmConfig { base_url, model: "test-model".to_string(), ..LlmConfig::default() }
}

#[tokio::test]
async fn test_sends_prompt_as_single_user_message() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "SELECT Name FROM Artist LIMIT 10;"}}]}"#,
    )
    .await;

    let client = OpenAiCompatible::with_api_key(&config(base_url), Some("gsk-test".to_string())).unwrap();
    let sql = client.complete("Name 10 artists").await.unwrap();
    assert_eq!(sql, "SELECT Name FROM Artist LIMIT 10;");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/chat/completions HTTP/1.1"));
    assert!(request.to_lowercase().contains("authorization: bearer gsk-test"));

    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "test-model",
            "messages": [{"role": "user", "content": "Name 10 artists"}],
            "temperature": 0.0
        })
    );
}

#[tokio::test]
async fn test_without_key_sends_no_authorization() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#).await;

    let client = OpenAiCompatible::with_api_key(&config(base_url), None).unwrap();
    assert_eq!(client.complete("hi").await.unwrap(), "ok");

    let request = server.await.unwrap();
    assert!(!request.to_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_error_status_is_an_error() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"error": {"message": "Invalid API Key"}}"#).await;

    let client = OpenAiCompatible::with_api_key(&config(base_url), Some("bad".to_string())).unwrap();
    let err = client.complete("hi").await.unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("401"), "unexpected error: {message}");
    assert!(message.contains("Invalid API Key"), "unexpected error: {message}");
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint_is_an_error() {
    // bind and drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
    drop(listener);

    let client = OpenAiCompatible::with_api_key(&config(base_url), None).unwrap();
    let err = client.complete("hi").await.unwrap_err();
    assert!(err.to_string().contains("LLM request to"));
}

#[test]
#[serial]
fn test_api_key_read_from_configured_env_var() {
    let config = LlmConfig { api_key_env: "SQL_CHAT_TEST_API_KEY".to_string(), ..LlmConfig::default() };

    std::env::remove_var("SQL_CHAT_TEST_API_KEY");
    assert_eq!(config.api_key(), None);

    std::env::set_var("SQL_CHAT_TEST_API_KEY", "");
    assert_eq!(config.api_key(), None);

    std::env::set_var("SQL_CHAT_TEST_API_KEY", "gsk-123");
    assert_eq!(config.api_key(), Some("gsk-123".to_string()));

    std::env::remove_var("SQL_CHAT_TEST_API_KEY");
}
