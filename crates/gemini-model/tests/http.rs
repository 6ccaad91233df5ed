use std::future::poll_fn;
use std::pin::pin;

use gemini_chat_api::{GeminiConfigBuilder, GeminiProvider};
use gemini_chat_model::{
    ApiKey, ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    ModelTool,
};
use mockito::{Matcher, Server};
use serde_json::json;

const STREAM_BODY: &str = include_str!("../fixtures/stream_response.txt");

fn provider(server: &Server) -> GeminiProvider {
    let config =
        GeminiConfigBuilder::with_api_key(ApiKey::new("test-key").unwrap())
            .with_base_url(server.url())
            .build();
    GeminiProvider::new(config)
}

fn request() -> ModelRequest {
    ModelRequest {
        model: "gemini-test".to_owned(),
        system_instruction: Some("Answer briefly.".to_owned()),
        messages: vec![ModelMessage::User("When was Rust 1.0?".to_owned())],
        temperature: Some(0.5),
        tools: vec![ModelTool::WebSearch],
    }
}

#[tokio::test]
async fn test_stream_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(":streamGenerateContent".to_owned()))
        .match_query(Matcher::UrlEncoded("alt".to_owned(), "sse".to_owned()))
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "contents": [
                { "role": "user", "parts": [{ "text": "When was Rust 1.0?" }] }
            ],
            "systemInstruction": { "parts": [{ "text": "Answer briefly." }] },
            "generationConfig": { "temperature": 0.5 },
            "tools": [{ "googleSearch": {} }]
        })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(STREAM_BODY)
        .create_async()
        .await;

    let resp = provider(&server).send_request(&request()).await.unwrap();
    let mut resp = pin!(resp);
    let mut text = String::new();
    let mut chunk_count = 0;
    let mut finish_reason = None;
    while let Some(event) = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
        .await
        .unwrap()
    {
        match event {
            ModelResponseEvent::Chunk(chunk) => {
                chunk_count += 1;
                text.push_str(&chunk.text);
            }
            ModelResponseEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    assert_eq!(chunk_count, 3);
    assert_eq!(text, "The Rust 1.0 release shipped on May 15, 2015.");
    assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_complete_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(":generateContent$".to_owned()))
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "The Rust 1.0 release shipped on May 15, 2015." }]
                    },
                    "finishReason": "STOP"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let completion =
        provider(&server).complete_request(&request()).await.unwrap();
    assert_eq!(completion.text, "The Rust 1.0 release shipped on May 15, 2015.");
    assert_eq!(completion.finish_reason, Some(ModelFinishReason::Stop));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let provider = provider(&server);
    let err = provider.send_request(&request()).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.message().contains("API key not valid"));
    assert!(err.message().contains("INVALID_ARGUMENT"));

    let err = provider.complete_request(&request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unexpected_content_type() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html></html>")
        .create_async()
        .await;

    let err = provider(&server)
        .send_request(&request())
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.message().contains("content type"));
}
