//! End-to-end interview flow over the HTTP router, with the shipped assets,
//! the JSONL logger and the local archive on temporary directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use survey_debrief::adapters::ai::{MockAIProvider, MockError};
use survey_debrief::adapters::archive::LocalFileArchive;
use survey_debrief::adapters::assets::FileQuestionCatalog;
use survey_debrief::adapters::chat_log::JsonlChatLogger;
use survey_debrief::adapters::http::{app_router, InterviewHandlers};
use survey_debrief::adapters::storage::InMemoryInterviewStore;
use survey_debrief::application::{
    CreateInterviewHandler, EndInterviewHandler, GetInterviewHandler, InitializeSessionHandler,
    SendMessageCommand, SendMessageHandler, StartInterviewHandler, TurnOutcome,
};
use survey_debrief::domain::foundation::InterviewId;
use survey_debrief::domain::interview::{EndCheck, EndReason, ModelArgs};
use survey_debrief::domain::prompt::PromptTemplate;

struct App {
    router: Router,
    send: Arc<SendMessageHandler>,
    provider: Arc<MockAIProvider>,
    log_dir: PathBuf,
    archive_dir: PathBuf,
    _tmp: TempDir,
}

fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

async fn app(provider: MockAIProvider) -> App {
    let tmp = TempDir::new().unwrap();
    let log_dir = tmp.path().join("logs");
    let archive_dir = tmp.path().join("archive");

    let catalog = FileQuestionCatalog::load(assets_dir()).await.unwrap();
    let initialize = Arc::new(InitializeSessionHandler::new(
        Arc::new(catalog),
        PromptTemplate::from_file(assets_dir().join("initial_message.txt"))
            .await
            .unwrap(),
        PromptTemplate::from_file(assets_dir().join("system_message.txt"))
            .await
            .unwrap(),
        ModelArgs::default(),
    ));

    let store = Arc::new(InMemoryInterviewStore::new());
    let provider = Arc::new(provider);
    let send = Arc::new(SendMessageHandler::new(
        store.clone(),
        provider.clone(),
        Arc::new(JsonlChatLogger::init(&log_dir).await.unwrap()),
        EndCheck::default(),
    ));

    let handlers = InterviewHandlers::new(
        Arc::new(CreateInterviewHandler::new(store.clone())),
        Arc::new(StartInterviewHandler::new(store.clone(), initialize)),
        Arc::new(GetInterviewHandler::new(store.clone())),
        send.clone(),
        Arc::new(EndInterviewHandler::new(
            store,
            Arc::new(LocalFileArchive::new(&archive_dir)),
            "cd-",
        )),
    );

    App {
        router: app_router(handlers, None),
        send,
        provider,
        log_dir,
        archive_dir,
        _tmp: tmp,
    }
}

async fn call(app: &App, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn started(app: &App) -> InterviewId {
    let (status, created) = call(
        app,
        "POST",
        "/api/interviews?user=p42&session=s42&questionid=0&response=3",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["interview_id"].as_str().unwrap().to_string();

    let (status, _) = call(app, "POST", &format!("/api/interviews/{}/start", id)).await;
    assert_eq!(status, StatusCode::OK);
    id.parse().unwrap()
}

async fn turn(app: &App, id: InterviewId, text: &str) -> (TurnOutcome, usize) {
    let (tx, mut rx) = mpsc::channel(256);
    let outcome = app
        .send
        .handle(SendMessageCommand::new(id, text), &tx)
        .await
        .unwrap();
    drop(tx);
    let mut updates = 0;
    while rx.recv().await.is_some() {
        updates += 1;
    }
    (outcome, updates)
}

fn read_lines(path: &Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[tokio::test]
async fn full_interview_is_logged_archived_and_coded() {
    let app = app(
        MockAIProvider::new()
            .with_response("What makes the buses reliable for you?")
            .with_response("Thank you, that's very helpful.<end_of_survey>"),
    )
    .await;
    let id = started(&app).await;

    // Opening question mentions the survey question
    let (_, view) = call(&app, "GET", &format!("/api/interviews/{}", id)).await;
    assert_eq!(view["status"], "active");
    assert!(view["transcript"][0][1]
        .as_str()
        .unwrap()
        .contains("public transportation"));

    // First turn keeps the interview going
    let (outcome, updates) = turn(&app, id, "The buses are usually on time.").await;
    assert!(updates >= 2);
    match outcome {
        TurnOutcome::Completed { view, end_reason } => {
            assert_eq!(end_reason, None);
            assert_eq!(view.transcript.len(), 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    // The system prompt carries the selected answer
    let request = &app.provider.get_calls()[0];
    assert!(request.messages[0].content.contains("Somewhat satisfied"));

    // Second turn hits the sentinel
    let (outcome, _) = turn(&app, id, "That's about it.").await;
    match outcome {
        TurnOutcome::Completed { end_reason, .. } => {
            assert_eq!(end_reason, Some(EndReason::Sentinel));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    let (_, view) = call(&app, "GET", &format!("/api/interviews/{}", id)).await;
    assert_eq!(view["status"], "ended");
    assert_eq!(view["controls"]["exit_visible"], true);
    assert_eq!(view["controls"]["input_visible"], false);
    assert_eq!(view["transcript"][2][1], "Thank you, that's very helpful.");

    // Every turn is logged, user then bot
    let log = read_lines(&app.log_dir.join("s42.jsonl"));
    let roles: Vec<&str> = log.iter().map(|e| e["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["user", "bot", "user", "bot"]);
    assert!(log.iter().all(|e| e["session"] == "s42"));

    // Exit archives the flattened transcript and issues a code
    let (status, exit) = call(&app, "POST", &format!("/api/interviews/{}/exit", id)).await;
    assert_eq!(status, StatusCode::OK);
    let code = exit["completion_code"].as_str().unwrap().to_string();
    assert!(code.starts_with("cd-"));
    assert!(exit["completion_message"].as_str().unwrap().contains(&code));

    let archived = read_lines(&app.archive_dir.join("s42.jsonl"));
    assert_eq!(archived.len(), 5);
    assert_eq!(archived[0]["role"], "assistant");
    assert_eq!(archived[1]["content"], "The buses are usually on time.");
    assert_eq!(archived[4]["content"], "Thank you, that's very helpful.");

    // Exit is idempotent
    let (status, again) = call(&app, "POST", &format!("/api/interviews/{}/exit", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["completion_code"], code.as_str());
}

#[tokio::test]
async fn failed_turn_is_retracted_and_can_be_resent() {
    let app = app(
        MockAIProvider::new()
            .with_broken_stream(
                "Could you ",
                MockError::Network {
                    message: "connection reset".to_string(),
                },
            )
            .with_response("Could you say more?"),
    )
    .await;
    let id = started(&app).await;

    let (outcome, _) = turn(&app, id, "It's fine.").await;
    match outcome {
        TurnOutcome::Failed { failure, view } => {
            assert!(failure.recoverable);
            assert_eq!(failure.user_text, "It's fine.");
            assert_eq!(view.transcript.len(), 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!app.log_dir.join("s42.jsonl").exists());

    let (outcome, _) = turn(&app, id, "It's fine.").await;
    assert!(matches!(outcome, TurnOutcome::Completed { end_reason: None, .. }));
    assert_eq!(read_lines(&app.log_dir.join("s42.jsonl")).len(), 2);
}

#[tokio::test]
async fn sending_before_start_is_rejected() {
    let app = app(MockAIProvider::new()).await;
    let (_, created) = call(&app, "POST", "/api/interviews").await;
    let id: InterviewId = created["interview_id"].as_str().unwrap().parse().unwrap();

    let (tx, _rx) = mpsc::channel(8);
    let err = app
        .send
        .handle(SendMessageCommand::new(id, "hello"), &tx)
        .await
        .unwrap_err();

    assert_eq!(
        err.code(),
        survey_debrief::domain::foundation::ErrorCode::InvalidStateTransition
    );
    assert_eq!(app.provider.call_count(), 0);
}
