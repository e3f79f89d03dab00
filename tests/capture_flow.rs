//! Full flow: capture console -> HTTP server -> mocked Gemini -> saved file

use calamine::{Reader, Xlsx};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use voice_sheet::business::{CaptureError, HttpSheetClient, PlatformServices, VoiceController};
use voice_sheet::data::{ExtractionConfig, LlmConfig, WorkbookConfig};
use voice_sheet::platform::console::{ConsoleSynthesizer, DirectoryFileSaver};
use voice_sheet::platform::Notifier;
use voice_sheet::server::{router, AppState};
use voice_sheet::{Converter, GeminiClient, Language};

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

/// Serve the API on an ephemeral port backed by the given Gemini mock
async fn spawn_server(gemini: &MockServer) -> String {
    let llm = LlmConfig {
        endpoint: gemini.base_url(),
        ..LlmConfig::default()
    };
    let model = Arc::new(GeminiClient::new(&llm, Some("test-key".to_string())).unwrap());
    let converter = Converter::new(model, ExtractionConfig::default(), WorkbookConfig::default());
    let app = router(Arc::new(AppState { converter }), true);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn controller(
    server_url: &str,
    download_dir: &std::path::Path,
    notifier: Arc<RecordingNotifier>,
) -> VoiceController {
    let api = Arc::new(HttpSheetClient::new(server_url, Duration::from_secs(10)).unwrap());
    let services = PlatformServices {
        recognizer: None,
        synthesizer: Arc::new(ConsoleSynthesizer),
        saver: Arc::new(DirectoryFileSaver::new(download_dir)),
        notifier,
    };
    VoiceController::new(api, services, Language::En, "sheet.xlsx")
}

#[tokio::test]
async fn typed_instruction_downloads_sheet() {
    let gemini = MockServer::start_async().await;
    let mock = gemini
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.0-flash:generateContent")
                .header("x-goog-api-key", "test-key");
            then.status(200).json_body(gemini_reply(
                "```json\n{\"headers\":[\"Fruit\",\"Color\"],\"rows\":[[\"Apple\",\"Red\"],[\"Banana\",\"Yellow\"],[\"Grape\",\"Purple\"]]}\n```",
            ));
        })
        .await;
    let server_url = spawn_server(&gemini).await;

    let downloads = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = controller(&server_url, downloads.path(), notifier.clone());
    controller.set_instruction("List 3 fruits with color");

    let path = controller.generate().await.unwrap();

    mock.assert_async().await;
    assert_eq!(path, downloads.path().join("sheet.xlsx"));
    assert!(notifier.alerts.lock().unwrap().is_empty());

    let mut workbook: Xlsx<_> = calamine::open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["Fruit", "Color"],
            vec!["Apple", "Red"],
            vec!["Banana", "Yellow"],
            vec!["Grape", "Purple"],
        ]
    );
}

#[tokio::test]
async fn unusable_model_output_alerts_and_saves_nothing() {
    let gemini = MockServer::start_async().await;
    gemini
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(gemini_reply("Sorry, I can't make a spreadsheet."));
        })
        .await;
    let server_url = spawn_server(&gemini).await;

    let downloads = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = controller(&server_url, downloads.path(), notifier.clone());
    controller.set_instruction("nonsense");

    let err = controller.generate().await.unwrap_err();

    assert!(matches!(err, CaptureError::Generate(_)));
    assert_eq!(
        *notifier.alerts.lock().unwrap(),
        vec!["Failed to generate Excel file".to_string()]
    );
    assert!(!downloads.path().join("sheet.xlsx").exists());
}

#[tokio::test]
async fn listening_without_recognizer_sends_nothing() {
    let gemini = MockServer::start_async().await;
    let mock = gemini
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(gemini_reply("{}"));
        })
        .await;
    let server_url = spawn_server(&gemini).await;

    let downloads = tempfile::tempdir().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = controller(&server_url, downloads.path(), notifier.clone());

    let err = controller.start_listening().unwrap_err();

    assert!(matches!(err, CaptureError::Unsupported));
    assert_eq!(notifier.alerts.lock().unwrap().len(), 1);
    assert_eq!(mock.hits_async().await, 0);
}
