use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use image::{ImageFormat, Rgba, RgbaImage};
use picker::viewport::Point;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use super::*;
use crate::script::parse_script;

// =============================================================================
// Helpers
// =============================================================================

const CAT: &str = "https://images.example.com/cat.png";
const DOG: &str = "https://images.example.com/dog.png";

fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Answers immediately from a fixed table.
struct TableFetcher {
    responses: HashMap<String, Result<Vec<u8>, LoadError>>,
}

impl TableFetcher {
    fn new(entries: Vec<(&str, Result<Vec<u8>, LoadError>)>) -> Self {
        Self { responses: entries.into_iter().map(|(url, r)| (url.to_string(), r)).collect() }
    }
}

#[async_trait::async_trait]
impl ImageFetcher for TableFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        self.responses.get(url).cloned().unwrap_or_else(|| Err(LoadError::Status(404)))
    }
}

/// Blocks each URL until the test sends its response.
struct GatedFetcher {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<Vec<u8>, LoadError>>>>,
}

#[async_trait::async_trait]
impl ImageFetcher for GatedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let gate = self.gates.lock().unwrap().remove(url);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(LoadError::Fetch("gate dropped".into()))),
            None => Err(LoadError::Fetch(format!("no gate for {url}"))),
        }
    }
}

/// Panics on `CAT`, serves a small PNG for anything else.
struct PanickingFetcher;

#[async_trait::async_trait]
impl ImageFetcher for PanickingFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        assert_ne!(url, CAT, "fetcher blew up");
        Ok(png(2, 2, [0, 0, 255, 255]))
    }
}

fn gated(urls: &[&str]) -> (GatedFetcher, HashMap<String, oneshot::Sender<Result<Vec<u8>, LoadError>>>) {
    let mut gates = HashMap::new();
    let mut senders = HashMap::new();
    for url in urls {
        let (tx, rx) = oneshot::channel();
        gates.insert((*url).to_string(), rx);
        senders.insert((*url).to_string(), tx);
    }
    (GatedFetcher { gates: Mutex::new(gates) }, senders)
}

fn new_session<F: ImageFetcher + 'static>(fetcher: F) -> Session<F, Vec<u8>> {
    Session::new(fetcher, ScreenMapping::default(), Vec::new())
}

fn reports<F>(session: &Session<F, Vec<u8>>) -> Vec<Value> {
    String::from_utf8(session.out.clone())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn events<F>(session: &Session<F, Vec<u8>>) -> Vec<String> {
    reports(session).iter().map(|r| r["event"].as_str().unwrap().to_string()).collect()
}

fn temp_png(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("loupe-{}-{name}.png", std::process::id()))
}

// =============================================================================
// Full flow
// =============================================================================

#[tokio::test]
async fn load_hover_click_reports_colors() {
    let fetcher = TableFetcher::new(vec![(CAT, Ok(png(8, 6, [255, 136, 0, 255])))]);
    let mut session = new_session(fetcher);
    let script = format!("load {CAT}\nawait\npick\nmove 120 80\nframe\nclick 120 80\n");

    session.run(parse_script(&script).unwrap()).await.unwrap();

    let reports = reports(&session);
    assert_eq!(events(&session), vec!["image_loaded", "pick_mode", "current", "overlay", "final"]);
    assert_eq!(reports[0]["url"], CAT);
    assert_eq!(reports[0]["fit"], json!({ "x": 0.0, "y": 0.0, "width": 800.0, "height": 600.0 }));
    assert_eq!(reports[1], json!({ "event": "pick_mode", "active": true }));
    assert_eq!(reports[2], json!({ "event": "current", "hex": "#FF8800" }));
    assert_eq!(reports[3], json!({ "event": "overlay", "visible": true, "anchor": { "x": 70.0, "y": 30.0 } }));
    assert_eq!(reports[4], json!({ "event": "final", "hex": "#FF8800" }));
    assert!(session.picker().overlay().is_visible());
}

#[tokio::test]
async fn leave_and_toggle_report_hidden_overlay() {
    let fetcher = TableFetcher::new(vec![(CAT, Ok(png(4, 4, [0, 0, 255, 255])))]);
    let mut session = new_session(fetcher);
    let script = format!("load {CAT}\nawait\npick\nmove 10 10\nleave\nmove 10 10\npick\n");

    session.run(parse_script(&script).unwrap()).await.unwrap();

    let reports = reports(&session);
    let hidden: Vec<&Value> = reports.iter().filter(|r| r["event"] == "overlay" && r["visible"] == false).collect();
    assert_eq!(hidden.len(), 2);
    assert_eq!(reports.last().unwrap(), &json!({ "event": "overlay", "visible": false, "anchor": null }));
    assert!(session.picker().core.final_hex().is_none());
}

#[tokio::test]
async fn initial_image_then_script() {
    let fetcher = TableFetcher::new(vec![(CAT, Ok(png(4, 4, [1, 2, 3, 255])))]);
    let mut session = new_session(fetcher);

    session.execute(Command::Load(CAT.into())).await.unwrap();
    session.run(vec![Command::Await, Command::Pick, Command::Move(Point::new(1.0, 1.0))]).await.unwrap();

    assert_eq!(session.picker().surface().url(), Some(CAT));
    assert_eq!(session.picker().core.current_hex().map(|h| h.as_str()), Some("#010203"));
}

// =============================================================================
// URL handling
// =============================================================================

#[tokio::test]
async fn invalid_url_is_reported_without_loading() {
    let mut session = new_session(TableFetcher::new(Vec::new()));
    session.run(parse_script("load ftp://example.com/a.png\nawait\n").unwrap()).await.unwrap();

    assert_eq!(
        reports(&session),
        vec![json!({
            "event": "invalid_url",
            "url": "ftp://example.com/a.png",
            "message": "Invalid image URL. Please enter a valid URL.",
        })]
    );
    assert!(session.picker().surface().pending().is_none());
    assert!(session.picker().surface().url().is_none());
}

#[tokio::test]
async fn empty_url_is_ignored() {
    let mut session = new_session(TableFetcher::new(Vec::new()));
    session.run(parse_script("load\nload   \nawait\n").unwrap()).await.unwrap();
    assert!(reports(&session).is_empty());
}

// =============================================================================
// Load failures and ordering
// =============================================================================

#[tokio::test]
async fn failed_load_reports_code() {
    let fetcher = TableFetcher::new(vec![(CAT, Err(LoadError::Status(503)))]);
    let mut session = new_session(fetcher);
    session.run(parse_script(&format!("load {CAT}\n")).unwrap()).await.unwrap();

    assert_eq!(
        reports(&session),
        vec![json!({
            "event": "load_failed",
            "url": CAT,
            "code": "E_IMAGE_STATUS",
            "retryable": true,
            "message": "image fetch returned status 503",
        })]
    );
}

#[tokio::test]
async fn undecodable_body_reports_decode_error() {
    let fetcher = TableFetcher::new(vec![(CAT, Ok(b"<html>not an image</html>".to_vec()))]);
    let mut session = new_session(fetcher);
    session.run(parse_script(&format!("load {CAT}\nawait\n")).unwrap()).await.unwrap();

    let reports = reports(&session);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["code"], "E_IMAGE_DECODE");
}

#[tokio::test]
async fn only_latest_load_is_drawn() {
    let (fetcher, mut senders) = gated(&[CAT, DOG]);
    let mut session = new_session(fetcher);

    session.execute(Command::Load(CAT.into())).await.unwrap();
    session.execute(Command::Load(DOG.into())).await.unwrap();
    senders.remove(DOG).unwrap().send(Ok(png(2, 2, [0, 255, 0, 255]))).unwrap();
    // The superseded task was aborted, so this response is never read.
    let _ = senders.remove(CAT).unwrap().send(Ok(png(2, 2, [255, 0, 0, 255])));
    session.execute(Command::Await).await.unwrap();

    let reports = reports(&session);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["event"], "image_loaded");
    assert_eq!(reports[0]["url"], DOG);
    assert_eq!(session.picker().surface().url(), Some(DOG));
}

#[tokio::test]
async fn panicking_load_settles_as_failure() {
    let mut session = new_session(PanickingFetcher);
    session.run(parse_script(&format!("load {CAT}\nawait\n")).unwrap()).await.unwrap();

    let reports = reports(&session);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["event"], "load_failed");
    assert_eq!(reports[0]["url"], CAT);
    assert_eq!(reports[0]["code"], "E_IMAGE_FETCH");
    assert_eq!(reports[0]["retryable"], true);
    assert!(reports[0]["message"].as_str().unwrap().contains("load task failed"));
    assert!(session.picker().surface().pending().is_none());
}

#[tokio::test]
async fn load_after_panicked_load_still_draws() {
    let mut session = new_session(PanickingFetcher);
    session.run(parse_script(&format!("load {CAT}\nawait\nload {DOG}\nawait\n")).unwrap()).await.unwrap();

    assert_eq!(events(&session), vec!["load_failed", "image_loaded"]);
    assert_eq!(session.picker().surface().url(), Some(DOG));
}

#[tokio::test]
async fn load_after_settle_replaces_image() {
    let fetcher = TableFetcher::new(vec![(CAT, Ok(png(2, 2, [255, 0, 0, 255]))), (DOG, Ok(png(2, 2, [0, 0, 255, 255])))]);
    let mut session = new_session(fetcher);
    let script = format!("load {CAT}\nawait\npick\nmove 5 5\nclick 5 5\nload {DOG}\nawait\nmove 5 5\n");

    session.run(parse_script(&script).unwrap()).await.unwrap();

    let core = &session.picker().core;
    assert_eq!(core.final_hex().map(|h| h.as_str()), Some("#FF0000"));
    assert_eq!(core.current_hex().map(|h| h.as_str()), Some("#0000FF"));
}

// =============================================================================
// Files
// =============================================================================

#[tokio::test]
async fn snapshot_writes_visible_overlay() {
    let fetcher = TableFetcher::new(vec![(CAT, Ok(png(4, 4, [9, 9, 9, 255])))]);
    let mut session = new_session(fetcher);
    let path = temp_png("snapshot");
    let script = format!("load {CAT}\nawait\npick\nmove 200 200\nframe\nsnapshot {}\n", path.display());

    session.run(parse_script(&script).unwrap()).await.unwrap();

    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (116, 116));
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn snapshot_while_hidden_writes_nothing() {
    let mut session = new_session(TableFetcher::new(Vec::new()));
    let path = temp_png("hidden");
    session.execute(Command::Snapshot(path.clone())).await.unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn save_surface_writes_viewport_png() {
    let mut session = new_session(TableFetcher::new(Vec::new()));
    let path = temp_png("surface");
    session.execute(Command::SaveSurface(path.clone())).await.unwrap();

    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (800, 600));
    std::fs::remove_file(&path).unwrap();
}
