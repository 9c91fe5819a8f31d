use serde_json::{json, Value};
use sitegen_core::{
    ContentGenerator, DirectoryStore, EditError, EditMerger, EditorError, EditorSession,
    EditorState, SiteStore,
};
use sitegen_document::{DirectEdit, DocumentSchema, HeadlineLine, ImageSlot, SiteInstance, TextField};
use sitegen_model::{ModelError, TextModel};
use sitegen_test_utils::{
    embedded_document, fenced, sample_document, sample_inputs, CountingStore, GatedTextModel,
    ScriptedImageModel, ScriptedTextModel,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn session(text: Arc<dyn TextModel>, store: Arc<dyn SiteStore>) -> EditorSession {
    let schema = Arc::new(DocumentSchema::new().unwrap());
    let generator = ContentGenerator::new(
        text.clone(),
        Arc::new(ScriptedImageModel::default()),
        schema.clone(),
    );
    let merger = EditMerger::new(text, schema);
    EditorSession::new(store, Arc::new(generator), Arc::new(merger))
}

fn shorten_headline(mut doc: Value) -> Value {
    doc["hero"]["headline"] = json!({ "line1": "Yards", "line2": "done", "line3": "right" });
    doc
}

async fn stored_site(store: &CountingStore) -> SiteInstance {
    let site = SiteInstance::new(sample_document());
    store.put(&site).await.unwrap();
    site
}

fn banner(text: &str) -> DirectEdit {
    DirectEdit::text(TextField::BannerText, text)
}

#[tokio::test]
async fn generate_edit_and_undo() {
    let store = Arc::new(CountingStore::new());
    let text = Arc::new(ScriptedTextModel::generating_then_rewriting(shorten_headline));
    let session = session(text.clone(), store.clone());

    let id = session.generate(sample_inputs()).await.unwrap();
    assert_eq!(store.puts(), 1);
    let generated = session.document().unwrap();
    assert_eq!(generated.contact, sample_inputs().contact());
    assert_eq!(generated.services.cards.len(), 4);

    session.apply_ai_edit("make the headline shorter").await.unwrap();
    let edited = session.document().unwrap();
    assert_eq!(edited.hero.headline.line1, "Yards");
    assert_eq!(edited.hero.hero_image, generated.hero.hero_image);
    assert_eq!(edited.contact, generated.contact);
    assert_eq!(store.puts(), 2);
    assert!(session.can_undo());
    assert_eq!(session.last_instruction().as_deref(), Some("make the headline shorter"));
    assert_eq!(session.state(), EditorState::Ready);

    session.undo().await.unwrap();
    pretty_assertions::assert_eq!(session.document().unwrap(), generated);
    assert!(!session.can_undo());
    assert_eq!(store.puts(), 3);

    let stored = store.get(id).await.unwrap().unwrap();
    assert_eq!(stored.data, generated);
    assert_eq!(text.calls(), 2);
}

#[tokio::test]
async fn undo_without_ai_edit_fails() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let session = session(Arc::new(ScriptedTextModel::copy()), store);
    session.load(site.id).await.unwrap();

    assert!(matches!(session.undo().await, Err(EditorError::NothingToUndo)));
}

#[tokio::test(start_paused = true)]
async fn burst_of_direct_edits_writes_once() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let session = session(Arc::new(ScriptedTextModel::copy()), store.clone());
    session.load(site.id).await.unwrap();

    for i in 0..5 {
        session.apply_direct_edit(&banner(&format!("banner {i}"))).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(store.puts(), 1);

    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(store.puts(), 2);
    let written = store.written();
    assert_eq!(written.last().unwrap().data.banner_text, "banner 4");
    assert_eq!(session.state(), EditorState::Ready);
}

#[tokio::test(start_paused = true)]
async fn ai_edit_supersedes_pending_debounce() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let session = session(Arc::new(ScriptedTextModel::rewriting(|doc| doc)), store.clone());
    session.load(site.id).await.unwrap();

    session
        .apply_direct_edit(&DirectEdit::text(TextField::HeroHeadline(HeadlineLine::Line1), "Typed"))
        .unwrap();
    session.apply_ai_edit("keep everything").await.unwrap();
    assert_eq!(store.puts(), 2);

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(store.puts(), 2);
    let stored = store.get(site.id).await.unwrap().unwrap();
    assert_eq!(stored.data.hero.headline.line1, "Typed");
}

#[tokio::test]
async fn session_is_busy_while_ai_edit_is_pending() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let gated = Arc::new(GatedTextModel::new(Arc::new(ScriptedTextModel::rewriting(
        shorten_headline,
    ))));
    let session = Arc::new(session(gated.clone(), store.clone()));
    session.load(site.id).await.unwrap();

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.apply_ai_edit("make the headline shorter").await }
    });
    gated.wait_entered().await;

    assert_eq!(session.state(), EditorState::AiEditing);
    assert!(matches!(
        session.apply_direct_edit(&banner("typed meanwhile")),
        Err(EditorError::Busy)
    ));
    assert!(matches!(session.apply_ai_edit("again").await, Err(EditorError::Busy)));
    assert!(matches!(session.undo().await, Err(EditorError::Busy)));

    gated.release();
    pending.await.unwrap().unwrap();

    assert_eq!(session.state(), EditorState::Ready);
    assert_eq!(session.document().unwrap().hero.headline.line1, "Yards");
    assert_eq!(session.document().unwrap().banner_text, site.data.banner_text);
}

#[tokio::test]
async fn reset_discards_in_flight_edit() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let gated = Arc::new(GatedTextModel::new(Arc::new(ScriptedTextModel::rewriting(
        shorten_headline,
    ))));
    let session = Arc::new(session(gated.clone(), store.clone()));
    session.load(site.id).await.unwrap();

    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.apply_ai_edit("make the headline shorter").await }
    });
    gated.wait_entered().await;

    session.reset(true).await.unwrap();
    gated.release();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(EditorError::Edit(EditError::Cancelled))));
    assert_eq!(session.state(), EditorState::Empty);
    assert!(session.active().is_none());

    let stored = store.get(site.id).await.unwrap().unwrap();
    assert_eq!(stored.data, site.data);
}

#[tokio::test]
async fn failed_ai_edit_keeps_document_and_can_retry() {
    let calls = Arc::new(AtomicUsize::new(0));
    let text = {
        let calls = Arc::clone(&calls);
        ScriptedTextModel::new(move |request| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ModelError::Status {
                    status: 503,
                    message: "overloaded".into(),
                });
            }
            Ok(fenced(&shorten_headline(embedded_document(&request.prompt))))
        })
    };
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let session = session(Arc::new(text), store.clone());
    session.load(site.id).await.unwrap();

    let err = session.apply_ai_edit("make the headline shorter").await.unwrap_err();
    assert!(err.is_retryable());
    match session.state() {
        EditorState::AiEditFailed { instruction, message } => {
            assert_eq!(instruction, "make the headline shorter");
            assert!(message.contains("503"), "{message}");
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert_eq!(session.document().unwrap(), site.data);
    assert_eq!(store.puts(), 1);

    session.retry_ai_edit().await.unwrap();
    assert_eq!(session.document().unwrap().hero.headline.line1, "Yards");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.puts(), 2);
}

#[tokio::test]
async fn dismissed_failure_returns_to_ready() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let text = ScriptedTextModel::replying("not a document");
    let session = session(Arc::new(text), store);
    session.load(site.id).await.unwrap();

    session.apply_ai_edit("anything").await.unwrap_err();
    session.dismiss_failure().unwrap();
    assert_eq!(session.state(), EditorState::Ready);
}

#[tokio::test(start_paused = true)]
async fn failed_save_stays_dirty_until_flushed() {
    let store = Arc::new(CountingStore::new());
    let site = stored_site(&store).await;
    let session = session(Arc::new(ScriptedTextModel::copy()), store.clone());
    session.load(site.id).await.unwrap();

    store.set_failing(true);
    session
        .apply_direct_edit(&DirectEdit::ReplaceImage {
            slot: ImageSlot::AboutUs,
            uri: "data:image/png;base64,TkVX".into(),
        })
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(session.is_dirty());
    assert_eq!(store.puts(), 1);

    store.set_failing(false);
    session.flush().await.unwrap();
    assert!(!session.is_dirty());
    assert_eq!(store.puts(), 2);
    assert_eq!(
        store.written().last().unwrap().data.about_us.image,
        "data:image/png;base64,TkVX"
    );
}

#[tokio::test]
async fn generated_site_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let text: Arc<dyn TextModel> = Arc::new(ScriptedTextModel::copy());

    let (id, document) = {
        let store = Arc::new(DirectoryStore::open(dir.path()).await.unwrap());
        let session = session(text.clone(), store);
        let id = session.generate(sample_inputs()).await.unwrap();
        session.apply_direct_edit(&banner("Open on weekends")).unwrap();
        session.reset(true).await.unwrap();
        (id, store_document(dir.path(), id).await)
    };
    assert_eq!(document.banner_text, "Open on weekends");

    let store = Arc::new(DirectoryStore::open(dir.path()).await.unwrap());
    let session = session(text, store);
    session.load(id).await.unwrap();
    assert_eq!(session.document().unwrap(), document);
    assert_eq!(session.state(), EditorState::Ready);
}

async fn store_document(root: &std::path::Path, id: sitegen_document::SiteId) -> sitegen_document::Document {
    let store = DirectoryStore::open(root).await.unwrap();
    store.get(id).await.unwrap().unwrap().data
}
