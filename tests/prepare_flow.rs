//! End-to-end preparation flow over the bundled backends

use std::sync::Arc;

use editor_prepare::document::{DocumentRef, DocumentType, LocaleResolver, UserIdentity};
use editor_prepare::prepare::{PrepareDeps, PrepareRequest, PrepareService, TokenSigner};
use editor_prepare::services::{
    BundleCatalog, ContentStore, EditorUrls, FsContentStore, FsTemplateSource,
    InMemoryContentStore, InMemoryTemplateSource, StaticDirectory,
};
use editor_prepare::PrepareError;

const BASE: &str = "http://gateway.local";
const SECRET: &str = "integration-secret-that-is-long-enough";

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn memory_service(store: Arc<InMemoryContentStore>, signer: Option<TokenSigner>) -> PrepareService {
    let directory = StaticDirectory::new([UserIdentity {
        id: "jdoe".to_string(),
        first_name: Some("Jane".to_string()),
        last_name: Some("Doe".to_string()),
    }]);
    let templates = InMemoryTemplateSource::new("en")
        .with_template("docx", "en", &b"empty-docx"[..])
        .with_template("xlsx", "en", &b"empty-xlsx"[..])
        .with_template("xlsx", "de", &b"leere-xlsx"[..]);

    PrepareService::new(PrepareDeps {
        store,
        directory: Arc::new(directory),
        catalog: Arc::new(BundleCatalog::builtin()),
        templates: Arc::new(templates),
        urls: EditorUrls::new(format!("{}/callback", BASE), "http://docs.local/"),
        locales: LocaleResolver::new("en"),
        signer,
        max_name_attempts: 100,
    })
}

fn request(node_ref: &str, new_mime: Option<&str>, locale: &str) -> PrepareRequest {
    PrepareRequest {
        node_ref: Some(node_ref.to_string()),
        new_mime: new_mime.map(str::to_string),
        user_id: "jdoe".to_string(),
        locale: locale.to_string(),
    }
}

#[tokio::test]
async fn test_open_existing_text_document() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let folder = store.add_container("shared");
    let report = store.add_document(&folder, "Report.docx", DOCX, &b"report"[..]);
    let service = memory_service(Arc::clone(&store), None);

    let descriptor = service
        .prepare(request(report.as_str(), None, "en"))
        .await
        .unwrap();

    assert_eq!(descriptor.document_type, DocumentType::Text);
    assert_eq!(descriptor.document.title, "Report.docx");
    assert_eq!(descriptor.document.file_type, "docx");
    assert!(descriptor.document.editable());
    assert_eq!(
        descriptor.editor_config.callback_url,
        "http://gateway.local/callback?nodeRef=shared%2FReport.docx"
    );
    assert_eq!(descriptor.editor_config.user.name, "Jane Doe");
    assert!(!descriptor.is_signed());

    let wire = serde_json::to_value(&descriptor).unwrap();
    assert_eq!(wire["type"], "desktop");
    assert_eq!(wire["documentType"], "text");
    assert_eq!(wire["editorConfig"]["mode"], "edit");
    assert_eq!(wire["onlyofficeUrl"], "http://docs.local/");
}

#[tokio::test]
async fn test_new_spreadsheet_avoids_taken_name() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let folder = store.add_container("shared");
    store.add_document(&folder, "New spreadsheet.xlsx", XLSX, &b"taken"[..]);
    let service = memory_service(Arc::clone(&store), None);

    let descriptor = service
        .prepare(request(folder.as_str(), Some(XLSX), "en-US"))
        .await
        .unwrap();

    assert_eq!(descriptor.document.title, "New spreadsheet (1).xlsx");
    assert_eq!(descriptor.document_type, DocumentType::Spreadsheet);

    let created = DocumentRef::new("shared/New spreadsheet (1).xlsx");
    assert_eq!(&store.read(&created).await.unwrap()[..], b"empty-xlsx");
}

#[tokio::test]
async fn test_new_document_uses_requested_locale() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let folder = store.add_container("shared");
    let service = memory_service(Arc::clone(&store), None);

    let descriptor = service
        .prepare(request(folder.as_str(), Some(XLSX), "de-DE"))
        .await
        .unwrap();

    assert_eq!(descriptor.editor_config.language, "de-DE");
    let created = DocumentRef::new(format!("shared/{}", descriptor.document.title));
    assert_eq!(&store.read(&created).await.unwrap()[..], b"leere-xlsx");
}

#[tokio::test]
async fn test_unknown_extension_is_rejected() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let folder = store.add_container("shared");
    let node = store.add_document(&folder, "data.xyz", "application/octet-stream", &b"?"[..]);
    let service = memory_service(Arc::clone(&store), None);

    let err = service
        .prepare(request(node.as_str(), None, "en"))
        .await
        .unwrap_err();
    assert!(matches!(err, PrepareError::UnclassifiedDocumentType(ref ext) if ext == "xyz"));
    assert_eq!(err.status_code().as_u16(), 415);
}

#[tokio::test]
async fn test_missing_node_ref_is_invalid() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let service = memory_service(store, None);

    let err = service.prepare(PrepareRequest::default()).await.unwrap_err();
    assert!(matches!(err, PrepareError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_signed_descriptor_verifies() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let folder = store.add_container("shared");
    let report = store.add_document(&folder, "Budget.xlsx", XLSX, &b"numbers"[..]);
    let signer = TokenSigner::new(SECRET.to_string()).unwrap();
    let service = memory_service(Arc::clone(&store), Some(signer.clone()));

    let first = service
        .prepare(request(report.as_str(), None, "en"))
        .await
        .unwrap();
    let second = service
        .prepare(request(report.as_str(), None, "en"))
        .await
        .unwrap();

    assert!(service.signing_enabled());
    assert!(signer.verify_descriptor(&first).unwrap());
    assert_eq!(first.signature, second.signature);

    let mut tampered = first.clone();
    tampered.editor_config.user.id = "mallory".to_string();
    assert!(!signer.verify_descriptor(&tampered).unwrap());
}

#[tokio::test]
async fn test_filesystem_backends_create_and_open() {
    let content = tempfile::tempdir().unwrap();
    let templates = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(content.path().join("projects")).unwrap();
    std::fs::create_dir_all(templates.path().join("en")).unwrap();
    std::fs::write(templates.path().join("en/new.docx"), b"blank-docx").unwrap();
    std::fs::write(content.path().join("projects/New document.docx"), b"x").unwrap();

    let store: Arc<dyn ContentStore> = Arc::new(FsContentStore::new(content.path(), BASE));
    let service = PrepareService::new(PrepareDeps {
        store: Arc::clone(&store),
        directory: Arc::new(StaticDirectory::default()),
        catalog: Arc::new(BundleCatalog::builtin()),
        templates: Arc::new(FsTemplateSource::new(templates.path(), "en")),
        urls: EditorUrls::new(format!("{}/callback", BASE), "http://docs.local/"),
        locales: LocaleResolver::new("en"),
        signer: None,
        max_name_attempts: 10,
    });

    let descriptor = service
        .prepare(request("projects", Some(DOCX), "fr"))
        .await
        .unwrap();

    // fr has no template on disk; the default locale's is used
    let title = descriptor.document.title.clone();
    assert!(title.ends_with(".docx"));
    assert_eq!(
        std::fs::read(content.path().join("projects").join(&title)).unwrap(),
        b"blank-docx"
    );
    assert_eq!(descriptor.editor_config.user.name, "jdoe");
}

#[tokio::test]
async fn test_missing_template_leaves_no_node() {
    let store = Arc::new(InMemoryContentStore::new(BASE));
    let folder = store.add_container("shared");
    let service = memory_service(Arc::clone(&store), None);
    let before = store.len();

    let pptx = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
    let err = service
        .prepare(request(folder.as_str(), Some(pptx), "en"))
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::TemplateUnavailable(_)));
    assert_eq!(store.len(), before);
}
