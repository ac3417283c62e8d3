//! Main event loop for the LSP server.
//!
//! Notifications keep the document cache in sync with the editor and are
//! handled in arrival order. Requests are answered against the journal as it
//! stands after every notification received before them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use hledger_loader::{DocumentCache, FileSystem, OsFileSystem, ParserCache, RevisionCounter};
use lsp_server::{ErrorCode, Message, Notification, Request, Response};
use lsp_types::notification::{
    DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument, Notification as _,
};
use lsp_types::request::{Completion, HoverRequest, Request as _, Shutdown};
use lsp_types::{
    CompletionParams, CompletionResponse, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, HoverParams, Uri,
};

use crate::config::Config;
use crate::error::RequestError;
use crate::handlers::completion::handle_completion;
use crate::handlers::hover::handle_hover;

/// Convert a document URI to the path used as the document cache key.
///
/// Only `file://` URIs are supported. The leading `/` of the path is
/// removed, so `file:///home/me/main.journal` becomes `home/me/main.journal`.
pub fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    let path = uri.as_str().strip_prefix("file://")?;
    Some(PathBuf::from(path.strip_prefix('/').unwrap_or(path)))
}

/// State of the main loop.
pub struct MainLoopState {
    /// Contents of open documents, falling back to the filesystem.
    documents: Arc<DocumentCache>,
    /// Parse results keyed by path.
    parser_cache: ParserCache,
    /// Source of cancellation contexts, bumped on every document change.
    revisions: RevisionCounter,
    /// Channel to send messages to the client.
    sender: Sender<Message>,
    /// Whether shutdown was requested.
    shutdown_requested: bool,
}

impl MainLoopState {
    /// Create a new main loop state reading unopened files from disk.
    pub fn new(sender: Sender<Message>, config: &Config) -> Self {
        Self::with_file_system(
            sender,
            config,
            OsFileSystem::new(config.filesystem_root.clone()),
        )
    }

    /// Create a new main loop state reading unopened files from `fs`.
    pub fn with_file_system(
        sender: Sender<Message>,
        config: &Config,
        fs: impl FileSystem + 'static,
    ) -> Self {
        let documents = Arc::new(DocumentCache::new(fs));
        let parser_cache = ParserCache::new(Arc::clone(&documents))
            .with_max_include_depth(config.max_include_depth);
        Self {
            documents,
            parser_cache,
            revisions: RevisionCounter::new(),
            sender,
            shutdown_requested: false,
        }
    }

    /// Whether the client has sent a shutdown request.
    pub const fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Handle an LSP message.
    pub fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::Request(req) => self.handle_request(req),
            Message::Notification(notif) => self.handle_notification(notif),
            Message::Response(_resp) => {
                // We don't send requests to the client
            }
        }
    }

    /// Handle an LSP request (expects response).
    fn handle_request(&mut self, req: Request) {
        let id = req.id.clone();
        let method = req.method.clone();

        let result = match method.as_str() {
            Shutdown::METHOD => {
                self.shutdown_requested = true;
                Ok(serde_json::Value::Null)
            }
            Completion::METHOD => self.handle_completion_request(req),
            HoverRequest::METHOD => self.handle_hover_request(req),
            _ => {
                tracing::warn!("Unhandled request: {}", method);
                let message = format!("Unhandled request: {method}");
                self.send(Message::Response(Response::new_err(
                    id,
                    ErrorCode::MethodNotFound as i32,
                    message,
                )));
                return;
            }
        };

        let response = match result {
            Ok(value) => Response::new_ok(id, value),
            Err(err) => {
                tracing::warn!("Request {} failed: {}", method, err);
                Response::new_err(id, err.code() as i32, err.to_string())
            }
        };

        self.send(Message::Response(response));
    }

    /// Handle the textDocument/completion request.
    fn handle_completion_request(&self, req: Request) -> Result<serde_json::Value, RequestError> {
        let params: CompletionParams =
            serde_json::from_value(req.params).map_err(RequestError::InvalidParams)?;

        let position = params.text_document_position;
        let path = document_path(&position.text_document.uri)?;
        let ctx = self.revisions.context();

        let list = handle_completion(&self.parser_cache, &ctx, &path, position.position)?;

        serde_json::to_value(CompletionResponse::List(list)).map_err(RequestError::Serialize)
    }

    /// Handle the textDocument/hover request.
    fn handle_hover_request(&self, req: Request) -> Result<serde_json::Value, RequestError> {
        let params: HoverParams =
            serde_json::from_value(req.params).map_err(RequestError::InvalidParams)?;

        let position = params.text_document_position_params;
        let path = document_path(&position.text_document.uri)?;
        let ctx = self.revisions.context();

        let hover = handle_hover(&self.parser_cache, &ctx, &path, position.position)?;

        serde_json::to_value(hover).map_err(RequestError::Serialize)
    }

    /// Handle an LSP notification (no response expected).
    fn handle_notification(&mut self, notif: Notification) {
        match notif.method.as_str() {
            DidOpenTextDocument::METHOD => {
                match serde_json::from_value::<DidOpenTextDocumentParams>(notif.params) {
                    Ok(params) => self.on_did_open(params),
                    Err(err) => tracing::warn!("Malformed didOpen: {}", err),
                }
            }
            DidChangeTextDocument::METHOD => {
                match serde_json::from_value::<DidChangeTextDocumentParams>(notif.params) {
                    Ok(params) => self.on_did_change(params),
                    Err(err) => tracing::warn!("Malformed didChange: {}", err),
                }
            }
            DidCloseTextDocument::METHOD => {
                match serde_json::from_value::<DidCloseTextDocumentParams>(notif.params) {
                    Ok(params) => self.on_did_close(params),
                    Err(err) => tracing::warn!("Malformed didClose: {}", err),
                }
            }
            "initialized" => {
                tracing::info!("Client initialized");
            }
            "exit" => {
                tracing::info!("Exit notification received");
                std::process::exit(if self.shutdown_requested { 0 } else { 1 });
            }
            _ => {
                tracing::debug!("Unhandled notification: {}", notif.method);
            }
        }
    }

    /// Handle textDocument/didOpen notification.
    fn on_did_open(&mut self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("Document opened: {}", uri.as_str());

        if let Some(path) = self.path_or_warn(&uri) {
            self.store(path, params.text_document.text);
        }
    }

    /// Handle textDocument/didChange notification.
    fn on_did_change(&mut self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the first change carries the whole document
        let Some(change) = params.content_changes.into_iter().next() else {
            return;
        };

        tracing::debug!("Document changed: {}", uri.as_str());

        if let Some(path) = self.path_or_warn(&uri) {
            self.store(path, change.text);
        }
    }

    /// Handle textDocument/didClose notification.
    fn on_did_close(&mut self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::info!("Document closed: {}", uri.as_str());

        if let Some(path) = self.path_or_warn(&uri) {
            self.documents.delete(&path);
            self.invalidate(&path);
        }
    }

    /// Replace the buffered contents of `path`.
    fn store(&self, path: PathBuf, text: String) {
        self.invalidate(&path);
        self.documents.set(path, text);
    }

    /// Drop the cached parse of `path` and cancel in-flight work.
    fn invalidate(&self, path: &Path) {
        self.parser_cache.remove(path);
        let revision = self.revisions.bump();
        tracing::debug!("Revision {} after change to {}", revision, path.display());
    }

    fn path_or_warn(&self, uri: &Uri) -> Option<PathBuf> {
        let path = uri_to_path(uri);
        if path.is_none() {
            tracing::warn!("Ignoring non-file document: {}", uri.as_str());
        }
        path
    }

    /// Send a message to the client.
    fn send(&self, msg: Message) {
        if let Err(e) = self.sender.send(msg) {
            tracing::error!("Failed to send message: {}", e);
        }
    }
}

fn document_path(uri: &Uri) -> Result<PathBuf, RequestError> {
    uri_to_path(uri).ok_or_else(|| RequestError::UnsupportedUri(uri.as_str().to_string()))
}

/// Run the main event loop until the client disconnects.
pub fn run_main_loop(receiver: Receiver<Message>, sender: Sender<Message>, config: &Config) {
    let mut state = MainLoopState::new(sender, config);

    tracing::info!("Main loop started");

    for msg in receiver {
        state.handle_message(msg);
    }

    tracing::info!("Main loop ended");
}
