//! Main LSP server implementation.

use lsp_server::Connection;
use lsp_types::{
    CompletionOptions, HoverProviderCapability, InitializeParams, InitializeResult,
    ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
};

use crate::config::Config;
use crate::handlers::completion::trigger_characters;
use crate::main_loop::run_main_loop;

/// The LSP server.
pub struct Server {
    /// Connection to the LSP client.
    connection: Connection,
    /// Initialize parameters from client.
    init_params: InitializeParams,
    /// Settings from the initialization options.
    config: Config,
}

impl Server {
    /// Create a new LSP server from an initialized connection.
    pub fn new(connection: Connection, init_params: InitializeParams) -> Self {
        let config =
            Config::from_initialization_options(init_params.initialization_options.clone());
        Self {
            connection,
            init_params,
            config,
        }
    }

    /// The configuration in effect.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Run the server's main loop until the client disconnects.
    pub fn run(self) {
        tracing::info!("Starting hledger Language Server v{}", crate::VERSION);

        if let Some(folder) = self
            .init_params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
        {
            tracing::info!("Workspace root: {}", folder.uri.as_str());
        }
        tracing::info!(
            "Filesystem root: {}, include depth limit: {}",
            self.config.filesystem_root.display(),
            self.config.max_include_depth
        );

        let (sender, receiver) = (self.connection.sender, self.connection.receiver);
        run_main_loop(receiver, sender, &self.config);

        tracing::info!("Server shutdown complete");
    }
}

/// The capabilities announced in the initialize response.
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(trigger_characters()),
            ..Default::default()
        }),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        ..Default::default()
    }
}

/// Perform the initialize handshake on `connection` and serve it.
///
/// Returns once the client side of the connection has gone away.
pub fn serve(connection: Connection) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (id, params) = connection.initialize_start()?;
    let init_params: InitializeParams = serde_json::from_value(params)?;

    let init_result = InitializeResult {
        capabilities: server_capabilities(),
        server_info: Some(ServerInfo {
            name: "hledger-lsp".to_string(),
            version: Some(crate::VERSION.to_string()),
        }),
    };

    connection.initialize_finish(id, serde_json::to_value(init_result)?)?;

    tracing::info!("LSP initialized successfully");

    Server::new(connection, init_params).run();
    Ok(())
}

/// Start the LSP server using stdio transport.
pub fn start_stdio() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Starting LSP server on stdio");

    let (connection, io_threads) = Connection::stdio();
    serve(connection)?;
    io_threads.join()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        let capabilities = server_capabilities();
        assert_eq!(
            capabilities.text_document_sync,
            Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL))
        );
        assert_eq!(
            capabilities.hover_provider,
            Some(HoverProviderCapability::Simple(true))
        );

        let Some(CompletionOptions {
            trigger_characters: Some(triggers),
            ..
        }) = capabilities.completion_provider
        else {
            panic!("completion is not advertised");
        };
        assert!(triggers.contains(&":".to_string()));
        assert!(triggers.contains(&" ".to_string()));
        assert!(capabilities.definition_provider.is_none());
    }

    #[test]
    fn test_server_reads_initialization_options() {
        let (connection, _client) = Connection::memory();
        let init_params = InitializeParams {
            initialization_options: Some(serde_json::json!({ "maxIncludeDepth": 5 })),
            ..Default::default()
        };
        let server = Server::new(connection, init_params);
        assert_eq!(server.config().max_include_depth, 5);
    }
}
