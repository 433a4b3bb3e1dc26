//! Built-in endpoint handlers
//!
//! | Endpoint      | Method | Behavior                                   |
//! |---------------|--------|--------------------------------------------|
//! | `/`           | GET    | empty `text/plain` 200                     |
//! | `/echo/<s>`   | GET    | `<s>` as `text/plain`                      |
//! | `/user-agent` | GET    | the client's `User-Agent` value            |
//! | `/files/<f>`  | GET    | contents of `<f>` from the files directory |
//! | `/files/<f>`  | POST   | stores the request body as `<f>`, 201      |

use crate::http::request::Request;
use crate::http::response::{ContentType, ResponseBuilder, StatusCode};
use crate::server::ServerState;
use crate::storage::StorageError;

const ECHO_PREFIX: &str = "/echo/";
const FILES_PREFIX: &str = "/files/";

/// One variant per endpoint handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Echo,
    UserAgent,
    ReadFile,
    WriteFile,
}

impl Route {
    /// Produces the response configuration for `request`.
    pub async fn handle(&self, request: &Request, state: &ServerState) -> ResponseBuilder {
        match self {
            Route::Root => root(),
            Route::Echo => echo(request),
            Route::UserAgent => user_agent(request),
            Route::ReadFile => read_file(request, state).await,
            Route::WriteFile => write_file(request, state).await,
        }
    }
}

fn root() -> ResponseBuilder {
    ResponseBuilder::new(StatusCode::Ok).content_type(ContentType::TextPlain)
}

fn echo(request: &Request) -> ResponseBuilder {
    let text = request
        .target()
        .strip_prefix(ECHO_PREFIX)
        .unwrap_or(request.target());

    ResponseBuilder::new(StatusCode::Ok)
        .content_type(ContentType::TextPlain)
        .body(text.to_string())
}

fn user_agent(request: &Request) -> ResponseBuilder {
    let agent = request.header("user-agent").unwrap_or("");

    ResponseBuilder::new(StatusCode::Ok)
        .content_type(ContentType::TextPlain)
        .body(agent.to_string())
}

async fn read_file(request: &Request, state: &ServerState) -> ResponseBuilder {
    let Some(store) = state.store() else {
        return ResponseBuilder::new(StatusCode::NotFound);
    };
    let name = file_name(request);

    match store.read(name).await {
        Ok(data) => ResponseBuilder::new(StatusCode::Ok)
            .content_type(ContentType::OctetStream)
            .body(data),
        Err(e) => storage_failure(name, e),
    }
}

async fn write_file(request: &Request, state: &ServerState) -> ResponseBuilder {
    let Some(store) = state.store() else {
        return ResponseBuilder::new(StatusCode::NotFound);
    };
    let name = file_name(request);

    match store.write(name, request.body()).await {
        Ok(()) => {
            tracing::info!(file = name, bytes = request.body().len(), "File stored");
            ResponseBuilder::new(StatusCode::Created)
        }
        Err(e) => storage_failure(name, e),
    }
}

/// `/files` without the slash carries no name and resolves to nothing.
fn file_name(request: &Request) -> &str {
    request.target().strip_prefix(FILES_PREFIX).unwrap_or("")
}

fn storage_failure(name: &str, error: StorageError) -> ResponseBuilder {
    match error {
        StorageError::NotFound => ResponseBuilder::new(StatusCode::NotFound),
        StorageError::InvalidPath(_) => {
            tracing::warn!(file = name, "Rejected file name outside the files directory");
            ResponseBuilder::new(StatusCode::NotFound)
        }
        StorageError::Io(e) => {
            tracing::error!(file = name, error = %e, "File storage failed");
            ResponseBuilder::new(StatusCode::InternalServerError)
        }
    }
}
