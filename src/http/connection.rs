use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use crate::http::encoding::negotiate;
use crate::http::parser::{parse_request, ParseError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::ServerState;

pub struct Connection<S> {
    stream: BufReader<S>,
    shared: Arc<ServerState>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, shared: Arc<ServerState>) -> Self {
        Self {
            stream: BufReader::new(stream),
            shared,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(Some(req)) => {
                        self.state = ConnectionState::Processing(req);
                    }
                    Ok(None) => {
                        self.state = ConnectionState::Closed;
                    }
                    Err(e) if e.is_protocol_error() => {
                        tracing::warn!(error = %e, "Rejecting malformed request");
                        let writer = ResponseWriter::new(&Response::bad_request());
                        self.state = ConnectionState::Writing(writer, false);
                    }
                    Err(ParseError::UnexpectedEof) => {
                        tracing::debug!("Client went away mid-request");
                        self.state = ConnectionState::Closed;
                    }
                    Err(e) => {
                        return Err(anyhow::anyhow!("HTTP read error: {}", e));
                    }
                },

                ConnectionState::Processing(req) => {
                    let (response, keep_alive) = Self::handle_request(req, &self.shared).await;

                    let writer = ResponseWriter::new(&response);
                    self.state = ConnectionState::Writing(writer, keep_alive);
                }

                ConnectionState::Writing(writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if *keep_alive {
                        self.state = ConnectionState::Reading; // go back for next request
                    } else {
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads the next request.
    ///
    /// `Ok(None)` means the client closed the connection between requests
    /// or stayed idle past the read timeout.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        let limits = self.shared.config().limits;
        let read_timeout = self.shared.config().read_timeout;
        let parse = parse_request(&mut self.stream, &limits);

        let result = match read_timeout {
            Some(limit) => match tokio::time::timeout(limit, parse).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!(timeout = ?limit, "Closing idle connection");
                    return Ok(None);
                }
            },
            None => parse.await,
        };

        match result {
            Ok(request) => Ok(Some(request)),
            Err(ParseError::ConnectionClosed) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn handle_request(req: &Request, shared: &ServerState) -> (Response, bool) {
        let encoding = negotiate(req.header("accept-encoding"), &shared.config().encodings);
        tracing::debug!(encoding = ?encoding, "Negotiated content encoding");

        let keep_alive = req.keep_alive();
        let mut builder = shared.router().dispatch(req, shared).await.encoding(encoding);
        if !keep_alive {
            builder = builder.header("Connection", "close");
        }

        let response = builder.build();
        tracing::info!(
            method = %req.method(),
            path = %req.target(),
            status = response.status.as_u16(),
            bytes = response.body.len(),
            "Request served"
        );

        (response, keep_alive)
    }
}
