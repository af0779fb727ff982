//! Request command: one JSON request in, one JSON response out.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use slotbook_protocol::{Request, encode_message, read_message};
use slotbook_server::RequestHandler;
use tracing::debug;

use crate::error::ClientResult;

/// Reads a request from `input` (`-` for stdin), handles it and writes the
/// response to stdout.
pub async fn run(handler: &RequestHandler, input: &Path, grace: Duration) -> ClientResult<()> {
    let request: Request = if input.as_os_str() == "-" {
        read_message(io::stdin().lock())?
    } else {
        read_message(File::open(input)?)?
    };
    let body = handle(handler, request, grace).await?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

/// Handles one decoded request and returns the encoded response.
pub async fn handle(
    handler: &RequestHandler,
    request: Request,
    grace: Duration,
) -> ClientResult<Vec<u8>> {
    debug!(request_type = request.kind(), "Handling request from input");
    let (response, sync) = handler.handle_with_sync(&request).await;
    super::settle_crm_sync(sync, grace).await;
    Ok(encode_message(&response)?)
}

/// Reads and handles a request from any reader.
pub async fn handle_reader<R: Read>(
    handler: &RequestHandler,
    reader: R,
    grace: Duration,
) -> ClientResult<Vec<u8>> {
    let request: Request = read_message(reader)?;
    handle(handler, request, grace).await
}
