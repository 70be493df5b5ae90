use kvseed_commands::command::Input;
use tokio::io::AsyncReadExt as _;

use crate::error::{KvseedError, KvseedResult};

/// Read the whole properties document.
///
/// The input is consumed completely before the store is touched, so an
/// unreadable file never leaves a cleared subtree behind. Bytes that are not
/// valid UTF-8 (ISO-8859-1 files, for instance) become U+FFFD instead of
/// failing the run.
pub async fn read(input: &Input) -> KvseedResult<String> {
    let result = match input {
        Input::Stdin => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await.map(|_| buf)
        }
        Input::File(path) => tokio::fs::read(path).await,
    };

    let bytes = result.map_err(|source| KvseedError::Input {
        input: input.to_string(),
        source,
    })?;

    Ok(decode(input, bytes))
}

fn decode(input: &Input, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::warn!(%input, "Input is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}
