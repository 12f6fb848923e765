//! URL source: one URL per line from a file or stdin.

use std::io::IsTerminal;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Positional argument value that selects stdin.
pub const STDIN_SENTINEL: &str = "-";

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Could not open file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stdin is empty, pipe URLs in or pass a file")]
    StdinIsTerminal,
}

/// Where URLs come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInput {
    Stdin,
    File(PathBuf),
}

impl UrlInput {
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIN_SENTINEL {
            UrlInput::Stdin
        } else {
            UrlInput::File(PathBuf::from(arg))
        }
    }
}

/// Open the input and start streaming its lines.
///
/// Opening happens here so a missing file fails before any request is made.
pub async fn open(input: &UrlInput) -> Result<mpsc::Receiver<String>, SourceError> {
    match input {
        UrlInput::Stdin => {
            if std::io::stdin().is_terminal() {
                return Err(SourceError::StdinIsTerminal);
            }
            Ok(spawn_lines(BufReader::new(tokio::io::stdin())))
        }
        UrlInput::File(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| SourceError::Open {
                    path: path.clone(),
                    source,
                })?;
            Ok(spawn_lines(BufReader::new(file)))
        }
    }
}

/// Stream trimmed, non-blank lines from `reader` on a bounded channel.
///
/// Lines are split on `\n` and decoded lossily, so a line with invalid
/// UTF-8 is still sent and never cuts the stream short.
pub fn spawn_lines<R>(reader: R) -> mpsc::Receiver<String>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        let mut lines = reader.split(b'\n');
        loop {
            match lines.next_segment().await {
                Ok(Some(line)) => {
                    let line = String::from_utf8_lossy(&line);
                    let url = line.trim();
                    if url.is_empty() {
                        continue;
                    }
                    if tx.send(url.to_string()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Stopped reading URLs: {e}");
                    break;
                }
            }
        }
    });

    rx
}
