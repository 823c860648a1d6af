// src/io/input.rs

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::TriggerEvent;
use crate::message::into_message;

/// Read NDJSON events from `reader` and forward them as inputs.
///
/// Blank lines are skipped, unparsable lines are logged and skipped. At end
/// of input a shutdown (with `remove_on_eof`) is sent.
pub fn spawn_line_reader<R>(
    reader: R,
    tx: mpsc::Sender<TriggerEvent>,
    remove_on_eof: bool,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut line_no = 0usize;

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read input; stopping reader");
                    break;
                }
            };
            line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let value: Value = match serde_json::from_str(trimmed) {
                Ok(v) => v,
                Err(err) => {
                    warn!(line = line_no, error = %err, "skipping unparsable input line");
                    continue;
                }
            };

            if tx.send(TriggerEvent::Input(into_message(value))).await.is_err() {
                debug!("event channel closed; input reader ends");
                return;
            }
        }

        debug!(lines = line_no, "end of input");
        let _ = tx
            .send(TriggerEvent::Shutdown {
                remove: remove_on_eof,
            })
            .await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn forwards_events_and_shuts_down_at_eof() {
        let input: &'static [u8] = b"{\"payload\":1}\n\nnot json\n\"bare\"\n";
        let (tx, mut rx) = mpsc::channel(8);
        spawn_line_reader(input, tx, true).await.unwrap();

        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        assert_eq!(
            events,
            vec![
                TriggerEvent::Input(into_message(json!({"payload": 1}))),
                TriggerEvent::Input(into_message(json!({"payload": "bare"}))),
                TriggerEvent::Shutdown { remove: true },
            ]
        );
    }
}
