use std::pin::pin;

use futures::{Stream, StreamExt as _};
use kvseed_core::{publish, KvStore, ParsedLine, PathPrefix, PublishEvent, PublishSummary};

use crate::output::CommandOutput;

/// Publish the parsed lines and describe every step as an output row.
///
/// Malformed lines are reported and skipped before the store is touched.
/// Clearing the subtree is logged but not printed; a failed clear does not
/// stop the run.
pub fn run<'a, S>(
    store: &'a S,
    prefix: &'a PathPrefix,
    parsed: Vec<ParsedLine>,
) -> impl Stream<Item = CommandOutput> + 'a
where
    S: KvStore + 'a,
{
    async_stream::stream! {
        let mut entries = Vec::with_capacity(parsed.len());
        let mut skipped = 0usize;

        for ParsedLine { line_number, result } in parsed {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(line_number, error = %e, "Skipping malformed line");
                    yield CommandOutput::error("parse", &format!("line {line_number}: {e}"));
                }
            }
        }

        tracing::info!(%prefix, entries = entries.len(), "Publishing");

        let mut summary = PublishSummary::default();
        let mut events = pin!(publish(store, prefix, entries));

        while let Some(event) = events.next().await {
            summary.record(&event);

            match event {
                PublishEvent::Cleared { .. } | PublishEvent::ClearFailed { .. } => {}
                PublishEvent::Written(entry) => {
                    yield CommandOutput::result("put")
                        .with_field("key", entry.key)
                        .with_field("value", entry.value)
                        .with_human_readable_template("{key} = {value}");
                }
                PublishEvent::WriteFailed { entry, error } => {
                    yield CommandOutput::error("put", &format!("{}: {error}", entry.key));
                }
            }
        }

        yield CommandOutput::result("summary")
            .with_field("prefix", prefix.to_string())
            .with_field("cleared", summary.cleared)
            .with_field("written", summary.written)
            .with_field("failed", summary.failed)
            .with_field("skipped", skipped)
            .with_human_readable_template(
                "Published {written} entries under {prefix} ({failed} failed, {skipped} skipped)",
            );
    }
}

#[cfg(test)]
mod tests {
    use kvseed_core::{parse_str, MemoryStore};
    use serde_json::Value;

    use super::*;
    use crate::output::CommandOutputType;

    async fn collect(store: &MemoryStore, input: &str) -> Vec<CommandOutput> {
        let prefix = PathPrefix::new("dev", "myapp", "alice");
        let parsed = parse_str(input, &prefix).collect();
        run(store, &prefix, parsed).collect().await
    }

    fn field<'a>(output: &'a CommandOutput, name: &str) -> &'a Value {
        match &output.output {
            CommandOutputType::Result { fields, .. } => fields
                .iter()
                .find_map(|(key, value)| (*key == name).then_some(value))
                .unwrap(),
            other => panic!("not a result row: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rows_for_each_entry_and_summary() {
        let store = MemoryStore::new();

        let outputs = collect(&store, "# header\ndb.host=localhost # c\ndb.port=5432\n").await;

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].stage, "put");
        assert_eq!(field(&outputs[0], "key"), "config/dev/myapp/alice/db/host");
        assert_eq!(field(&outputs[0], "value"), "localhost");
        assert_eq!(outputs[2].stage, "summary");
        assert_eq!(field(&outputs[2], "written"), 2);
        assert_eq!(field(&outputs[2], "cleared"), true);
    }

    #[tokio::test]
    async fn test_malformed_lines_are_reported_and_skipped() {
        let store = MemoryStore::new();

        let outputs = collect(&store, "a=1\nnot a property\n=x\nb=2\n").await;

        let errors: Vec<_> = outputs
            .iter()
            .filter(|o| !o.success)
            .map(|o| match &o.output {
                CommandOutputType::Error(message) => message.clone(),
                other => panic!("unexpected row: {other:?}"),
            })
            .collect();
        assert_eq!(
            errors,
            vec![
                "line 2: Missing '=' between key and value".to_string(),
                "line 3: Key is empty".to_string(),
            ]
        );

        let summary = outputs.last().unwrap();
        assert_eq!(field(summary, "written"), 2);
        assert_eq!(field(summary, "skipped"), 2);
        assert_eq!(store.data().len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_row() {
        let store = MemoryStore::new().reject_key("config/dev/myapp/alice/a");

        let outputs = collect(&store, "a=1\nb=2\n").await;

        assert!(!outputs[0].success);
        assert_eq!(outputs[0].stage, "put");
        assert!(outputs[1].success);
        assert_eq!(field(&outputs[1], "key"), "config/dev/myapp/alice/b");

        let summary = outputs.last().unwrap();
        assert_eq!(field(summary, "failed"), 1);
        assert_eq!(field(summary, "written"), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let store = MemoryStore::with_data([("config/dev/myapp/alice/old", "x")]);

        let outputs = collect(&store, "\n# nothing\n").await;

        assert_eq!(outputs.len(), 1);
        assert_eq!(field(&outputs[0], "written"), 0);
        assert!(store.data().is_empty());
    }
}
