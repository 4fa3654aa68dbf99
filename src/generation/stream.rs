//! Consuming streamed text generation.

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::AgentError;
use crate::types::*;

/// Collect a stream into a final result.
pub async fn collect_stream(
    stream: BoxStream<'static, Result<TextStreamDelta, AgentError>>,
) -> Result<StreamTextResult, AgentError> {
    collect_stream_with(stream, |_| {}).await
}

/// Collect a stream, handing each non-empty text chunk to `on_delta` as it arrives.
pub async fn collect_stream_with(
    mut stream: BoxStream<'static, Result<TextStreamDelta, AgentError>>,
    on_delta: impl Fn(&str),
) -> Result<StreamTextResult, AgentError> {
    let mut result = StreamTextResult::default();

    while let Some(delta) = stream.next().await {
        let delta = delta?;
        if !delta.text.is_empty() {
            on_delta(&delta.text);
        }
        result.text.push_str(&delta.text);
        if let Some(u) = delta.usage {
            result.usage = u;
        }
        if let Some(fr) = delta.finish_reason {
            result.finish_reason = Some(fr);
        }
    }

    Ok(result)
}
