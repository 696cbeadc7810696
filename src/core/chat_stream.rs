use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use memchr::memchr;
use serde::Deserialize;

use crate::api::{ApiError, ChatSource};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded event from the streaming chat endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamFragment {
    /// A piece of the assistant's reply text.
    Content(String),
    /// Documents the reply draws on, sent ahead of the content.
    Sources(Vec<ChatSource>),
    /// Valid JSON with a shape we do not model.
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
enum TaggedFragment {
    Content(String),
    Sources(Vec<ChatSource>),
}

impl StreamFragment {
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(payload)?;
        Ok(match serde_json::from_value::<TaggedFragment>(value.clone()) {
            Ok(TaggedFragment::Content(text)) => StreamFragment::Content(text),
            Ok(TaggedFragment::Sources(sources)) => StreamFragment::Sources(sources),
            Err(_) => StreamFragment::Other(value),
        })
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            StreamFragment::Content(text) => Some(text),
            _ => None,
        }
    }
}

pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<StreamFragment, ApiError>> + Send>>;

/// Turns raw body chunks into fragments.
///
/// Every chunk is decoded and split on its own. There is no carry-over
/// buffer, so a `data: ` line that straddles two chunks is not reassembled:
/// its first half fails to parse, or the line is skipped entirely when the
/// split lands inside the prefix.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    finished: bool,
}

impl StreamDecoder {
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<StreamFragment, serde_json::Error>> {
        let mut fragments = Vec::new();
        if self.finished {
            return fragments;
        }

        let mut rest = chunk;
        while !rest.is_empty() {
            let (raw_line, next) = match memchr(b'\n', rest) {
                Some(newline_pos) => (&rest[..newline_pos], &rest[newline_pos + 1..]),
                None => (rest, &rest[rest.len()..]),
            };
            rest = next;
            let line = String::from_utf8_lossy(raw_line);
            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            if payload == DONE_SENTINEL {
                self.finished = true;
                break;
            }
            match StreamFragment::from_payload(payload) {
                Ok(fragment) => fragments.push(Ok(fragment)),
                Err(err) => {
                    fragments.push(Err(err));
                    self.finished = true;
                    break;
                }
            }
        }
        fragments
    }
}

/// Wrap a response body into a lazy fragment stream.
///
/// The stream ends at the `[DONE]` sentinel, at the end of the body, or
/// right after the first error it yields. Dropping it releases the body.
pub fn fragment_stream<S, B, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    let state = (Box::pin(body), StreamDecoder::default(), VecDeque::new());
    Box::pin(futures_util::stream::unfold(
        state,
        |(mut body, mut decoder, mut pending)| async move {
            loop {
                if let Some(item) = pending.pop_front() {
                    return Some((item, (body, decoder, pending)));
                }
                if decoder.is_finished() {
                    return None;
                }
                match body.next().await {
                    Some(Ok(chunk)) => {
                        pending.extend(
                            decoder
                                .feed(chunk.as_ref())
                                .into_iter()
                                .map(|result| result.map_err(ApiError::from)),
                        );
                    }
                    Some(Err(err)) => {
                        decoder.finish();
                        return Some((Err(err.into()), (body, decoder, pending)));
                    }
                    None => return None,
                }
            }
        },
    ))
}
