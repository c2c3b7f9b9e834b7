//! Server-Sent Events subscribe stream
//!
//! Each `GET /notifications/:channel_id` opens a `Connection` and returns a
//! stream that forwards the connection's events as SSE frames. The
//! connection lives inside the stream: when the client goes away axum drops
//! the stream, the connection drops with it and leaves the channel.

use std::convert::Infallible;

use async_stream::stream;
use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures::Stream;
use tracing::debug;

use crate::auth::Principal;
use crate::broker::StreamEvent;
use crate::client::Connection;
use crate::transport::http::AppState;

pub(crate) async fn subscribe(
    Principal(principal): Principal,
    Path(channel_id): Path<String>,
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (connection, mut rx) = Connection::open(state.registry.clone(), &channel_id, &principal);

    debug!(subscriber = %connection.id(), "opening event stream");

    let stream = stream! {
        // Dropped together with the stream, which unsubscribes.
        let _connection = connection;

        while let Some(event) = rx.recv().await {
            yield Ok::<_, Infallible>(to_sse_event(&event));
        }
    };

    Sse::new(stream)
}

/// Frame a `StreamEvent` for the wire.
///
/// SSE is line based, so carriage returns are folded into line feeds; each
/// line then becomes its own `data:` field.
pub fn to_sse_event(event: &StreamEvent) -> Event {
    let data = event.data().replace("\r\n", "\n").replace('\r', "\n");
    Event::default().event(event.event_type()).data(data)
}
