//! Pull-based buffering shared by the byte and character stream adapters.

use log::trace;

use crate::cursor::EventCursor;
use crate::error::{Error, Result};
use crate::event::{EventType, XmlEvent};
use crate::writer::{write_event, ChunkEncoder, EventSerializer, EventWriter};

/// Turns cursor events into a stream of output units.
///
/// Events are pulled only when the staging buffer cannot satisfy a read.
/// Serialized output first lands in the serializer's chunk, then moves into
/// the fixed-size staging buffer, from which reads are served.
///
/// A failure is reported only after every unit serialized before it has been
/// read, so the output preceding an error does not depend on read sizes.
pub(crate) struct ChunkedAdapter<C, E: ChunkEncoder> {
    cursor: C,
    sink: EventSerializer<E>,
    staging: Box<[E::Unit]>,
    /// Units currently staged; never exceeds `staging.len()`.
    bpos: usize,
    started: bool,
    /// Set when the cursor was handed over past the start of the document.
    fragment: bool,
    /// Failure to report once the staged output is drained.
    failure: Option<Error>,
}

impl<C: EventCursor, E: ChunkEncoder> ChunkedAdapter<C, E> {
    pub(crate) fn new(cursor: C, sink: EventSerializer<E>, buffer_size: usize) -> Self {
        ChunkedAdapter {
            cursor,
            sink,
            staging: vec![E::Unit::default(); buffer_size.max(1)].into_boxed_slice(),
            bpos: 0,
            started: false,
            fragment: false,
            failure: None,
        }
    }

    pub(crate) fn buffer_size(&self) -> usize {
        self.staging.len()
    }

    pub(crate) fn into_cursor(self) -> C {
        self.cursor
    }

    /// Makes at least `requested` units available in the staging buffer if
    /// the document still has them. Returns the number of staged units; zero
    /// means the stream is exhausted.
    fn ensure_buffering(&mut self, requested: usize) -> Result<usize> {
        if self.bpos >= requested {
            return Ok(self.bpos);
        }

        if !self.started {
            self.started = true;
            if let Err(err) = self.start() {
                self.failure = Some(err);
            }
        }

        let capacity = self.staging.len();
        while self.failure.is_none()
            && self.sink.len() < capacity - self.bpos
            && self.cursor.has_next()
        {
            if let Err(err) = self.pull() {
                self.failure = Some(err);
            }
        }

        let moved = self.sink.drain_into(&mut self.staging[self.bpos..]);
        self.bpos += moved;
        trace!(
            "staged {} units ({} buffered, {} pending in chunk)",
            moved,
            self.bpos,
            self.sink.len()
        );

        if self.bpos == 0 {
            if let Some(err) = self.failure.take() {
                self.failure = Some(err.repeat());
                return Err(err);
            }
        }
        Ok(self.bpos)
    }

    fn start(&mut self) -> Result<()> {
        match self.cursor.event_type() {
            EventType::StartDocument => self.sink.write_start_document(),
            // A cursor handed over mid-document still owes its current event.
            _ => {
                self.fragment = true;
                dispatch(&mut self.sink, self.cursor.current(), true)
            }
        }
    }

    fn pull(&mut self) -> Result<()> {
        self.cursor.next()?;
        dispatch(&mut self.sink, self.cursor.current(), self.fragment)
    }

    /// Fills `dst` from the stream. Returns the number of units copied, which
    /// is less than `dst.len()` only at the end of the stream or ahead of a
    /// failure. A failure is returned only when nothing was copied.
    pub(crate) fn read_units(&mut self, dst: &mut [E::Unit]) -> Result<usize> {
        let mut copied = 0;
        while copied < dst.len() {
            let wanted = dst.len() - copied;
            let staged = match self.ensure_buffering(wanted) {
                Ok(staged) => staged,
                Err(err) if copied > 0 => {
                    self.failure = Some(err);
                    break;
                }
                Err(err) => return Err(err),
            };
            if staged == 0 {
                break;
            }
            let n = staged.min(wanted);
            dst[copied..copied + n].copy_from_slice(&self.staging[..n]);
            self.staging.copy_within(n..self.bpos, 0);
            self.bpos -= n;
            copied += n;
        }
        Ok(copied)
    }
}

/// Writes one event. In a fragment, end tags of elements opened before the
/// cursor was handed over are dropped.
fn dispatch<E: ChunkEncoder>(
    sink: &mut EventSerializer<E>,
    event: &XmlEvent,
    fragment: bool,
) -> Result<()> {
    if fragment && sink.depth() == 0 && matches!(event, XmlEvent::EndElement { .. }) {
        trace!("dropping end tag opened before the fragment: {}", event);
        return Ok(());
    }
    write_event(sink, event)
}
