use crate::message::Msg;
use std::collections::HashMap;

type Render = Box<dyn Fn(usize) -> Vec<u8>>;

/// Handle to a named position placeholder inside the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker(usize);

enum Chunk {
    Bytes(Vec<u8>),
    /// Zero-width anchor recording where a marker was set.
    Anchor(Marker),
    /// `size` reserved bytes whose final content is `render(offset)` once
    /// the marker's offset is known.
    Reservation {
        marker: Marker,
        size: usize,
        render: Render,
    },
}

/// Append-only output buffer. Text is accumulated in chunks; forward jumps
/// reserve space against a marker and are materialized by a two-pass
/// `finish` once every anchor position is known.
pub struct CodeBuffer {
    chunks: Vec<Chunk>,
    names: Vec<&'static str>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        CodeBuffer {
            chunks: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Create a fresh marker. The name only serves diagnostics.
    pub fn marker(&mut self, name: &'static str) -> Marker {
        self.names.push(name);
        Marker(self.names.len() - 1)
    }

    /// Append literal text at the current position.
    pub fn push(&mut self, text: &str) {
        if let Some(Chunk::Bytes(bytes)) = self.chunks.last_mut() {
            bytes.extend_from_slice(text.as_bytes());
        } else {
            self.chunks.push(Chunk::Bytes(text.as_bytes().to_vec()));
        }
    }

    /// Bind the marker to the current buffer length. Valid at most once per
    /// marker; a second set is an internal error caught by `finish`.
    pub fn set(&mut self, marker: Marker) {
        self.chunks.push(Chunk::Anchor(marker));
    }

    /// Reserve `size` bytes resolved against `marker`. The render function
    /// must return exactly `size` bytes.
    pub fn reserve(&mut self, marker: Marker, size: usize, render: Render) {
        self.chunks.push(Chunk::Reservation {
            marker,
            size,
            render,
        });
    }

    /// Two-pass resolution. Pass 1 walks the chunks accumulating byte counts
    /// (anchors are zero-width, reservations count as `size`) and records
    /// each marker's offset. Pass 2 materializes every reservation and
    /// concatenates. Invariant violations are reported through `msgs` and
    /// the offending slot becomes an empty buffer, so the rest of the output
    /// stays inspectable.
    pub fn finish(self, msgs: &mut Vec<Msg>) -> Vec<u8> {
        let mut offsets: HashMap<Marker, usize> = HashMap::new();
        let mut pos = 0;
        for chunk in &self.chunks {
            match chunk {
                Chunk::Bytes(bytes) => pos += bytes.len(),
                Chunk::Anchor(marker) => {
                    if offsets.contains_key(marker) {
                        msgs.push(Msg::error(
                            format!("Marker {} was set more than once", self.names[marker.0]),
                            None,
                        ));
                    } else {
                        offsets.insert(*marker, pos);
                    }
                }
                Chunk::Reservation { size, .. } => pos += size,
            }
        }

        let mut out = Vec::with_capacity(pos);
        for chunk in self.chunks {
            match chunk {
                Chunk::Bytes(bytes) => out.extend_from_slice(&bytes),
                Chunk::Anchor(_) => {}
                Chunk::Reservation {
                    marker,
                    size,
                    render,
                } => match offsets.get(&marker) {
                    Some(&offset) => {
                        let bytes = render(offset);
                        if bytes.len() == size {
                            out.extend_from_slice(&bytes);
                        } else {
                            msgs.push(Msg::error(
                                format!(
                                    "Marker {} rendered {} bytes, expected {}",
                                    self.names[marker.0],
                                    bytes.len(),
                                    size
                                ),
                                None,
                            ));
                        }
                    }
                    None => {
                        msgs.push(Msg::error(
                            format!("Marker {} was never set", self.names[marker.0]),
                            None,
                        ));
                    }
                },
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::has_error;

    #[test]
    fn forward_reference_resolves_to_set_position() {
        let mut msgs = Vec::new();
        let mut buf = CodeBuffer::new();
        let target = buf.marker("target");
        buf.push("head\n");
        buf.reserve(target, 11, Box::new(|off| format!("JMP {:.>6}\n", off).into_bytes()));
        buf.push("body\n");
        buf.set(target);
        buf.push("tail\n");
        let out = buf.finish(&mut msgs);
        // head(5) + jump(11) + body(5) = 21
        assert_eq!(out, b"head\nJMP ....21\nbody\ntail\n");
        assert!(msgs.is_empty());
    }

    #[test]
    fn backward_reference_resolves() {
        let mut msgs = Vec::new();
        let mut buf = CodeBuffer::new();
        let target = buf.marker("target");
        buf.set(target);
        buf.push("loop\n");
        buf.reserve(target, 11, Box::new(|off| format!("JMP {:.>6}\n", off).into_bytes()));
        let out = buf.finish(&mut msgs);
        assert_eq!(out, b"loop\nJMP .....0\n");
        assert!(msgs.is_empty());
    }

    #[test]
    fn unset_marker_reports_and_substitutes_empty() {
        let mut msgs = Vec::new();
        let mut buf = CodeBuffer::new();
        let target = buf.marker("dangling");
        buf.push("a\n");
        buf.reserve(target, 11, Box::new(|off| format!("JMP {:.>6}\n", off).into_bytes()));
        buf.push("b\n");
        let out = buf.finish(&mut msgs);
        assert_eq!(out, b"a\nb\n");
        assert!(has_error(&msgs));
        assert!(msgs[0].text().contains("never set"));
    }

    #[test]
    fn render_size_mismatch_reports_and_substitutes_empty() {
        let mut msgs = Vec::new();
        let mut buf = CodeBuffer::new();
        let target = buf.marker("bad");
        buf.set(target);
        buf.reserve(target, 4, Box::new(|_| b"way too long".to_vec()));
        let out = buf.finish(&mut msgs);
        assert!(out.is_empty());
        assert!(has_error(&msgs));
        assert!(msgs[0].text().contains("expected 4"));
    }

    #[test]
    fn double_set_reports_and_keeps_first() {
        let mut msgs = Vec::new();
        let mut buf = CodeBuffer::new();
        let target = buf.marker("twice");
        buf.set(target);
        buf.push("x\n");
        buf.set(target);
        buf.reserve(target, 11, Box::new(|off| format!("JMP {:.>6}\n", off).into_bytes()));
        let out = buf.finish(&mut msgs);
        assert_eq!(out, b"x\nJMP .....0\n");
        assert!(has_error(&msgs));
        assert!(msgs[0].text().contains("more than once"));
    }
}
