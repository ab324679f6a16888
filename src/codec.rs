//! Byte-stuffing framing codec.
//!
//! A sentinel `sync` byte always resynchronizes a receiver, and an `esc`
//! byte escapes any payload byte that would otherwise collide with `sync`
//! or `esc` on the wire, transforming it by `(b - 1) & 0xff` so an escaped
//! payload byte can never itself equal `sync`/`esc`.

/// Stateful byte-stuffing encoder/decoder pair.
///
/// The production instance uses `sync = 0xff`, `esc = 0xfd`; the pair is
/// configurable because the protocol's own test vectors exercise
/// `sync = 0xe0`, `esc = 0xd0`.
pub struct Codec {
    sync: u8,
    esc: u8,
    decoder_escaping: bool,
    encoder_in_transaction: bool,
}

impl Codec {
    pub fn new(sync: u8, esc: u8) -> Self {
        Codec {
            sync,
            esc,
            decoder_escaping: false,
            encoder_in_transaction: false,
        }
    }

    /// Reset both encoder and decoder state, e.g. on (re)connection.
    pub fn reset(&mut self) {
        self.reset_decoder();
        self.reset_encoder();
    }

    pub fn reset_decoder(&mut self) {
        self.decoder_escaping = false;
    }

    pub fn reset_encoder(&mut self) {
        self.encoder_in_transaction = false;
    }

    /// Encode `data`, emitting a leading `sync` if this is the first call
    /// since the last `finalize` (or construction/reset). Does not end the
    /// logical frame; call `finalize` for the last chunk of a frame.
    pub fn encode(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() + 2);
        if !self.encoder_in_transaction {
            out.push(self.sync);
            self.encoder_in_transaction = true;
        }
        for &b in data {
            if b == self.sync || b == self.esc {
                out.push(self.esc);
                out.push(b.wrapping_sub(1));
            } else {
                out.push(b);
            }
        }
        out
    }

    /// Encode the final chunk of a frame and end the transaction, so the
    /// next `encode` call starts a fresh frame with a new leading `sync`.
    pub fn finalize(&mut self, data: &[u8]) -> Vec<u8> {
        let out = self.encode(data);
        self.encoder_in_transaction = false;
        out
    }

    /// Decode an arbitrary chunk, returning the ordered sequence of
    /// payload fragments split at `sync` boundaries. An empty `data`
    /// yields an empty sequence; a lone `sync` yields one empty fragment.
    pub fn decode(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        if data.is_empty() {
            return Vec::new();
        }

        let mut result = Vec::new();
        let mut cur = Vec::new();

        for &b in data {
            if b == self.sync {
                if self.decoder_escaping {
                    log::warn!("sync received after escape; dangling escape dropped");
                }
                self.reset_decoder();
                if !cur.is_empty() {
                    result.push(std::mem::take(&mut cur));
                }
            } else if b == self.esc {
                if self.decoder_escaping {
                    log::warn!("escape received after escape; new escape byte ignored");
                } else {
                    self.decoder_escaping = true;
                }
            } else if self.decoder_escaping {
                cur.push(b.wrapping_add(1));
                self.decoder_escaping = false;
            } else {
                cur.push(b);
            }
        }
        result.push(cur);
        result
    }
}
