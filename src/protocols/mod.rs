//! Protocol decoders and encoders for consumer IR protocols.
//!
//! Each decoder consumes a complete [`PulseBuffer`] and produces an
//! [`IrCode`]. Dispatch is a table with a fixed priority
//! ([`DecoderCascade`]): the common consumer protocols first, exotics next,
//! the histogram-based universal classifier last. Whoever returns a code
//! first wins; AC protocols are reached through the universal tier's
//! bit-count heuristic rather than the cascade.
//!
//! Shared skeleton: quick length gate, header match within tolerance, one
//! symbol per bit compared against the catalogue timings, arrival-order bit
//! packing (first bit lands in the MSB), then protocol-specific validation.
//! Checksum mismatches set the `parity_failed` flag and still return the
//! code; NEC alone rejects on a failed inverse-byte pair.

mod bang_olufsen;
mod bose;
mod denon;
mod fast;
mod jvc;
mod kaseikyo;
mod lego;
mod lg;
mod magiquest;
mod nec;
mod rc5;
mod rc6;
mod samsung;
mod sony;
pub mod universal;
mod whynter;

pub use nec::{is_nec_repeat, NecDecoder, NEC_REPEAT_GATE_MS};
pub use rc5::Rc5Decoder;
pub use rc6::Rc6Decoder;
pub use samsung::{Samsung48Decoder, SamsungDecoder};
pub use sony::SonyDecoder;
pub use universal::UniversalDecoder;

use crate::catalog::{Encoding, Protocol, ProtocolSpec};
use crate::code::IrCode;
use crate::error::{Error, Result};
use crate::pulse::{PulseBuffer, TOLERANCE_PCT};

/// One fixed-timing protocol decoder.
pub trait FrameDecoder: Send + Sync {
    /// Primary protocol label this decoder produces.
    fn protocol(&self) -> Protocol;

    fn name(&self) -> &'static str {
        self.protocol().name()
    }

    /// Decode a complete buffer, or refuse it.
    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode>;
}

/// The ordered decoder table. Most common consumer protocols first, exotic
/// before universal.
pub struct DecoderCascade {
    decoders: Vec<Box<dyn FrameDecoder>>,
}

impl DecoderCascade {
    pub fn new() -> Self {
        let decoders: Vec<Box<dyn FrameDecoder>> = vec![
            // Apple and Onkyo frames are recognised inside the NEC family
            // decoder; SamsungLG inside Samsung.
            Box::new(nec::NecDecoder::new()),
            Box::new(samsung::SamsungDecoder::new()),
            Box::new(sony::SonyDecoder::new()),
            Box::new(jvc::JvcDecoder::new()),
            Box::new(lg::LgDecoder::new()),
            Box::new(denon::DenonDecoder::new()),
            Box::new(kaseikyo::KaseikyoDecoder::new()),
            Box::new(samsung::Samsung48Decoder::new()),
            Box::new(whynter::WhynterDecoder::new()),
            Box::new(lego::LegoPfDecoder::new()),
            Box::new(magiquest::MagiQuestDecoder::new()),
            Box::new(bose::BoseWaveDecoder::new()),
            Box::new(fast::FastDecoder::new()),
            Box::new(rc5::Rc5Decoder::new()),
            Box::new(rc6::Rc6Decoder::new()),
            Box::new(bang_olufsen::BangOlufsenDecoder::new()),
            Box::new(universal::UniversalDecoder::new()),
        ];
        Self { decoders }
    }

    /// Run the cascade in table order; first decoder to accept wins.
    pub fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        for decoder in &self.decoders {
            if let Some(code) = decoder.decode(buf) {
                tracing::debug!("decoded {} from {} pairs", code.describe(), buf.len());
                return Some(code);
            }
        }
        tracing::debug!("no decoder accepted a {}-pair buffer", buf.len());
        None
    }

    /// [`decode`](Self::decode) with an error instead of an Option, for
    /// callers that treat a refused buffer as a failure.
    pub fn try_decode(&self, buf: &PulseBuffer) -> Result<IrCode> {
        self.decode(buf).ok_or(Error::DecodeFailed)
    }

    pub fn list(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }
}

impl Default for DecoderCascade {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared fixed-timing decode: length gate, header, per-bit compare,
/// arrival-order packing. Returns the packed word and the bit count.
/// Biphase protocols do not come through here.
pub(crate) fn decode_frame(buf: &PulseBuffer, spec: &ProtocolSpec) -> Option<(u64, u16)> {
    let pairs = buf.as_slice();
    let has_header = spec.header_mark > 0;
    // Quick length gate: header plus one pair per bit.
    let min_len = has_header as usize + spec.nominal_bits as usize;
    if pairs.is_empty() || pairs.len() < min_len {
        return None;
    }

    let mut idx = 0;
    if has_header {
        let h = &pairs[0];
        if !h.match_mark(spec.header_mark, TOLERANCE_PCT)
            || !h.match_space(spec.header_space, TOLERANCE_PCT)
        {
            return None;
        }
        idx = 1;
    }

    let mut data: u64 = 0;
    let mut count: u16 = 0;
    while idx < pairs.len() {
        let p = &pairs[idx];
        let last = idx == pairs.len() - 1;
        let bit = match spec.encoding {
            Encoding::PulseDistance => {
                if !p.match_mark(spec.bit_mark, TOLERANCE_PCT) {
                    return None;
                }
                if p.match_space(spec.one_space, TOLERANCE_PCT) {
                    true
                } else if p.match_space(spec.zero_space, TOLERANCE_PCT) {
                    false
                } else if last {
                    // Stop symbol or trailing gap.
                    break;
                } else {
                    return None;
                }
            }
            Encoding::PulseWidth => {
                // The space half is constant filler; the final space is the
                // inter-frame gap and is not checked.
                if p.match_mark(spec.one_mark, TOLERANCE_PCT) {
                    true
                } else if p.match_mark(spec.bit_mark, TOLERANCE_PCT) {
                    false
                } else {
                    return None;
                }
            }
            Encoding::Biphase => return None,
        };
        if count == 64 {
            return None;
        }
        data = (data << 1) | bit as u64;
        count += 1;
        idx += 1;
    }

    if count == 0 {
        return None;
    }
    if spec.nominal_bits > 0 && count != spec.nominal_bits {
        return None;
    }
    Some((data, count))
}

/// Synthesise the canonical pulse train for a fixed-timing protocol: the
/// word's most significant of `bits` is emitted first. Used by the
/// transmitter's compatibility fallback and by tests.
pub(crate) fn synthesize_frame(spec: &ProtocolSpec, data: u64, bits: u16) -> PulseBuffer {
    let mut buf = PulseBuffer::new();
    if spec.header_mark > 0 {
        buf.push_pair(spec.header_mark, spec.header_space);
    }
    for i in (0..bits).rev() {
        let one = (data >> i) & 1 == 1;
        match spec.encoding {
            Encoding::PulseDistance => {
                let space = if one { spec.one_space } else { spec.zero_space };
                buf.push_pair(spec.bit_mark, space);
            }
            Encoding::PulseWidth => {
                let mark = if one { spec.one_mark } else { spec.bit_mark };
                let space = if one { spec.one_space } else { spec.zero_space };
                buf.push_pair(mark, space);
            }
            Encoding::Biphase => {}
        }
    }
    if spec.stop_bit {
        buf.push_pair(spec.bit_mark, 0);
    }
    buf
}

/// Arrival-order bytes of a packed word: byte 0 is the first eight bits
/// received.
pub(crate) fn frame_bytes(data: u64, bits: u16) -> Vec<u8> {
    let n = (bits as usize + 7) / 8;
    (0..n)
        .map(|i| {
            let shift = bits as usize - 8 * (i + 1);
            (data >> shift) as u8
        })
        .collect()
}
