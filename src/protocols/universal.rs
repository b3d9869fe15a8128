//! Histogram-based universal decoder for unknown pulse-distance and
//! pulse-width signals.
//!
//! Marks and spaces (header and stop symbol excluded) are binned into 50 us
//! buckets over 0..10 ms, each histogram is aggregated into at most two
//! clusters, and the cluster shape classifies the encoding:
//!
//! - two mark clusters, one space cluster  -> pulse width
//! - one mark cluster, two space clusters  -> pulse distance
//! - two and two                           -> pulse distance
//! - one and one, or more than two         -> cannot decode
//!
//! The discriminating half is thresholded at the midpoint between the short
//! and long cluster representatives; bits pack LSB-first. Address and
//! command are not extractable without protocol knowledge and stay zero.

use super::FrameDecoder;
use crate::catalog::Protocol;
use crate::code::IrCode;
use crate::pulse::PulseBuffer;

/// Bin width. A tuning parameter: widen if the pulse source's resolution is
/// coarser.
const BIN_US: u32 = 50;
const BIN_COUNT: usize = 200; // 0..10 ms
const MIN_BITS: usize = 8;
const MAX_BITS: usize = 64;

/// A histogram cluster: representative duration and population.
#[derive(Debug, Clone, Copy)]
struct Cluster {
    rep_us: u32,
    count: u32,
}

/// Aggregate a bin histogram into clusters. A run ends at the array end or
/// after two empty adjacent bins; the representative bin is the rounded
/// count-weighted average. More than `max` clusters aborts (biphase or
/// noise).
fn aggregate(hist: &[u32; BIN_COUNT], max: usize) -> Option<Vec<Cluster>> {
    let mut clusters = Vec::new();
    let mut count = 0u32;
    let mut weighted = 0u64;
    let mut empty_run = 0usize;

    for (idx, &n) in hist.iter().enumerate() {
        if n > 0 {
            count += n;
            weighted += n as u64 * idx as u64;
            empty_run = 0;
        } else if count > 0 {
            empty_run += 1;
            if empty_run >= 2 {
                let rep_bin = ((weighted + count as u64 / 2) / count as u64) as u32;
                clusters.push(Cluster {
                    rep_us: rep_bin * BIN_US + BIN_US / 2,
                    count,
                });
                if clusters.len() > max {
                    return None;
                }
                count = 0;
                weighted = 0;
            }
        }
    }
    if count > 0 {
        let rep_bin = ((weighted + count as u64 / 2) / count as u64) as u32;
        clusters.push(Cluster {
            rep_us: rep_bin * BIN_US + BIN_US / 2,
            count,
        });
    }
    if clusters.len() > max {
        return None;
    }
    Some(clusters)
}

fn in_range(duration_us: u32) -> bool {
    duration_us > 0 && (duration_us / BIN_US) < BIN_COUNT as u32
}

pub struct UniversalDecoder;

impl UniversalDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDecoder for UniversalDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::PulseDistance
    }

    fn name(&self) -> &'static str {
        "Universal"
    }

    fn decode(&self, buf: &PulseBuffer) -> Option<IrCode> {
        // 2 durations per pair; need 2*MIN_BITS + 4 entries.
        if buf.len() < MIN_BITS + 2 {
            return None;
        }

        let mut marks = [0u32; BIN_COUNT];
        let mut spaces = [0u32; BIN_COUNT];
        // Skip the header pair; the final space is the stop/gap and falls
        // out of range on its own.
        let data_pairs = &buf.as_slice()[1..];
        for p in data_pairs {
            if in_range(p.mark_us) {
                marks[(p.mark_us / BIN_US) as usize] += 1;
            }
            if in_range(p.space_us) {
                spaces[(p.space_us / BIN_US) as usize] += 1;
            }
        }

        let mark_clusters = aggregate(&marks, 2)?;
        let space_clusters = aggregate(&spaces, 2)?;

        let (protocol, threshold_us) = match (mark_clusters.len(), space_clusters.len()) {
            (2, 1) => (
                Protocol::PulseWidth,
                (mark_clusters[0].rep_us + mark_clusters[1].rep_us) / 2,
            ),
            (1, 2) | (2, 2) => (
                Protocol::PulseDistance,
                (space_clusters[0].rep_us + space_clusters[1].rep_us) / 2,
            ),
            _ => {
                tracing::debug!(
                    "universal: unclassifiable shape ({} mark / {} space clusters)",
                    mark_clusters.len(),
                    space_clusters.len()
                );
                return None;
            }
        };

        let mut data = 0u64;
        let mut bits = 0usize;
        for (i, p) in data_pairs.iter().enumerate() {
            let half = match protocol {
                Protocol::PulseWidth => p.mark_us,
                _ => p.space_us,
            };
            if !in_range(half) {
                // The stop symbol's trailing gap; only legal on the last pair.
                if i == data_pairs.len() - 1 {
                    break;
                }
                return None;
            }
            if bits == MAX_BITS {
                return None;
            }
            // LSB-first: first data bit lands in bit 0.
            if half > threshold_us {
                data |= 1u64 << bits;
            }
            bits += 1;
        }
        if bits < MIN_BITS {
            return None;
        }

        let mut code = IrCode::decoded(protocol, data, bits as u16);
        code.carrier_hz = crate::code::DEFAULT_CARRIER_HZ;
        tracing::debug!(
            "universal: {} {} bits, threshold {} us",
            protocol.name(),
            bits,
            threshold_us
        );
        Some(code)
    }
}

impl Default for UniversalDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pulse::PulsePair;

    fn pd_buffer(data: u64, bits: usize) -> PulseBuffer {
        let mut buf = PulseBuffer::new();
        buf.push_pair(9000, 4500);
        for i in 0..bits {
            let space = if (data >> i) & 1 == 1 { 1690 } else { 560 };
            buf.push_pair(560, space);
        }
        buf.push_pair(560, 0); // stop
        buf
    }

    #[test]
    fn pulse_distance_classification_recovers_the_bit_string() {
        let buf = pd_buffer(0xA5A5A, 20);
        let code = UniversalDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::PulseDistance);
        assert_eq!(code.bits, 20);
        assert_eq!(code.data, 0xA5A5A);
        assert_eq!(code.address, 0);
        assert_eq!(code.command, 0);
    }

    #[test]
    fn pulse_width_classification() {
        let mut buf = PulseBuffer::new();
        buf.push_pair(2400, 600);
        let data = 0xCA5u64;
        for i in 0..12 {
            let mark = if (data >> i) & 1 == 1 { 1200 } else { 600 };
            buf.push_pair(mark, 600);
        }
        let code = UniversalDecoder::new().decode(&buf).unwrap();
        assert_eq!(code.protocol, Protocol::PulseWidth);
        assert_eq!(code.bits, 12);
        assert_eq!(code.data, 0xCA5);
    }

    #[test]
    fn three_cluster_histogram_fails_classification() {
        // Spaces drawn from three well-separated populations (biphase-ish).
        let mut buf = PulseBuffer::new();
        buf.push_pair(9000, 4500);
        for i in 0..18 {
            let space = match i % 3 {
                0 => 500,
                1 => 1500,
                _ => 3000,
            };
            buf.push_pair(560, space);
        }
        buf.push_pair(560, 0);
        assert!(UniversalDecoder::new().decode(&buf).is_none());
    }

    #[test]
    fn single_cluster_pair_cannot_decode() {
        let mut buf = PulseBuffer::new();
        buf.push_pair(9000, 4500);
        for _ in 0..16 {
            buf.push_pair(560, 560);
        }
        buf.push_pair(560, 0);
        assert!(UniversalDecoder::new().decode(&buf).is_none());
    }

    #[test]
    fn too_short_buffers_are_refused() {
        let buf = pd_buffer(0x5, 4);
        assert!(UniversalDecoder::new().decode(&buf).is_none());
    }
}
