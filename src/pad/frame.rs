//! Raw status frames and their decoding.
//!
//! A pad reports its state as a short byte frame; only bytes 4 and 5 carry
//! the button bits, active-low. Raw bytes stay inside this module, the rest
//! of the driver only ever sees the decoded [`Buttons`] value.

use super::buttons::Buttons;
use tracing::trace;

/// Backing size of every frame, regardless of how many bytes the wire
/// read delivered.
pub const MAX_FRAME_LEN: usize = 8;

const STATUS_0: usize = 4;
const STATUS_1: usize = 5;
const TRAILER_0: usize = 6;
const TRAILER_1: usize = 7;

/// One raw status report, freshly read from a pad and owned by the
/// current poll cycle.
///
/// Always backed by an 8-byte buffer; a 6-byte wire read leaves the two
/// trailer positions zeroed, which makes the trailer substitution below
/// well-defined for both frame sizes.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame {
    bytes: [u8; MAX_FRAME_LEN],
}

impl RawFrame {
    /// Copies up to 8 freshly read bytes, zero-padding the rest.
    pub fn new(data: &[u8]) -> Self {
        debug_assert!(data.len() <= MAX_FRAME_LEN);
        let mut bytes = [0u8; MAX_FRAME_LEN];
        let len = data.len().min(MAX_FRAME_LEN);
        bytes[..len].copy_from_slice(&data[..len]);
        Self { bytes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("frame decoded to the impossible all-buttons state")]
    CorruptFrame,
}

/// Decodes a raw frame into the logical button set.
///
/// Rejects frames that map to all eight buttons held at once; that state
/// cannot come from real hardware and latching it would flood the input
/// layer with phantom presses.
pub fn decode(frame: &RawFrame) -> Result<Buttons, DecodeError> {
    let (status_0, status_1) = repair(frame);

    let mut buttons = Buttons::NONE;
    // Active-low: a cleared bit means pressed.
    if status_1 & 0x01 == 0 {
        buttons |= Buttons::UP;
    }
    if status_0 & 0x40 == 0 {
        buttons |= Buttons::DOWN;
    }
    if status_1 & 0x02 == 0 {
        buttons |= Buttons::LEFT;
    }
    if status_0 & 0x80 == 0 {
        buttons |= Buttons::RIGHT;
    }
    if status_0 & 0x10 == 0 {
        buttons |= Buttons::SELECT;
    }
    if status_0 & 0x04 == 0 {
        buttons |= Buttons::START;
    }
    if status_1 & 0x10 == 0 {
        buttons |= Buttons::A;
    }
    if status_1 & 0x40 == 0 {
        buttons |= Buttons::B;
    }

    if buttons == Buttons::ALL {
        return Err(DecodeError::CorruptFrame);
    }
    Ok(buttons)
}

/// Known corruption pattern: some pads return both status bytes as 0x00
/// when they have no valid sample this cycle. Read literally that would
/// mean "everything pressed" under the active-low mapping, so each status
/// byte is substituted with its trailer byte when that carries data, else
/// with 0xff (idle). Only this exact pattern is repaired; other corrupt
/// shapes fall through to the all-buttons rejection in [`decode`].
fn repair(frame: &RawFrame) -> (u8, u8) {
    let mut status_0 = frame.bytes[STATUS_0];
    let mut status_1 = frame.bytes[STATUS_1];

    if status_0 == 0 && status_1 == 0 {
        trace!("zeroed status bytes, substituting trailer");
        status_0 = match frame.bytes[TRAILER_0] {
            0 => 0xff,
            byte => byte,
        };
        status_1 = match frame.bytes[TRAILER_1] {
            0 => 0xff,
            byte => byte,
        };
    }

    (status_0, status_1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_status(status_0: u8, status_1: u8) -> RawFrame {
        RawFrame::new(&[0x80, 0x80, 0x80, 0x80, status_0, status_1])
    }

    #[test]
    fn idle_frame_decodes_to_no_buttons() {
        let buttons = decode(&frame_with_status(0xff, 0xff)).unwrap();
        assert!(buttons.is_empty());
    }

    #[test]
    fn active_low_bit_mapping() {
        // Clearing one bit presses exactly one button.
        let cases = [
            (0xff, !0x01u8, Buttons::UP),
            (!0x40u8, 0xff, Buttons::DOWN),
            (0xff, !0x02u8, Buttons::LEFT),
            (!0x80u8, 0xff, Buttons::RIGHT),
            (!0x10u8, 0xff, Buttons::SELECT),
            (!0x04u8, 0xff, Buttons::START),
            (0xff, !0x10u8, Buttons::A),
            (0xff, !0x40u8, Buttons::B),
        ];
        for (status_0, status_1, expected) in cases {
            let buttons = decode(&frame_with_status(status_0, status_1)).unwrap();
            assert_eq!(buttons, expected, "status {status_0:02x}/{status_1:02x}");
        }
    }

    #[test]
    fn decoding_is_pure() {
        let frame = frame_with_status(0xfb, 0xef);
        let first = decode(&frame).unwrap();
        let second = decode(&frame).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Buttons::START | Buttons::A);
    }

    #[test]
    fn all_zero_frame_means_no_buttons() {
        // Six-byte frame of zeroes: status and trailer all empty, so the
        // substituted status bytes default to 0xff (idle).
        let buttons = decode(&RawFrame::new(&[0x00; 6])).unwrap();
        assert!(buttons.is_empty());
    }

    #[test]
    fn zeroed_status_takes_trailer_bytes() {
        let raw = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x20];
        let substituted = decode(&RawFrame::new(&raw)).unwrap();
        // Feeding the trailer bytes in directly as status must agree.
        let direct = decode(&frame_with_status(0x10, 0x20)).unwrap();
        assert_eq!(substituted, direct);
    }

    #[test]
    fn zeroed_status_with_one_empty_trailer_byte() {
        let raw = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20];
        let substituted = decode(&RawFrame::new(&raw)).unwrap();
        let direct = decode(&frame_with_status(0xff, 0x20)).unwrap();
        assert_eq!(substituted, direct);
    }

    #[test]
    fn all_buttons_frame_is_rejected() {
        // All mapped bits clear, but the status bytes are not the zero
        // pair, so the repair path stays out of the way.
        let result = decode(&frame_with_status(0x01, 0x04));
        assert_eq!(result, Err(DecodeError::CorruptFrame));
    }
}
