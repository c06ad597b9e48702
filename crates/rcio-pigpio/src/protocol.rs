//! pigpiod socket protocol
//!
//! Commands are four little-endian `u32` words. The daemon echoes the first
//! three and replaces the fourth with a signed result; negative results are
//! pigpio error codes. A notification socket streams fixed size reports
//! carrying the level of all bank 1 lines.

use rcio_decoder::Edge;

/// Command codes.
pub mod commands {
    /// Set line mode
    pub const MODES: u32 = 0;
    /// Set pull resistor
    pub const PUD: u32 = 2;
    /// Start servo pulses
    pub const SERVO: u32 = 8;
    /// Read bank 1 levels
    pub const BR1: u32 = 10;
    /// Begin notifications for a bit mask
    pub const NB: u32 = 19;
    /// Close a notification handle
    pub const NC: u32 = 21;
    /// Open a notification handle on the current socket
    pub const NOIB: u32 = 99;
}

/// Notification report flags.
pub mod report_flags {
    /// Watchdog timeout on the line in the low bits
    pub const WATCHDOG: u16 = 1 << 5;
    /// Keep-alive with no level change
    pub const ALIVE: u16 = 1 << 6;
    /// Event trigger in the low bits
    pub const EVENT: u16 = 1 << 7;
}

/// One request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// Command code
    pub cmd: u32,
    /// First parameter
    pub p1: u32,
    /// Second parameter
    pub p2: u32,
    /// Extension length, always zero for the commands used here
    pub p3: u32,
}

impl CommandFrame {
    /// Frame size in bytes.
    pub const SIZE: usize = 16;

    /// Frame with no extension.
    pub const fn new(cmd: u32, p1: u32, p2: u32) -> Self {
        Self { cmd, p1, p2, p3: 0 }
    }

    /// Encode the frame.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buffer = [0u8; Self::SIZE];
        let words = [self.cmd, self.p1, self.p2, self.p3];
        for (chunk, word) in buffer.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        buffer
    }
}

/// One reply frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame {
    /// Echoed command code
    pub cmd: u32,
    /// Echoed first parameter
    pub p1: u32,
    /// Echoed second parameter
    pub p2: u32,
    /// Result word, negative on failure
    pub result: i32,
}

impl ResponseFrame {
    /// Frame size in bytes.
    pub const SIZE: usize = 16;

    /// Decode a reply.
    pub fn decode(bytes: &[u8; Self::SIZE]) -> Self {
        let [c0, c1, c2, c3, a0, a1, a2, a3, b0, b1, b2, b3, r0, r1, r2, r3] = *bytes;
        Self {
            cmd: u32::from_le_bytes([c0, c1, c2, c3]),
            p1: u32::from_le_bytes([a0, a1, a2, a3]),
            p2: u32::from_le_bytes([b0, b1, b2, b3]),
            result: i32::from_le_bytes([r0, r1, r2, r3]),
        }
    }

    /// Result word read as unsigned, for commands returning a bit mask.
    pub fn result_bits(&self) -> u32 {
        u32::from_le_bytes(self.result.to_le_bytes())
    }

    /// Encode a reply, as the daemon would.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        CommandFrame {
            cmd: self.cmd,
            p1: self.p1,
            p2: self.p2,
            p3: self.result_bits(),
        }
        .encode()
    }
}

/// One notification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationReport {
    /// Report sequence number
    pub seqno: u16,
    /// Report flags, zero for a plain level sample
    pub flags: u16,
    /// Microsecond tick of the sample
    pub tick: u32,
    /// Levels of lines 0..=31
    pub level: u32,
}

impl NotificationReport {
    /// Report size in bytes.
    pub const SIZE: usize = 12;

    /// Decode a report.
    pub fn decode(bytes: &[u8; Self::SIZE]) -> Self {
        let [s0, s1, f0, f1, t0, t1, t2, t3, l0, l1, l2, l3] = *bytes;
        Self {
            seqno: u16::from_le_bytes([s0, s1]),
            flags: u16::from_le_bytes([f0, f1]),
            tick: u32::from_le_bytes([t0, t1, t2, t3]),
            level: u32::from_le_bytes([l0, l1, l2, l3]),
        }
    }

    /// Encode a report, as the daemon would.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buffer = [0u8; Self::SIZE];
        let (seqno, rest) = buffer.split_at_mut(2);
        let (flags, rest) = rest.split_at_mut(2);
        let (tick, level) = rest.split_at_mut(4);
        seqno.copy_from_slice(&self.seqno.to_le_bytes());
        flags.copy_from_slice(&self.flags.to_le_bytes());
        tick.copy_from_slice(&self.tick.to_le_bytes());
        level.copy_from_slice(&self.level.to_le_bytes());
        buffer
    }

    /// Whether this report is a level sample.
    pub fn is_level_sample(&self) -> bool {
        self.flags == 0
    }
}

/// Lines in `mask` whose level differs between two samples, with the edge
/// that produced the new level, in ascending line order.
pub fn level_changes(previous: u32, current: u32, mask: u32) -> impl Iterator<Item = (u32, Edge)> {
    let changed = (previous ^ current) & mask;
    (0u32..32)
        .filter(move |line| changed & (1 << line) != 0)
        .map(move |line| (line, Edge::from_level(current & (1 << line) != 0)))
}

/// Text for a pigpio error code.
pub fn error_text(code: i32) -> &'static str {
    match code {
        -1 => "pigpio initialisation failed",
        -2 => "gpio not 0-31",
        -3 => "gpio not 0-53",
        -4 => "mode not 0-7",
        -5 => "level not 0-1",
        -6 => "pud not 0-2",
        -8 => "pulsewidth not 0 or 500-2500",
        -24 => "no handle available",
        -25 => "unknown handle",
        -41 => "no permission to update gpio",
        -93 => "gpio is not in use for servo pulses",
        _ => "unknown error",
    }
}
