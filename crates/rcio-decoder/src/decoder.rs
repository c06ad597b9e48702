//! Per-port pulse decoder state machine

use rcio_errors::DecodeError;
use rcio_ports::PortId;

use crate::edge::{Edge, EdgeEvent, Tick};

/// One decoded pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseReading {
    /// Port the pulse was measured on
    pub port: PortId,
    /// Time between the rising edge and the falling edge, in µs
    pub width_us: u32,
    /// Tick of the falling edge that closed the pulse
    pub tick: Tick,
}

impl PulseReading {
    /// Width as the signed bus payload.
    ///
    /// Widths above `i32::MAX` only occur for a missed rising edge across
    /// most of a counter period; they saturate.
    pub fn bus_value(&self) -> i32 {
        i32::try_from(self.width_us).unwrap_or(i32::MAX)
    }
}

/// Counters kept by a decoder since process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Readings emitted
    pub readings: u64,
    /// Falling edges dropped for lack of a rising edge
    pub unmatched_falling: u64,
    /// Rising edges replaced by a later rising edge before any falling edge
    pub rising_overwritten: u64,
}

/// Edge-timed pulse decoder for one input port.
///
/// A rising edge records its tick. A falling edge records its tick and emits
/// the wrapping difference to the latest rising tick. The rising tick is not
/// consumed, so a repeated falling edge is measured against the same rising
/// edge.
#[derive(Debug, Clone)]
pub struct PulseDecoder {
    port: PortId,
    last_rising_tick: Option<Tick>,
    last_falling_tick: Option<Tick>,
    last_edge: Option<Edge>,
    stats: DecoderStats,
}

impl PulseDecoder {
    /// Fresh decoder with no edge history.
    pub fn new(port: PortId) -> Self {
        Self {
            port,
            last_rising_tick: None,
            last_falling_tick: None,
            last_edge: None,
            stats: DecoderStats::default(),
        }
    }

    /// Port this decoder belongs to.
    pub fn port(&self) -> PortId {
        self.port
    }

    /// Feed one edge.
    ///
    /// Returns `Ok(Some(reading))` for a falling edge that closes a pulse and
    /// `Ok(None)` for a rising edge.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnmatchedEdge`] for a falling edge before any rising
    /// edge. The falling tick is still recorded; no reading is emitted.
    pub fn on_edge(&mut self, edge: Edge, tick: Tick) -> Result<Option<PulseReading>, DecodeError> {
        let previous = self.last_edge.replace(edge);
        match edge {
            Edge::Rising => {
                if previous == Some(Edge::Rising) {
                    self.stats.rising_overwritten = self.stats.rising_overwritten.saturating_add(1);
                }
                self.last_rising_tick = Some(tick);
                Ok(None)
            }
            Edge::Falling => {
                self.last_falling_tick = Some(tick);
                let Some(rising) = self.last_rising_tick else {
                    self.stats.unmatched_falling = self.stats.unmatched_falling.saturating_add(1);
                    return Err(DecodeError::UnmatchedEdge {
                        port: self.port.line(),
                        tick: tick.as_micros(),
                    });
                };
                self.stats.readings = self.stats.readings.saturating_add(1);
                Ok(Some(PulseReading {
                    port: self.port,
                    width_us: tick.since(rising),
                    tick,
                }))
            }
        }
    }

    /// Feed one routed edge event.
    ///
    /// The caller routes events by port; the event's port is not checked.
    ///
    /// # Errors
    ///
    /// See [`on_edge`](Self::on_edge).
    pub fn on_event(&mut self, event: EdgeEvent) -> Result<Option<PulseReading>, DecodeError> {
        self.on_edge(event.edge, event.tick)
    }

    /// Tick of the most recent rising edge.
    pub fn last_rising_tick(&self) -> Option<Tick> {
        self.last_rising_tick
    }

    /// Tick of the most recent falling edge.
    pub fn last_falling_tick(&self) -> Option<Tick> {
        self.last_falling_tick
    }

    /// Counters since construction.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_then_falling_emits_width() -> Result<(), Box<dyn std::error::Error>> {
        let mut decoder = PulseDecoder::new(PortId::new(23));
        assert_eq!(decoder.on_edge(Edge::Rising, Tick::new(1000))?, None);
        let reading = decoder.on_edge(Edge::Falling, Tick::new(2500))?;
        assert_eq!(
            reading,
            Some(PulseReading {
                port: PortId::new(23),
                width_us: 1500,
                tick: Tick::new(2500),
            })
        );
        assert_eq!(decoder.stats().readings, 1);
        Ok(())
    }

    #[test]
    fn test_falling_first_is_unmatched() {
        let mut decoder = PulseDecoder::new(PortId::new(5));
        let result = decoder.on_edge(Edge::Falling, Tick::new(10));
        assert_eq!(result, Err(DecodeError::UnmatchedEdge { port: 5, tick: 10 }));
        assert_eq!(decoder.last_falling_tick(), Some(Tick::new(10)));
        assert_eq!(decoder.stats().unmatched_falling, 1);
        assert_eq!(decoder.stats().readings, 0);
    }

    #[test]
    fn test_bus_value_saturates() {
        let reading = PulseReading {
            port: PortId::new(1),
            width_us: u32::MAX,
            tick: Tick::new(0),
        };
        assert_eq!(reading.bus_value(), i32::MAX);
    }
}
