//! Ordered view over loaded tick window accounts.
//!
//! A sequence is built from the windows the caller managed to fetch, in
//! traversal order. Scans for initialized ticks never guess about data that
//! was not loaded: stepping off the covered range returns `None`, which the
//! quote engine reports as liquidity exhaustion.

use crate::constants::{MAX_TICK, MIN_TICK, TICK_WINDOW_SIZE};
use crate::error::{QuoteError, SdkResult};
use crate::types::{TickArrayReduction, TickData, TickWindow};

pub struct TickWindowSequence<'a> {
    /// Kept windows, ascending by start index.
    windows: Vec<&'a TickWindow>,
    tick_spacing: u16,
}

impl<'a> TickWindowSequence<'a> {
    /// Builds a sequence from windows in traversal order; `None` marks a
    /// window that could not be loaded.
    ///
    /// Every present window must be aligned to the window span. Windows must
    /// form a contiguous run in one direction; under
    /// [`TickArrayReduction::Conservative`] the sequence is truncated at the
    /// first gap or misordered window, under [`TickArrayReduction::No`] any
    /// such defect is an error.
    pub fn new(
        windows: &[Option<&'a TickWindow>],
        tick_spacing: u16,
        reduction: TickArrayReduction,
    ) -> SdkResult<Self> {
        let span = window_span(tick_spacing);
        for window in windows.iter().flatten() {
            if window.start_tick_index.rem_euclid(span) != 0 {
                return Err(QuoteError::InvalidTickSpacingAlignment {
                    start_tick_index: window.start_tick_index,
                    tick_spacing,
                });
            }
        }

        let mut kept: Vec<&TickWindow> = Vec::with_capacity(windows.len());
        for slot in windows {
            let window = match slot {
                Some(window) => *window,
                None => match reduction {
                    TickArrayReduction::Conservative => break,
                    TickArrayReduction::No => {
                        return Err(QuoteError::InvalidTickWindowSequence)
                    }
                },
            };
            if let Some(prev) = kept.last() {
                let step = window.start_tick_index - prev.start_tick_index;
                let direction_ok = match kept.len() {
                    1 => step == span || step == -span,
                    _ => step == kept[1].start_tick_index - kept[0].start_tick_index,
                };
                if !direction_ok {
                    match reduction {
                        TickArrayReduction::Conservative => break,
                        TickArrayReduction::No => {
                            return Err(QuoteError::InvalidTickWindowSequence)
                        }
                    }
                }
            }
            kept.push(window);
        }
        kept.sort_by_key(|window| window.start_tick_index);

        Ok(Self {
            windows: kept,
            tick_spacing,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Start index of the loaded window covering `tick_index`, if any.
    pub fn window_start_index(&self, tick_index: i32) -> Option<i32> {
        let (lower, upper) = self.covered_range()?;
        if tick_index < lower || tick_index >= upper {
            return None;
        }
        let span = window_span(self.tick_spacing);
        Some((tick_index - lower).div_euclid(span) * span + lower)
    }

    /// First initialized tick strictly above `from_tick`, or `None` once the
    /// scan leaves the loaded range.
    pub fn next_initialized_tick(&self, from_tick: i32) -> Option<(i32, &TickData)> {
        let (lower, upper) = self.covered_range()?;
        let spacing = i32::from(self.tick_spacing);
        let mut tick = from_tick.div_euclid(spacing) * spacing + spacing;
        while tick < upper && tick <= MAX_TICK {
            if tick < lower {
                return None;
            }
            let data = self.tick_data(tick)?;
            if data.liquidity_net != 0 {
                return Some((tick, data));
            }
            tick += spacing;
        }
        None
    }

    /// First initialized tick at or below `from_tick`, or `None` once the
    /// scan leaves the loaded range.
    pub fn prev_initialized_tick(&self, from_tick: i32) -> Option<(i32, &TickData)> {
        let (lower, upper) = self.covered_range()?;
        let spacing = i32::from(self.tick_spacing);
        let mut tick = from_tick.div_euclid(spacing) * spacing;
        while tick >= lower && tick >= MIN_TICK {
            if tick >= upper {
                return None;
            }
            let data = self.tick_data(tick)?;
            if data.liquidity_net != 0 {
                return Some((tick, data));
            }
            tick -= spacing;
        }
        None
    }

    fn covered_range(&self) -> Option<(i32, i32)> {
        let first = self.windows.first()?;
        let last = self.windows.last()?;
        Some((
            first.start_tick_index,
            last.start_tick_index + window_span(self.tick_spacing),
        ))
    }

    fn tick_data(&self, tick_index: i32) -> Option<&TickData> {
        let start = self.window_start_index(tick_index)?;
        let span = window_span(self.tick_spacing);
        let lower = self.windows.first()?.start_tick_index;
        let window = self.windows.get(((start - lower) / span) as usize)?;
        let offset = (tick_index - start).div_euclid(i32::from(self.tick_spacing));
        window.ticks.get(offset as usize)
    }
}

fn window_span(tick_spacing: u16) -> i32 {
    i32::from(tick_spacing) * TICK_WINDOW_SIZE as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_with(start: i32, spacing: u16, nets: &[(i32, i128)]) -> TickWindow {
        let mut window = TickWindow::new(start);
        for &(tick, net) in nets {
            let offset = (tick - start) / i32::from(spacing);
            window.ticks[offset as usize].liquidity_net = net;
        }
        window
    }

    #[test]
    fn scans_find_initialized_ticks() {
        let spacing = 2;
        let window = window_with(0, spacing, &[(0, 10), (8, -20), (96, 5)]);
        let slots = [Some(&window)];
        let sequence =
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::No).unwrap();

        assert_eq!(sequence.next_initialized_tick(0).map(|(t, _)| t), Some(8));
        assert_eq!(sequence.next_initialized_tick(7).map(|(t, _)| t), Some(8));
        assert_eq!(sequence.next_initialized_tick(8).map(|(t, _)| t), Some(96));
        // the downward scan includes the starting tick itself
        assert_eq!(sequence.prev_initialized_tick(8).map(|(t, _)| t), Some(8));
        assert_eq!(sequence.prev_initialized_tick(7).map(|(t, _)| t), Some(0));
    }

    #[test]
    fn scans_stop_at_unloaded_data() {
        let spacing = 2;
        let window = window_with(0, spacing, &[(4, 10)]);
        let slots = [Some(&window)];
        let sequence =
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::No).unwrap();

        // nothing initialized above 4 inside the loaded window, and the
        // region beyond it is unknown
        assert_eq!(sequence.next_initialized_tick(4), None);
        // downward from below the window start would read unloaded data
        assert_eq!(sequence.prev_initialized_tick(-1), None);
        // upward from below the window start never skips over the gap
        assert_eq!(sequence.next_initialized_tick(-500), None);
    }

    #[test]
    fn misaligned_window_is_rejected() {
        let spacing = 64;
        let window = window_with(100, spacing, &[]);
        let slots = [Some(&window)];
        let result = TickWindowSequence::new(&slots, spacing, TickArrayReduction::Conservative);
        assert_eq!(
            result.err(),
            Some(QuoteError::InvalidTickSpacingAlignment {
                start_tick_index: 100,
                tick_spacing: 64,
            })
        );
    }

    #[test]
    fn conservative_reduction_truncates_at_gap() {
        let spacing = 2;
        let span = window_span(spacing);
        let first = window_with(0, spacing, &[(0, 1)]);
        let third = window_with(2 * span, spacing, &[(2 * span, 1)]);
        let slots = [Some(&first), None, Some(&third)];

        let sequence =
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::Conservative).unwrap();
        assert_eq!(sequence.window_start_index(0), Some(0));
        assert_eq!(sequence.window_start_index(2 * span), None);

        assert_eq!(
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::No).err(),
            Some(QuoteError::InvalidTickWindowSequence)
        );
    }

    #[test]
    fn non_contiguous_windows_are_a_gap() {
        let spacing = 2;
        let span = window_span(spacing);
        let first = window_with(0, spacing, &[]);
        let skipped = window_with(2 * span, spacing, &[]);
        let slots = [Some(&first), Some(&skipped)];

        assert_eq!(
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::No).err(),
            Some(QuoteError::InvalidTickWindowSequence)
        );
        let sequence =
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::Conservative).unwrap();
        assert_eq!(sequence.window_start_index(2 * span), None);
    }

    #[test]
    fn descending_window_order_is_supported() {
        let spacing = 2;
        let span = window_span(spacing);
        let first = window_with(0, spacing, &[(0, 7)]);
        let second = window_with(-span, spacing, &[(-span, 9)]);
        let slots = [Some(&first), Some(&second)];
        let sequence =
            TickWindowSequence::new(&slots, spacing, TickArrayReduction::No).unwrap();

        assert_eq!(sequence.prev_initialized_tick(-1).map(|(t, _)| t), Some(-span));
        assert_eq!(sequence.window_start_index(-1), Some(-span));
    }

    #[test]
    fn empty_sequence_finds_nothing() {
        let slots: [Option<&TickWindow>; 3] = [None, None, None];
        let sequence =
            TickWindowSequence::new(&slots, 2, TickArrayReduction::Conservative).unwrap();
        assert!(sequence.is_empty());
        assert_eq!(sequence.next_initialized_tick(0), None);
        assert_eq!(sequence.prev_initialized_tick(0), None);
    }
}
