/// Which electrical level means "contact closed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Inputs are pulled up; a closed contact reads low.
    #[default]
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    #[inline]
    pub fn is_active(self, high: bool) -> bool {
        match self {
            Polarity::ActiveLow => !high,
            Polarity::ActiveHigh => high,
        }
    }

    #[inline]
    pub fn level(self, active: bool) -> bool {
        match self {
            Polarity::ActiveLow => !active,
            Polarity::ActiveHigh => active,
        }
    }
}

/// One cycle's sampled levels, one entry per scan position. `true` is a high level.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputState<const N: usize> {
    levels: [bool; N],
    polarity: Polarity,
}

impl<const N: usize> Default for InputState<N> {
    fn default() -> Self {
        Self::new(Polarity::default())
    }
}

impl<const N: usize> InputState<N> {
    /// A state with every position inactive.
    pub fn new(polarity: Polarity) -> Self {
        Self {
            levels: [polarity.level(false); N],
            polarity,
        }
    }

    pub fn from_levels(levels: [bool; N], polarity: Polarity) -> Self {
        Self { levels, polarity }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn levels(&self) -> &[bool; N] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> bool {
        self.levels[index]
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.polarity.is_active(self.levels[index])
    }

    pub fn set_level(&mut self, index: usize, high: bool) {
        self.levels[index] = high;
    }

    pub fn set_active(&mut self, index: usize, active: bool) {
        self.levels[index] = self.polarity.level(active);
    }

    pub fn clear(&mut self) {
        self.levels = [self.polarity.level(false); N];
    }

    /// Write the state sequentially from position 0.
    pub fn builder(&mut self) -> ScanBuilder<'_, N> {
        ScanBuilder {
            state: self,
            position: 0,
        }
    }
}

/// Active flags for the two pseudo-pins of an encoder given its signed change since the last
/// cycle: `[turned down, turned up]`. No change leaves both inactive.
pub fn encoder_activity(delta: i32) -> [bool; 2] {
    [delta < 0, delta > 0]
}

/// Fills an [InputState] in scan order. Writes past the end are dropped.
pub struct ScanBuilder<'s, const N: usize> {
    state: &'s mut InputState<N>,
    position: usize,
}

impl<const N: usize> ScanBuilder<'_, N> {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn push(&mut self, high: bool) -> &mut Self {
        if let Some(level) = self.state.levels.get_mut(self.position) {
            *level = high;
        } else {
            crate::warn!("scan position {} out of range", self.position);
        }
        self.position += 1;
        self
    }

    pub fn push_levels(&mut self, levels: impl IntoIterator<Item = bool>) -> &mut Self {
        for high in levels {
            self.push(high);
        }
        self
    }

    /// Append the two pseudo-pins for an encoder.
    pub fn push_encoder(&mut self, delta: i32) -> &mut Self {
        let polarity = self.state.polarity;
        for active in encoder_activity(delta) {
            self.push(polarity.level(active));
        }
        self
    }
}

/// Supplies the sampled levels once per cycle.
pub trait ScanSource<const N: usize> {
    fn scan(&mut self, state: &mut InputState<N>);
}

impl<const N: usize, F: FnMut(&mut InputState<N>)> ScanSource<N> for F {
    fn scan(&mut self, state: &mut InputState<N>) {
        self(state)
    }
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod test;
