//! Input queue and output buffer serviced by `ReadIo`/`WriteIo`.

use std::collections::VecDeque;

use crate::Fault;

/// What a read on an exhausted input queue yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum InputExhaustion {
    /// Abort the run with [`Fault::InputExhausted`].
    #[default]
    Fail,
    /// Substitute a fixed fallback byte.
    ReturnByte(u8),
}

/// Per-run byte streams: input is popped front to back, output is append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoChannel {
    input: VecDeque<u8>,
    consumed: usize,
    output: Vec<u8>,
    on_exhausted: InputExhaustion,
}

impl InputExhaustion {
    /// Addressed-bus and serial default: a read past the input is fatal.
    pub const ADDRESSED: Self = Self::Fail;
    /// Separate-pin default: a read past the input yields zero.
    pub const SEPARATE_PIN: Self = Self::ReturnByte(0);
}

impl IoChannel {
    /// Creates a channel over `input` with the given exhaustion policy.
    #[must_use]
    pub fn new(input: &[u8], on_exhausted: InputExhaustion) -> Self {
        Self {
            input: input.iter().copied().collect(),
            consumed: 0,
            output: Vec::new(),
            on_exhausted,
        }
    }

    /// Pops the next input byte, falling back per policy when the queue is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InputExhausted`] when the queue is empty and the policy
    /// is [`InputExhaustion::Fail`].
    pub fn read(&mut self) -> Result<u8, Fault> {
        if let Some(byte) = self.input.pop_front() {
            self.consumed += 1;
            return Ok(byte);
        }
        match self.on_exhausted {
            InputExhaustion::ReturnByte(byte) => {
                log::trace!("input exhausted, substituting {byte:#04x}");
                Ok(byte)
            }
            InputExhaustion::Fail => Err(Fault::InputExhausted {
                consumed: self.consumed,
            }),
        }
    }

    /// Appends one byte to the output buffer.
    pub fn write(&mut self, byte: u8) {
        self.output.push(byte);
    }

    /// Output collected so far, in issue order.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consumes the channel and returns the collected output.
    #[must_use]
    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Number of input bytes not yet consumed.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }

    /// `true` when the next read will be served from the fallback byte.
    #[must_use]
    pub fn next_read_falls_back(&self) -> bool {
        self.input.is_empty() && matches!(self.on_exhausted, InputExhaustion::ReturnByte(_))
    }

    /// Active exhaustion policy.
    #[must_use]
    pub const fn exhaustion_policy(&self) -> InputExhaustion {
        self.on_exhausted
    }
}
