//! Seam between the protocol core and the board's serial byte FIFOs.
//!
//! The core never owns the link hardware. Received bytes are exposed as
//! a contiguous prefix via [`Transport::input_peek`] and consumed with
//! [`Transport::input_pop`]; outgoing frames are written into a
//! reservation obtained from [`Transport::output_reserve`] and published
//! with [`Transport::output_commit`]. Interrupt handlers may append to
//! the input FIFO, but the prefix visible to the core must stay stable
//! for the duration of one poll.

pub trait Transport {
    /// Contiguous view of the bytes received so far.
    fn input_peek(&self) -> &[u8];

    /// Consume `count` bytes from the front of the input.
    fn input_pop(&mut self, count: usize);

    /// Best-effort reservation of `count` bytes of output space.
    ///
    /// Returns `None` when the link is saturated; the caller drops the
    /// message and relies on host retransmission. A reservation that is
    /// never committed is abandoned; the next reserve replaces it.
    fn output_reserve(&mut self, count: usize) -> Option<&mut [u8]>;

    /// Publish the first `count` bytes of the last reservation.
    fn output_commit(&mut self, count: usize);
}
