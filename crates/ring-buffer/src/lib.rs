//! Bounded Ring Buffer
//!
//! Fixed-capacity FIFO windows backing every temporal filter in the
//! pipeline (gaze histories, emotion windows, smoothing windows).

mod buffer;

pub use buffer::RingBuffer;
