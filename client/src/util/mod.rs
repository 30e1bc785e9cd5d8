//! Utility helpers shared across client stores and front ends.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure functions live here so stores stay focused on fetch/cache flow and the
//! derived labels are unit-testable without a transport.

pub mod channels;
pub mod clock;
pub mod set_status;
