/*!
peripherals - bus-facing devices (spec §4.6), each implementing
[`crate::bus::device::Device`] so a [`crate::bus::Bus`] can host any
combination of them.
*/

pub mod ctc;
pub mod pio;
pub mod sio;
pub mod tarbell_fdc;
pub mod uart16550;

pub use ctc::Ctc;
pub use pio::PioPort;
pub use sio::SioChannel;
pub use tarbell_fdc::TarbellFdc;
pub use uart16550::Uart16550;
