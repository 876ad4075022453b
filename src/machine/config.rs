/*!
config.rs - In-process machine configuration (SPEC_FULL.md §1 "[AMBIENT]
Configuration"). ROM/disk *file* loading stays out of scope (spec §1);
this is just the set of plain parameters every concrete machine in
`examples/original_source/` (`linc80.c`, `smallz80.c`, `scelbi.c`,
`scmp2.c`) hardcodes at startup, lifted into an explicit struct instead.
*/

use crate::bus::RomWritePolicy;

/// Slice timing and bus policy shared by every [`crate::machine::Machine`]
/// (spec §5: "Slice length is fixed ... broken into ~100 inner iterations
/// to interleave UART/CTC polling").
#[derive(Clone, Copy, Debug)]
pub struct MachineConfig {
    /// Total t-states of CPU execution per outer-loop slice.
    pub t_states_per_slice: u32,
    /// Number of inner chunks the slice's t-state budget is split into;
    /// devices are ticked once per chunk rather than once per slice.
    pub inner_iterations: u32,
    pub rom_write_policy: RomWritePolicy,
}

impl MachineConfig {
    /// 7.3728 MHz Z80-family machines at a 5 ms slice (spec §5's own
    /// worked example: "~36,864 t-states per slice ... ~100 inner
    /// iterations of ~369 t-states each").
    pub fn z80_family_default() -> Self {
        Self {
            t_states_per_slice: 36_864,
            inner_iterations: 100,
            rom_write_policy: RomWritePolicy::Absorb,
        }
    }

    /// A slower 8008-class machine; same slice/chunk shape, scaled down.
    pub fn cpu8008_default() -> Self {
        Self {
            t_states_per_slice: 5_000,
            inner_iterations: 50,
            rom_write_policy: RomWritePolicy::Absorb,
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::z80_family_default()
    }
}
