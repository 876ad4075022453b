//! Minimal demonstration binary: initializes logging and runs a few
//! slices of the `scelbi_like` preset machine. CLI argument parsing,
//! ROM/disk loading and any rendering/audio backend are out of scope
//! (spec §1) and are not implemented here.

use retrocore::machine::presets;

fn main() {
    env_logger::init();

    let mut machine = presets::scelbi_like();
    log::info!("retrocore demo: running an 8008-class machine for 10 slices");
    for slice in 0..10 {
        if machine.core.is_halted() {
            log::info!("halted at pc={:#06x} after {slice} slice(s)", machine.core.pc());
            break;
        }
        match machine.run_slice() {
            Ok(t_states) => log::debug!("slice {slice}: {t_states} t-states"),
            Err(err) => {
                log::error!("fatal: {err}");
                std::process::exit(1);
            }
        }
    }
}
