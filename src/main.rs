use canbeacon::bus::MmioBus;
use canbeacon::node::{BeaconConfig, BeaconNode, SpinDelay};

/// CAN controller register window
const CAN_CONTROLLER_BASE: usize = 0x4000_0000;

/// Console register window
const CONSOLE_BASE: usize = 0xE000_0000;

fn main() {
    // Safety: fixed device windows on the target memory map, each owned by
    // exactly one bus for the life of the process
    let controller_bus = unsafe { MmioBus::new(CAN_CONTROLLER_BASE) };
    let console_bus = unsafe { MmioBus::new(CONSOLE_BASE) };

    let mut node =
        match BeaconNode::new(BeaconConfig::default(), controller_bus, console_bus, SpinDelay) {
            Ok(node) => node,
            Err(e) => {
                eprintln!("beacon init failed: {e}");
                std::process::exit(1);
            }
        };

    if let Err(e) = node.open().and_then(|()| node.run()) {
        eprintln!("beacon stopped: {e}");
        std::process::exit(1);
    }
}
