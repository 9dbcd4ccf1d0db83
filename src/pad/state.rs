//! Port addressing and the shared per-port input store.

use super::buttons::Buttons;

/// Physical pad position on the shared bus.
///
/// Exactly two positions are wired; the mux line level selects which one
/// the next bus transaction talks to. This index space never grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Zero,
    One,
}

impl Port {
    pub fn index(self) -> usize {
        match self {
            Port::Zero => 0,
            Port::One => 1,
        }
    }

    pub fn other(self) -> Port {
        match self {
            Port::Zero => Port::One,
            Port::One => Port::Zero,
        }
    }

    /// Logic level the mux line must carry to address this port.
    pub fn mux_level(self) -> bool {
        match self {
            Port::Zero => false,
            Port::One => true,
        }
    }
}

/// Input slot for one port, as the rest of the system sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadState {
    pub buttons: Buttons,
}

/// Shared per-port input state, one slot per pad position.
///
/// Other input drivers in the system may write into these slots too, so
/// the pad driver only touches the slot of the port it just polled, and
/// only when the decoded state actually changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PadStateStore {
    ports: [PadState; 2],
}

impl PadStateStore {
    pub fn port_state(&self, port: Port) -> &PadState {
        &self.ports[port.index()]
    }

    pub fn port_state_mut(&mut self, port: Port) -> &mut PadState {
        &mut self.ports[port.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_alternate_and_map_to_levels() {
        assert_eq!(Port::Zero.other(), Port::One);
        assert_eq!(Port::One.other(), Port::Zero);
        assert!(!Port::Zero.mux_level());
        assert!(Port::One.mux_level());
    }

    #[test]
    fn slots_are_independent() {
        let mut store = PadStateStore::default();
        store.port_state_mut(Port::Zero).buttons = Buttons::A;
        assert_eq!(store.port_state(Port::Zero).buttons, Buttons::A);
        assert_eq!(store.port_state(Port::One).buttons, Buttons::NONE);
    }
}
