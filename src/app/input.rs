use winit::event::ElementState;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSwitch {
    Next,
    Previous,
}

/// Clip-switch key edges collected between two ticks
#[derive(Debug, Default)]
pub struct InputState {
    next_pressed: bool,
    previous_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key event; returns true if it was a clip-switch key
    pub fn on_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) -> bool {
        let pressed = state == ElementState::Pressed && !repeat;
        match key {
            KeyCode::KeyT => self.next_pressed |= pressed,
            KeyCode::KeyG => self.previous_pressed |= pressed,
            _ => return false,
        }
        true
    }

    /// Consume this tick's request. `T` wins when both keys were pressed.
    pub fn take_switch(&mut self) -> Option<ClipSwitch> {
        let switch = if self.next_pressed {
            Some(ClipSwitch::Next)
        } else if self.previous_pressed {
            Some(ClipSwitch::Previous)
        } else {
            None
        };
        self.next_pressed = false;
        self.previous_pressed = false;
        switch
    }
}
