/// Direction buttons, as bits of [`Keypad::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left = 1 << 0,
    Right = 1 << 1,
    Up = 1 << 2,
    Down = 1 << 3,
}

impl Button {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];
}

/// Pressed state of the buttons. A held button acts on every frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    state: u8,
}

impl Keypad {
    /// All buttons released.
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0 }
    }

    pub const fn set_button(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.state |= button as u8;
        } else {
            self.state &= !(button as u8);
        }
    }

    #[must_use]
    pub const fn is_pressed(&self, button: Button) -> bool {
        self.state & button as u8 != 0
    }

    /// One bit per pressed button.
    #[must_use]
    pub const fn state(&self) -> u8 {
        self.state
    }

    pub fn pressed(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL
            .into_iter()
            .filter(|&button| self.is_pressed(button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn press_and_release() {
        let mut keypad = Keypad::new();

        keypad.set_button(Button::Up, true);
        keypad.set_button(Button::Left, true);
        assert!(keypad.is_pressed(Button::Up));
        assert!(keypad.is_pressed(Button::Left));
        assert!(!keypad.is_pressed(Button::Down));
        assert_eq!(keypad.state(), 0b0101);

        keypad.set_button(Button::Up, false);
        assert!(!keypad.is_pressed(Button::Up));
        assert_eq!(keypad.pressed().collect::<Vec<_>>(), [Button::Left]);
    }

    #[test]
    fn opposite_buttons_can_be_held_together() {
        let mut keypad = Keypad::new();

        keypad.set_button(Button::Left, true);
        keypad.set_button(Button::Right, true);

        assert_eq!(
            keypad.pressed().collect::<Vec<_>>(),
            [Button::Left, Button::Right]
        );
    }
}
