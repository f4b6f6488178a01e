//! Generally useful shared code.

/// Clear the screen, move the cursor home and show it again.
pub const RESET_SCREEN: &str = "\x1b[2J\x1b[H\x1b[?25h";

/// Ask the terminal to report every mouse movement, not just clicks, using the SGR encoding.
pub const ENABLE_MOUSE_REPORTING: &str = "\x1b[?1003h\x1b[?1006h";

/// Return the terminal's mouse reporting to how it was.
pub const DISABLE_MOUSE_REPORTING: &str = "\x1b[?1006l\x1b[?1003l";
