//! Common utilities for the generative pieces
//!
//! This crate provides shared graphics setup, cameras, pointer/clock input and the
//! abstract drawing surface used by both the tesseract piece and the flip panels piece.

pub mod graphics;
pub mod camera;
pub mod input;
pub mod draw;

pub use graphics::*;
pub use camera::*;
pub use input::*;
pub use draw::*;

/// Timing constants shared by every piece
pub mod constants {
    /// Upper bound on a single frame's delta time, in seconds
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default window size
    pub const WINDOW_WIDTH: u32 = 1280;
    pub const WINDOW_HEIGHT: u32 = 720;

    /// Environment variable holding an optional RNG seed
    pub const SEED_ENV: &str = "PIECE_SEED";

    /// Environment variable asking the piece to wipe its canvas on resize
    pub const CLEAR_ON_RESIZE_ENV: &str = "PIECE_CLEAR_ON_RESIZE";
}

/// Read the optional RNG seed from the environment.
pub fn seed_from_env() -> Option<u64> {
    let raw = std::env::var(constants::SEED_ENV).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(_) => {
            log::warn!("ignoring {}={:?}: not a u64", constants::SEED_ENV, raw);
            None
        }
    }
}

/// Read an on/off switch from the environment; unset means off.
pub fn flag_from_env(name: &str) -> bool {
    match std::env::var(name) {
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
            log::warn!("ignoring {}={:?}: not a boolean", name, raw);
            false
        }),
        Err(_) => false,
    }
}

/// `1/true/yes/on` and `0/false/no/off`, case-insensitive
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" On "), Some(true));
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn unset_flag_is_off() {
        assert!(!flag_from_env("PIECE_FLAG_THAT_IS_NEVER_SET"));
    }
}
