//! Keyboard text entry.

pub mod text_input;
