//! Informational and one-shot commands.

pub mod arise;
pub mod avatar;
pub mod calc;
pub mod help;
