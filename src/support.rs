#[cfg(feature = "egui")]
pub mod egui;
