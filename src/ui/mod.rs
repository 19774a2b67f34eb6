mod spinner;
mod theme;

pub use spinner::Spinner;
pub use theme::Theme;
