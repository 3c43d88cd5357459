mod deveui;
mod short_code;

pub use deveui::*;
pub use short_code::*;
