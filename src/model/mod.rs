mod archive;
mod competition;
mod listing;
mod participant;
mod ranking;
mod score_sheet;

pub use archive::*;
pub use competition::*;
pub use listing::*;
pub use participant::*;
pub use ranking::*;
pub use score_sheet::*;
