pub mod catalog;
pub mod controller;
pub mod session;

pub use catalog::{MovieCatalog, TmdbCatalog};
pub use controller::{SearchController, SearchPhase, SearchView};
pub use session::SearchSession;
