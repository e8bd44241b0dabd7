// Application layer - Use case interactors

pub mod config;
pub mod container;
pub mod editor_interactor;

pub use config::EditorConfig;
pub use container::DefaultAppContainer;
pub use editor_interactor::{EditorInteractor, ProxyOutcome, QueryOutcome};
