pub mod choices;
pub mod common;
pub mod developer;
pub mod owner;
pub mod permission;
pub mod project;
pub mod property;

pub use choices::*;
pub use common::*;
pub use developer::*;
pub use owner::*;
pub use permission::*;
pub use project::*;
pub use property::*;
