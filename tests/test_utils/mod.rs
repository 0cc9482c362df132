pub mod assertions;
pub mod builders;
pub mod component;
pub mod models;

// Re-export commonly used items
pub use builders::EventBuilder;
pub use component::ComponentTestHarness;
pub use fixtures::ChinookFixture;
pub use models::ScriptedModel;

pub const TEST_TERMINAL_WIDTH: u16 = 100;
pub const TEST_TERMINAL_HEIGHT: u16 = 30;
