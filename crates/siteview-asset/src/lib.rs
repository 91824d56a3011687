//! Provide the site model for the scene engine.
//!
//! A site is a rectangular ground footprint holding named, axis-aligned
//! buildings. This library only describes the records and how to read
//! them; turning them into scene nodes is the job of the engine.
//!
pub mod building;
/// Site loaders
pub mod loader;
pub mod site;

pub use building::Building;
pub use site::Site;
