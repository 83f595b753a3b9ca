pub mod ability;
pub mod corpus;
pub mod loader;
pub mod palette;
pub mod profession;
pub mod reference;
pub mod song;
pub mod validate;
