//! Cart domain

mod entity;
mod repository;

pub use entity::CartEntry;
pub use repository::CartRepository;

#[cfg(test)]
pub use repository::MockCartRepository;
