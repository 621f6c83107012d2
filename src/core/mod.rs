// Core modules implementing the shaver, its effects, allocation, and error modeling.
pub mod alloc;
pub mod effect;
pub mod error;
pub mod shaver;
