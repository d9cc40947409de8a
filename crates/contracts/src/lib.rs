//! Общие DTO между backend и админ-интерфейсом

pub mod domain;
pub mod shared;
pub mod usecases;
