/// State management module
/// 
/// This module handles everything the program remembers between runs:
/// - The record store of downloaded images (library.rs)
/// - Shared data structures (data.rs)

pub mod library;
pub mod data;
