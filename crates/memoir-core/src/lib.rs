//! Core domain models for memoir
//!
//! This crate contains:
//! - Story and Mood models
//! - Feed grouping (calendar-day buckets, newest first)
//! - Engine error taxonomy

pub mod error;
pub mod feed;
pub mod story;

pub use error::{Error, Result};
pub use feed::{DayGroup, Feed, day_window, group_stories};
pub use story::{Mood, Story};
