//! # Kindred Core
//!
//! Domain types, the source reader trait, and error definitions for the
//! Kindred personalization engine. This crate has **no async runtime
//! dependency**: it defines the domain model that the other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! The external stores are modelled as a single trait here
//! ([`UserDataSource`]). Implementations live in `kindred-sources` or in the
//! host application. This enables:
//! - Swapping the storage layer without touching synthesis
//! - Easy testing with scripted and failing sources
//! - Clean dependency graph (all crates depend inward on core)

pub mod domain;
pub mod error;
pub mod fact;
pub mod source;
pub mod user;

// Re-export key types at crate root for ergonomics
pub use domain::{
    BodyMetrics, DailyMetrics, EventStatus, HabitEntry, HabitStreak, Interests, Objective,
    Preferences, Profile, Sensitivity, SessionRecord, SessionSnapshot, StructuredFact,
    SupportType, TopicMention, UserEvent,
};
pub use error::{Result, SourceError, SynthesisError};
pub use fact::{Fact, FactCategory, FactSource};
pub use source::{SourceDomain, UserDataSource};
pub use user::{AuthToken, UserId};
