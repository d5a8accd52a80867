//! Personalization context synthesis: the heart of Kindred.
//!
//! On every conversational turn the engine turns everything known about a
//! user into one bounded briefing and an opening line:
//!
//! 1. **Aggregate** every source domain concurrently into a [`UserSnapshot`]
//! 2. **Fuse** the structured and legacy fact stores, deduplicated
//! 3. **Classify** time: last-contact band, events in the follow-up window
//! 4. **Select** a persona style from the user's preferences and goals
//! 5. **Pack** all fragments by tier into the character budget
//! 6. **Render** the greeting for the last-contact band
//!
//! Only step 1 touches I/O. Steps 2–6 are pure functions of the snapshot
//! and an explicit `now`.

pub mod aggregator;
pub mod briefing;
pub mod clock;
pub mod cost;
pub mod engine;
pub mod fusion;
pub mod packer;
pub mod persona;
pub mod renderer;
pub mod snapshot;
pub mod temporal;

pub use aggregator::Aggregator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{Composition, SynthesisEngine};
pub use fusion::{FusedFacts, FusionLimits, fuse_facts};
pub use packer::{BudgetPacker, ContextFragment, DropInfo, PackReport, PackedContext, Tier};
pub use persona::{select_rule, select_style};
pub use renderer::{SynthesizedContext, display_name, opening_message};
pub use snapshot::UserSnapshot;
pub use temporal::{EventSignal, EventWindow, LastContact, RecencyBands, classify_last_contact, event_signals};
