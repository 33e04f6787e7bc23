#![forbid(unsafe_code)]

//! Animated selector grid.
//!
//! A [`Selector`] shows a set of entries (terminal tabs, windows, documents)
//! as a zoomable grid of thumbnails and tracks a single selection. Picking
//! an entry, by tap or by keyboard, zooms the grid back to full size on that
//! entry and reports it.
//!
//! The widget is host-agnostic: it draws through a [`Scene`] and is clocked
//! by a [`Scheduler`], both implemented by the embedding toolkit.
//! [`headless`] provides deterministic implementations of both for tests.
//!
//! # Modules
//!
//! - [`registry`]: entries and their selection facets
//! - [`layout`]: grid geometry and pan clamping
//! - [`selection`]: the selection state machine
//! - [`transition`]: the zoom/pan animator
//! - [`input`]: pointer and key routing, autozoom
//!
//! # Feature Flags
//!
//! - `tracing`: structured logging through `selgrid-core`'s shims
//! - `crossterm`: map crossterm events into [`selgrid_core::event::Event`]
//! - `serde`: (de)serialize [`SelectorConfig`]

pub mod config;
pub mod error;
pub mod headless;
pub mod input;
pub mod layout;
pub mod registry;
pub mod scene;
pub mod scheduler;
pub mod selection;
pub mod transition;
pub mod widget;

pub use config::SelectorConfig;
pub use error::SelectorError;
pub use input::Command;
pub use layout::{GridDims, GridLayout};
pub use registry::{EntryId, SelectionFacets};
pub use scene::{Cue, EntryMetadata, Scene};
pub use scheduler::{AnimatorId, FrameControl, ScheduleSlot, Scheduler, TimerId};
pub use transition::TransitionPhase;
pub use widget::{Selector, SelectorEvent, WidgetFlags};
