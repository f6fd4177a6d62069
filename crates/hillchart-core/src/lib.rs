#![forbid(unsafe_code)]

//! Hill chart state model, curve geometry and URL token codec (headless).
//!
//! - [`curve`]: the bell-shaped hill and the position <-> chart coordinate mapping
//! - [`codec`]: compact, URL-fragment-safe tokens, with read support for the legacy format
//! - [`store`]: the single owner of live state; persists into a [`Location`] and notifies
//!   subscribers
//! - [`drag`]: pointer drag sessions feeding [`Store::update_scope`]
//!
//! ```
//! use hillchart_core::{Location, ManualClock, MemoryLocation, Store, StoreOptions, codec};
//!
//! let location = MemoryLocation::parse("https://example.com/hill/")?;
//! let mut store = Store::init(location, ManualClock::default(), StoreOptions::default());
//! let auth = store.add_scope("Auth", Some(0.25));
//!
//! let token = store.location().fragment().expect("add_scope persists immediately");
//! let decoded = codec::decode(&token)?;
//! assert_eq!(decoded.scopes[0].id, auth.id);
//! # Ok::<(), hillchart_core::Error>(())
//! ```

pub mod clock;
pub mod codec;
pub mod curve;
pub mod debounce;
pub mod drag;
pub mod error;
pub mod geom;
pub mod location;
pub mod model;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{DecodeError, Decoded, TokenFormat, decode, decode_or_default, encode};
pub use curve::{CurveConfig, HillCurve};
pub use drag::DragSession;
pub use error::{Error, Result};
pub use location::{Location, MemoryLocation};
pub use model::{ChartPatch, ChartState, Scope, ScopePatch};
pub use store::{Store, StoreOptions, Subscription};
