//! # tree_morph
//!
//! A particle Christmas tree that morphs between a cone and an exploded
//! cloud, with a ring of images that fans out around it.
//!
//! ## Display states
//!
//! ```text
//!            Explode                Zoom (front image visible)
//!   Tree ─────────────► Exploded ─────────────► Zoomed
//!    ▲  ◄─────────────     ▲   ◄─────────────     │
//!    │     Converge        │   Release / Close     │
//!    └─────────────────────┴───────── Converge ────┘
//! ```
//!
//! `progress` is 1.0 on the tree and 0.0 fully exploded.  It steps toward
//! the current state every tick and is frozen while zoomed.
//!
//! ## Per-tick order
//!
//! 1. events applied (`Scene::apply`)
//! 2. clock
//! 3. rotation (hand, else auto-rotate as tree)
//! 4. morph progress and output buffers
//! 5. image orbit and front-facing selection
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use tree_morph::{DisplayState, Scene, SceneEvent, TreeConfig};
//!
//! let cfg = TreeConfig { particle_count: 100, ..TreeConfig::default() };
//! let mut scene = Scene::new(&cfg, &mut StdRng::seed_from_u64(0))?;
//! scene.apply(SceneEvent::Explode);
//! scene.tick(1.0 / 60.0);
//! assert_eq!(scene.state(), DisplayState::Exploded);
//! assert!(scene.progress() < 1.0);
//! # Ok::<(), tree_morph::ConfigError>(())
//! ```

pub mod config;
pub mod ease;
pub mod points;
pub mod state;
pub mod morph;
pub mod orbit;
pub mod rotation;
pub mod scene;

pub use config::{ConfigError, NamedColor, OrbitConfig, Rgb, TreeConfig};
pub use morph::{MorphEngine, Pose};
pub use orbit::{OrbitSelector, OrbitSlot};
pub use points::{spin_y, MorphablePoint, SceneLayout};
pub use rotation::RotationState;
pub use scene::{Scene, SceneFrame};
pub use state::{DisplayState, SceneEvent, SceneStateMachine, SlotVisibility, Transition};
