//! # gesture_tree
//!
//! A particle Christmas tree driven by hand gestures, rendered in a
//! software framebuffer window.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Fist | Converge into the tree (clears any zoom) |
//! | Open hand | Explode into a cloud; image ring fans out |
//! | OK sign | Zoom the front image (exploded only, once it has faded in) |
//! | No gesture | Leave the zoom and return to the previous state |
//! | Hand left / right | Turn the tree |
//!
//! ## Detectors
//!
//! * `stdin` (default): one JSON object per camera frame from an external
//!   landmark pipeline: `{"tracking": true, "landmarks": [{"x":…,"y":…}, …]}`.
//! * `demo`: a built-in scripted hand loop.
//! * `none`: keyboard and mouse only.
//!
//! A detector that fails or ends leaves the window running on the keyboard.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `T` | Converge (fist) |
//! | `E` / `Space` | Explode (open hand) |
//! | `Left` / `Right` | Previous / next image (exploded only) |
//! | `Z` held | Zoom while held (OK sign) |
//! | `Escape` / click | Close the zoom overlay |
//! | `Q` | Quit |

pub mod detector;
pub mod visualizer;
pub mod app;
