//! Synthetic landmark frames for canned hand shapes.
//!
//! Used by the demo detector and by tests.  The layout mimics a right hand
//! seen on a mirrored feed, palm toward the camera, centred near (0.5, 0.6).

use crate::landmark::*;

const EXTEND: f32 = 0.12;
const CURL:   f32 = 0.06;

const INDEX_PIP_AT:  Landmark = Landmark::new(0.42, 0.50);
const MIDDLE_PIP_AT: Landmark = Landmark::new(0.50, 0.48);
const RING_PIP_AT:   Landmark = Landmark::new(0.57, 0.50);
const PINKY_PIP_AT:  Landmark = Landmark::new(0.63, 0.55);
const THUMB_IP_AT:   Landmark = Landmark::new(0.36, 0.65);

/// Build a frame whose finger flags equal `mask`
/// (`[thumb, index, middle, ring, pinky]`).  With `pinch` the thumb tip sits
/// right next to the index tip; without it the two stay well apart.
pub fn with_fingers(mask: [bool; 5], pinch: bool) -> LandmarkFrame {
    let [thumb, index, middle, ring, pinky] = mask;
    let mut p = [Landmark::default(); LANDMARK_COUNT];

    p[WRIST] = Landmark::new(0.50, 0.85);
    p[1]     = Landmark::new(0.42, 0.80);
    p[2]     = Landmark::new(0.38, 0.72);
    p[5]     = Landmark::new(0.43, 0.62);
    p[MIDDLE_BASE] = Landmark::new(0.50, 0.60);
    p[13]    = Landmark::new(0.56, 0.62);
    p[17]    = Landmark::new(0.62, 0.65);

    let mut finger = |pip_idx: usize, tip_idx: usize, pip: Landmark, up: bool| {
        p[pip_idx] = pip;
        p[pip_idx + 1] = Landmark::new(pip.x, pip.y + if up { -EXTEND / 2.0 } else { CURL / 2.0 });
        p[tip_idx] = Landmark::new(pip.x, pip.y + if up { -EXTEND } else { CURL });
    };
    finger(INDEX_PIP,  INDEX_TIP,  INDEX_PIP_AT,  index);
    finger(MIDDLE_PIP, MIDDLE_TIP, MIDDLE_PIP_AT, middle);
    finger(RING_PIP,   RING_TIP,   RING_PIP_AT,   ring);
    finger(PINKY_PIP,  PINKY_TIP,  PINKY_PIP_AT,  pinky);

    if pinch {
        let tip = p[INDEX_TIP];
        let thumb_tip = Landmark::new(tip.x + 0.02, tip.y + 0.02);
        let ip_dx = if thumb { 0.05 } else { -0.05 };
        p[THUMB_TIP] = thumb_tip;
        p[THUMB_IP]  = Landmark::new(thumb_tip.x + ip_dx, thumb_tip.y + 0.06);
    } else {
        p[THUMB_IP]  = THUMB_IP_AT;
        p[THUMB_TIP] = if thumb {
            Landmark::new(THUMB_IP_AT.x - 0.06, THUMB_IP_AT.y - 0.05)
        } else {
            Landmark::new(THUMB_IP_AT.x + 0.08, THUMB_IP_AT.y + 0.01)
        };
    }

    LandmarkFrame::new(p)
}

pub fn fist() -> LandmarkFrame {
    with_fingers([false; 5], false)
}

pub fn open_hand() -> LandmarkFrame {
    with_fingers([true; 5], false)
}

pub fn ok_sign() -> LandmarkFrame {
    with_fingers([false, false, true, true, true], true)
}

/// Index + middle raised: an ambiguous shape.
pub fn two_fingers() -> LandmarkFrame {
    with_fingers([false, true, true, false, false], false)
}
