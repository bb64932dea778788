//! Frame slot bookkeeping for frames in flight.
//!
//! [`FramePacer`] is the host-side state machine behind the swap chain. It
//! owns no Vulkan objects: the swap chain asks it which slot's fence to wait
//! on and reports each transition back. Per slot:
//!
//! ```text
//! Idle/Presenting --begin_acquire--> Acquiring --begin_recording--> Recording
//!     ^                                  |                              |
//!     |                               abandon                       submitted
//!     |                                  v                              v
//!     +------------------------------- Idle                         Submitted
//!     |                                                                 |
//!     +--------------------------- Presenting <-------presented---------+
//! ```
//!
//! A slot stays `Presenting` until it is acquired again. Its fence is pending
//! from `submitted` until the swap chain reports `fence_waited`, and
//! [`FramePacer::begin_acquire`] asks for that wait before the slot's command
//! buffer or uniform region is reused. `current_frame` advances only in
//! `presented`.

use crate::sync::MAX_FRAMES_IN_FLIGHT;

/// Lifecycle of one frame slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Acquiring,
    Recording,
    Submitted,
    /// Submitted and handed to presentation; GPU work may still be pending.
    Presenting,
}

/// A frame slot handed out by [`FramePacer::begin_acquire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStart {
    pub slot: usize,
    /// The slot's last submission has not been observed complete; wait on
    /// its fence, then call [`FramePacer::fence_waited`].
    pub wait_on_fence: bool,
}

#[derive(Debug)]
pub struct FramePacer {
    slots: [SlotState; MAX_FRAMES_IN_FLIGHT],
    fence_pending: [bool; MAX_FRAMES_IN_FLIGHT],
    current_frame: usize,
    frames_completed: u64,
    /// Frame slot whose submission last rendered into each swap-chain image.
    images_in_flight: Vec<Option<usize>>,
    current_image: Option<u32>,
}

impl FramePacer {
    pub fn new(image_count: usize) -> Self {
        Self {
            slots: [SlotState::Idle; MAX_FRAMES_IN_FLIGHT],
            fence_pending: [false; MAX_FRAMES_IN_FLIGHT],
            current_frame: 0,
            frames_completed: 0,
            images_in_flight: vec![None; image_count],
            current_image: None,
        }
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    #[inline]
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    #[inline]
    pub fn slot_state(&self, slot: usize) -> SlotState {
        self.slots[slot]
    }

    /// Image acquired for the frame being built, if any.
    #[inline]
    pub fn current_image(&self) -> Option<u32> {
        self.current_image
    }

    /// Frame slot that last submitted work for `image`.
    pub fn image_owner(&self, image: u32) -> Option<usize> {
        self.images_in_flight.get(image as usize).copied().flatten()
    }

    /// Whether `slot` has submitted work not yet observed complete.
    #[inline]
    pub fn is_fence_pending(&self, slot: usize) -> bool {
        self.fence_pending[slot]
    }

    /// Starts a frame on the current slot. When `wait_on_fence` is set the
    /// caller must wait on the slot's fence before acquiring an image.
    pub fn begin_acquire(&mut self) -> FrameStart {
        let slot = self.current_frame;
        assert!(
            matches!(self.slots[slot], SlotState::Idle | SlotState::Presenting),
            "frame slot {slot} acquired while {:?}",
            self.slots[slot]
        );
        self.slots[slot] = SlotState::Acquiring;
        FrameStart {
            slot,
            wait_on_fence: self.fence_pending[slot],
        }
    }

    /// The current slot's fence was observed signaled.
    pub fn fence_waited(&mut self) {
        assert_eq!(
            self.slots[self.current_frame],
            SlotState::Acquiring,
            "fence wait reported outside of acquisition"
        );
        self.fence_pending[self.current_frame] = false;
    }

    /// Records the acquired image. Returns the other frame slot whose fence
    /// must be waited on before the image is rendered into again, when the
    /// image was last used by a different slot.
    pub fn image_acquired(&mut self, image: u32) -> Option<usize> {
        assert_eq!(
            self.slots[self.current_frame],
            SlotState::Acquiring,
            "image acquired outside of acquisition"
        );
        assert!(
            !self.fence_pending[self.current_frame],
            "image acquired before waiting on the slot fence"
        );
        assert!(
            (image as usize) < self.images_in_flight.len(),
            "image index {image} out of range for {} images",
            self.images_in_flight.len()
        );
        self.current_image = Some(image);
        self.image_owner(image)
            .filter(|&owner| owner != self.current_frame && self.fence_pending[owner])
    }

    pub fn begin_recording(&mut self) {
        assert_eq!(
            self.slots[self.current_frame],
            SlotState::Acquiring,
            "recording started before acquisition"
        );
        assert!(self.current_image.is_some(), "recording without an image");
        self.slots[self.current_frame] = SlotState::Recording;
    }

    /// Marks the slot's command buffer submitted; the image now belongs to this slot.
    pub fn submitted(&mut self) {
        assert_eq!(
            self.slots[self.current_frame],
            SlotState::Recording,
            "submit without a recorded frame"
        );
        let image = self
            .current_image
            .expect("recording state always has an image") as usize;
        self.images_in_flight[image] = Some(self.current_frame);
        self.fence_pending[self.current_frame] = true;
        self.slots[self.current_frame] = SlotState::Submitted;
    }

    /// Completes the frame, whatever presentation reported, and advances to the next slot.
    pub fn presented(&mut self) {
        assert_eq!(
            self.slots[self.current_frame],
            SlotState::Submitted,
            "present without a submitted frame"
        );
        self.slots[self.current_frame] = SlotState::Presenting;
        self.current_image = None;
        self.frames_completed += 1;
        self.current_frame = (self.current_frame + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Drops a frame that never reached submission. The slot does not advance,
    /// and a fence that was not waited on stays pending.
    pub fn abandon(&mut self) {
        let slot = self.current_frame;
        assert!(
            matches!(
                self.slots[slot],
                SlotState::Acquiring | SlotState::Recording
            ),
            "abandon while {:?}",
            self.slots[slot]
        );
        self.slots[slot] = SlotState::Idle;
        self.current_image = None;
    }

    /// Forgets image ownership after the swap chain was rebuilt with `image_count` images.
    ///
    /// The device must be idle; every slot returns to `Idle` with no pending fence.
    pub fn reset_images(&mut self, image_count: usize) {
        assert!(
            !self
                .slots
                .iter()
                .any(|s| matches!(s, SlotState::Acquiring | SlotState::Recording | SlotState::Submitted)),
            "swap chain images reset mid-frame"
        );
        self.slots = [SlotState::Idle; MAX_FRAMES_IN_FLIGHT];
        self.fence_pending = [false; MAX_FRAMES_IN_FLIGHT];
        self.images_in_flight = vec![None; image_count];
        self.current_image = None;
    }
}
