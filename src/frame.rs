//! Frame lifecycle states and the per-frame report.
//!
//! Every call to [`Renderer::render_frame`](crate::Renderer::render_frame)
//! walks the state machine below and ends in [`FrameState::Idle`]:
//!
//! ```text
//! Idle -> AcquiringTarget -> Encoding -> Submitted -> Finalized(Presented | HeadlessDone) -> Idle
//!                |                                          |
//!                +------------- (acquire failed) ------------+---> Idle
//! ```
//!
//! A failed acquisition or present returns straight to `Idle`. Nothing is
//! retried and work that was already submitted still runs on the GPU.

use std::fmt;

use crate::mesh::MeshType;

/// How a submitted frame was finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finalized {
    /// A windowed frame was handed to the presentation engine.
    Presented,
    /// A headless frame; nothing to present.
    HeadlessDone,
}

/// Where a frame is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameState {
    Idle,
    AcquiringTarget,
    Encoding,
    Submitted,
    Finalized(Finalized),
}

impl FrameState {
    /// Whether `self -> next` is a legal step.
    pub fn can_transition_to(self, next: FrameState) -> bool {
        use FrameState::*;
        matches!(
            (self, next),
            (Idle, AcquiringTarget)
                | (AcquiringTarget, Encoding)
                | (AcquiringTarget, Idle)
                | (Encoding, Submitted)
                | (Submitted, Finalized(_))
                | (Submitted, Idle)
                | (Finalized(_), Idle)
        )
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::Idle => f.write_str("idle"),
            FrameState::AcquiringTarget => f.write_str("acquiring target"),
            FrameState::Encoding => f.write_str("encoding"),
            FrameState::Submitted => f.write_str("submitted"),
            FrameState::Finalized(Finalized::Presented) => f.write_str("presented"),
            FrameState::Finalized(Finalized::HeadlessDone) => f.write_str("headless done"),
        }
    }
}

/// Which pipeline a draw went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawPass {
    /// Filled triangles.
    Solid,
    /// Line-list edge overlay.
    Edges,
}

/// One indexed-instanced draw call issued during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRecord {
    pub mesh: MeshType,
    pub pass: DrawPass,
    pub index_count: u32,
    pub instance_count: u32,
}

/// What happened during one `render_frame` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// States visited, starting and ending with [`FrameState::Idle`].
    pub states: Vec<FrameState>,
    /// Draw calls in issue order.
    pub draws: Vec<DrawRecord>,
    /// Whether the surface texture was presented.
    pub presented: bool,
    /// Mesh types dropped from this frame because their instance buffer could
    /// not grow.
    pub skipped: Vec<MeshType>,
}

impl FrameReport {
    /// Total instances drawn for `mesh` in the given pass.
    pub fn instances_drawn(&self, mesh: MeshType, pass: DrawPass) -> u32 {
        self.draws
            .iter()
            .filter(|d| d.mesh == mesh && d.pass == pass)
            .map(|d| d.instance_count)
            .sum()
    }

    /// Number of draw calls issued for `mesh` in the given pass.
    pub fn draw_calls(&self, mesh: MeshType, pass: DrawPass) -> usize {
        self.draws
            .iter()
            .filter(|d| d.mesh == mesh && d.pass == pass)
            .count()
    }

    /// The last state reached before returning to idle.
    pub fn finalized(&self) -> Option<Finalized> {
        self.states.iter().rev().find_map(|s| match s {
            FrameState::Finalized(f) => Some(*f),
            _ => None,
        })
    }
}

/// Records state transitions for one frame.
#[derive(Debug)]
pub(crate) struct FrameTracker {
    current: FrameState,
    report: FrameReport,
}

impl FrameTracker {
    pub(crate) fn begin() -> Self {
        Self {
            current: FrameState::Idle,
            report: FrameReport {
                states: vec![FrameState::Idle],
                ..Default::default()
            },
        }
    }

    pub(crate) fn enter(&mut self, next: FrameState) {
        debug_assert!(
            self.current.can_transition_to(next),
            "illegal frame transition {} -> {}",
            self.current,
            next
        );
        log::trace!("frame: {} -> {}", self.current, next);
        self.current = next;
        self.report.states.push(next);
        if let FrameState::Finalized(Finalized::Presented) = next {
            self.report.presented = true;
        }
    }

    pub(crate) fn record_draw(&mut self, record: DrawRecord) {
        self.report.draws.push(record);
    }

    pub(crate) fn skip(&mut self, mesh: MeshType) {
        if !self.report.skipped.contains(&mesh) {
            self.report.skipped.push(mesh);
        }
    }

    /// Returns to idle from wherever the frame stopped and hands back the
    /// report.
    pub(crate) fn finish(mut self) -> FrameReport {
        if self.current != FrameState::Idle {
            log::trace!("frame: {} -> idle", self.current);
            self.current = FrameState::Idle;
            self.report.states.push(FrameState::Idle);
        }
        self.report
    }
}
